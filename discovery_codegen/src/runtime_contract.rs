//! Contract with the client runtime the generated code builds on.
//!
//! The per-API request base type mirrors the runtime's base request type: same
//! type parameters, one forwarding constructor per runtime constructor. The
//! runtime's shape is written down here and versioned with it.

use crate::descriptor::{Expr, ParamDescriptor, Primitive, RuntimeType, TypeDescriptor};
use crate::identifier::Identifier;

/// Kinds of values the runtime constructors accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeParamKind {
    /// The client instance issuing the request.
    Client,
    /// Marker for the response type `T`.
    ResponseType,
    HttpMethod,
    /// Request path template relative to the base URL.
    Path,
    /// Request body; may be absent.
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeParam {
    pub name: &'static str,
    pub kind: RuntimeParamKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConstructor {
    pub name: &'static str,
    pub params: &'static [RuntimeParam],
}

/// Shape of the runtime base request type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContract {
    pub version: u32,
    pub type_parameters: &'static [&'static str],
    pub constructors: &'static [RuntimeConstructor],
}

/// Base request type of runtime contract version 1.
pub const BASE_REQUEST: RequestContract = RequestContract {
    version: 1,
    type_parameters: &["T"],
    constructors: &[RuntimeConstructor {
        name: "new",
        params: &[
            RuntimeParam {
                name: "client",
                kind: RuntimeParamKind::Client,
            },
            RuntimeParam {
                name: "response_type",
                kind: RuntimeParamKind::ResponseType,
            },
            RuntimeParam {
                name: "method",
                kind: RuntimeParamKind::HttpMethod,
            },
            RuntimeParam {
                name: "path",
                kind: RuntimeParamKind::Path,
            },
            RuntimeParam {
                name: "content",
                kind: RuntimeParamKind::Content,
            },
        ],
    }],
};

impl RequestContract {
    /// The base request type applied to its own type parameters, e.g. `Request<T>`.
    #[must_use]
    pub fn generic_super_type(&self) -> TypeDescriptor {
        TypeDescriptor::parameterized(
            TypeDescriptor::Runtime(RuntimeType::Request),
            self.type_parameters
                .iter()
                .map(|p| TypeDescriptor::Variable((*p).to_string()))
                .collect(),
        )
    }

    /// The constructor generated method components forward to.
    #[must_use]
    pub fn primary_constructor(&self) -> Option<&RuntimeConstructor> {
        self.constructors.first()
    }
}

impl RuntimeParam {
    /// Declared type of this parameter inside the generic request base type.
    #[must_use]
    pub fn descriptor(&self, response: &TypeDescriptor) -> ParamDescriptor {
        let ty: TypeDescriptor = match self.kind {
            RuntimeParamKind::Client => TypeDescriptor::Runtime(RuntimeType::Client),
            RuntimeParamKind::ResponseType => TypeDescriptor::parameterized(
                TypeDescriptor::Runtime(RuntimeType::ResponseType),
                vec![response.clone()],
            ),
            RuntimeParamKind::HttpMethod => TypeDescriptor::Runtime(RuntimeType::HttpMethod),
            RuntimeParamKind::Path => TypeDescriptor::Primitive(Primitive::String),
            RuntimeParamKind::Content => TypeDescriptor::Runtime(RuntimeType::Content),
        };
        ParamDescriptor::new(Identifier::resolve(self.name), ty)
    }
}

/// Values a method component passes for each runtime parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall<'a> {
    pub response: &'a TypeDescriptor,
    pub http_method: &'a str,
    pub path_constant: &'a str,
    pub body: Option<&'a Identifier>,
}

impl RuntimeConstructor {
    /// Arguments forwarding `call` to this constructor, in parameter order.
    #[must_use]
    pub fn arguments(&self, call: &MethodCall<'_>) -> Vec<Expr> {
        self.params
            .iter()
            .map(|param| match param.kind {
                RuntimeParamKind::Client => Expr::ClientInstance,
                RuntimeParamKind::ResponseType => Expr::TypeLiteral(call.response.clone()),
                RuntimeParamKind::HttpMethod => Expr::HttpVerb(call.http_method.to_string()),
                RuntimeParamKind::Path => Expr::Constant(call.path_constant.to_string()),
                RuntimeParamKind::Content => call
                    .body
                    .map_or(Expr::Absent, |body| Expr::Param(body.clone())),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_follow_constructor_parameter_order() {
        let constructor: &RuntimeConstructor =
            BASE_REQUEST.primary_constructor().expect("one constructor");
        let body: Identifier = Identifier::resolve("content");
        let call: MethodCall<'_> = MethodCall {
            response: &TypeDescriptor::Void,
            http_method: "POST",
            path_constant: "REST_PATH",
            body: Some(&body),
        };
        let actual: Vec<Expr> = constructor.arguments(&call);
        let expected: Vec<Expr> = vec![
            Expr::ClientInstance,
            Expr::TypeLiteral(TypeDescriptor::Void),
            Expr::HttpVerb("POST".to_string()),
            Expr::Constant("REST_PATH".to_string()),
            Expr::Param(body.clone()),
        ];
        assert_eq!(expected, actual);
    }

    #[test]
    fn missing_body_is_an_explicit_absence() {
        let constructor: &RuntimeConstructor =
            BASE_REQUEST.primary_constructor().expect("one constructor");
        let call: MethodCall<'_> = MethodCall {
            response: &TypeDescriptor::Void,
            http_method: "GET",
            path_constant: "REST_PATH",
            body: None,
        };
        assert_eq!(Some(&Expr::Absent), constructor.arguments(&call).last());
    }

    #[test]
    fn generic_super_type_uses_contract_type_parameters() {
        let expected: TypeDescriptor = TypeDescriptor::parameterized(
            TypeDescriptor::Runtime(RuntimeType::Request),
            vec![TypeDescriptor::Variable("T".to_string())],
        );
        assert_eq!(expected, BASE_REQUEST.generic_super_type());
    }
}
