//! Assembles the complete client model of one API description.
//!
//! Order of work: model classes for all named schemas, the per-API request
//! base type, then the client entry type with its resource/method tree.
//! Every piece of mutable state (registry, component stack) belongs to one
//! [`ApiBuilder`], so independent APIs can be built in parallel.

use crate::component::{ComponentSpec, ComponentStack};
use crate::descriptor::{
    ClassDescriptor, ClassKind, ConstantDescriptor, ConstantValue, ConstructorDescriptor,
    Declaration, Expr, FieldDescriptor, ParamDescriptor, QualifiedName, RuntimeType, Statement,
    TypeDescriptor, escape_doc,
};
use crate::discovery::{JsonSchema, RestDescription, RestMethod, RestResource};
use crate::enum_values::EnumMiner;
use crate::error::CodegenError;
use crate::identifier::Identifier;
use crate::registry::ModelRegistry;
use crate::resolver::{Resolved, Scope, TypeResolver};
use crate::runtime_contract::{BASE_REQUEST, MethodCall};
use crate::settings::GenerateSettings;
use heck::{ToSnakeCase, ToUpperCamelCase};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Name of the request body parameter of method components.
const BODY_PARAM: &str = "content";

/// Constant holding a method's request path.
const PATH_CONSTANT: &str = "REST_PATH";

/// Sub-package of an API's package holding its model types.
const MODEL_PACKAGE: &str = "model";

/// Everything generated for one API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedApi {
    /// `name:version` of the source description.
    pub selector: String,
    /// Package of the client and request types.
    pub package: Vec<String>,
    /// Package of the model types.
    pub model_package: Vec<String>,
    /// Model classes, ordered by name.
    pub models: Vec<ClassDescriptor>,
    pub request: ClassDescriptor,
    pub client: ClassDescriptor,
}

impl GeneratedApi {
    /// All top-level classes: models, then the request base type, then the client.
    pub fn top_level(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.models
            .iter()
            .chain(std::iter::once(&self.request))
            .chain(std::iter::once(&self.client))
    }

    #[must_use]
    pub fn model(&self, name: &str) -> Option<&ClassDescriptor> {
        self.models.iter().find(|c| c.name.simple_name() == name)
    }
}

/// Builds the client model of one API description.
#[derive(Debug)]
pub struct ApiBuilder<'a> {
    api: &'a RestDescription,
    package: Vec<String>,
    model_package: Vec<String>,
    request_name: QualifiedName,
    client_name: QualifiedName,
    miner: EnumMiner,
}

impl<'a> ApiBuilder<'a> {
    /// Derives the packages and type names of `api` under the base package.
    ///
    /// # Errors
    ///
    /// Returns `CodegenError::Pattern` if the enum value pattern fails to compile.
    pub fn new(api: &'a RestDescription, settings: &GenerateSettings) -> Result<Self, CodegenError> {
        let mut package: Vec<String> = settings.base_package_segments();
        package.push(api.name.to_snake_case());
        let mut model_package: Vec<String> = package.clone();
        model_package.push(MODEL_PACKAGE.to_string());

        let client_type: String = api.name.to_upper_camel_case();
        let request_name: QualifiedName =
            QualifiedName::top_level(&package, format!("{client_type}Request"));
        let client_name: QualifiedName = QualifiedName::top_level(&package, client_type);

        Ok(Self {
            api,
            package,
            model_package,
            request_name,
            client_name,
            miner: EnumMiner::new()?,
        })
    }

    /// Generates the models, the request base type and the client.
    ///
    /// # Errors
    ///
    /// Any structural error aborts the whole API; it is returned wrapped in
    /// `CodegenError::Api` naming the API.
    pub fn build(self) -> Result<GeneratedApi, CodegenError> {
        let selector: String = self.api.selector();
        self.build_inner(selector.clone())
            .map_err(|e| e.for_api(selector))
    }

    fn build_inner(self, selector: String) -> Result<GeneratedApi, CodegenError> {
        let mut registry: ModelRegistry = self.build_model_classes()?;
        let request: ClassDescriptor = self.build_request_class(&mut registry)?;
        let client: ClassDescriptor = self.build_client_class(&mut registry)?;
        info!(api = %selector, models = registry.len(), "generated API");

        let models: Vec<ClassDescriptor> = registry.classes().cloned().collect();
        Ok(GeneratedApi {
            selector,
            package: self.package,
            model_package: self.model_package,
            models,
            request,
            client,
        })
    }

    fn resolver(&self) -> TypeResolver<'_> {
        TypeResolver::new(&self.model_package, &self.miner)
    }

    /// Resolves `schema` at `scope`, registers top-level emissions and returns
    /// the type with the nested declarations left for the caller.
    fn resolve_into(
        &self,
        registry: &mut ModelRegistry,
        schema: &JsonSchema,
        scope: Scope<'_>,
    ) -> Result<(TypeDescriptor, Vec<Declaration>), CodegenError> {
        let resolved: Resolved = self.resolver().resolve(schema, scope)?;
        let (ty, nested, top_level) = resolved.split();
        for class in top_level {
            registry.register(class)?;
        }
        Ok((ty, nested))
    }

    fn build_model_classes(&self) -> Result<ModelRegistry, CodegenError> {
        let mut registry: ModelRegistry = ModelRegistry::new();
        for (name, schema) in &self.api.schemas {
            debug!(schema = %name, "resolving schema");
            let (_, nested) = self
                .resolve_into(&mut registry, schema, Scope::root())
                .map_err(|e| e.for_schema(name.as_str()))?;
            debug_assert!(nested.is_empty(), "root scope cannot nest types");
        }
        Ok(registry)
    }

    /// The per-API request base type: the runtime's base request type with its
    /// type parameters and constructors, plus the API's global parameters.
    fn build_request_class(&self, registry: &mut ModelRegistry) -> Result<ClassDescriptor, CodegenError> {
        let mut class: ClassDescriptor =
            ClassDescriptor::new(self.request_name.clone(), ClassKind::RequestBase);
        class.type_parameters = BASE_REQUEST
            .type_parameters
            .iter()
            .map(|p| (*p).to_string())
            .collect();
        class.super_type = Some(BASE_REQUEST.generic_super_type());
        class.documentation = Some(format!(
            "Base type of every {} request, built on runtime request contract version {}.",
            self.client_name.simple_name(),
            BASE_REQUEST.version
        ));

        let response: TypeDescriptor = class
            .type_parameters
            .first()
            .map_or(TypeDescriptor::Void, |t| TypeDescriptor::Variable(t.clone()));
        for runtime_constructor in BASE_REQUEST.constructors {
            let params: Vec<ParamDescriptor> = runtime_constructor
                .params
                .iter()
                .map(|p| p.descriptor(&response))
                .collect();
            let args: Vec<Expr> = params
                .iter()
                .map(|p| Expr::Param(p.identifier.clone()))
                .collect();
            let mut constructor: ConstructorDescriptor =
                ConstructorDescriptor::new(runtime_constructor.name, params);
            constructor.body.push(Statement::ForwardToBase { args });
            class.constructors.push(constructor);
        }

        self.add_optional_fields(registry, &mut class, &self.api.parameters, |_| true)?;
        Ok(class)
    }

    fn build_client_class(&self, registry: &mut ModelRegistry) -> Result<ClassDescriptor, CodegenError> {
        let api: &RestDescription = self.api;
        let mut class: ClassDescriptor =
            ClassDescriptor::new(self.client_name.clone(), ClassKind::Client);
        class.super_type = Some(TypeDescriptor::Runtime(RuntimeType::Client));
        class.documentation = api.description.as_deref().map(escape_doc);

        let literal = |name: &str, value: Option<&String>| {
            ConstantDescriptor::literal(name, value.cloned().unwrap_or_default())
        };
        class.constants = vec![
            literal("API_TITLE", api.title.as_ref()),
            literal("API_VERSION", Some(&api.version)),
            literal("DEFAULT_ROOT_URL", api.root_url.as_ref()),
            literal("DEFAULT_SERVICE_PATH", api.service_path.as_ref()),
            literal("DEFAULT_BATCH_PATH", api.batch_path.as_ref()),
            ConstantDescriptor {
                name: "DEFAULT_BASE_URL".to_string(),
                value: ConstantValue::Concat(vec![
                    "DEFAULT_ROOT_URL".to_string(),
                    "DEFAULT_SERVICE_PATH".to_string(),
                ]),
            },
        ];

        let mut stack: ComponentStack = ComponentStack::new(class);
        self.add_methods(&mut stack, registry, &api.methods)?;
        self.add_resources(&mut stack, registry, &api.resources)?;
        stack.finish()
    }

    fn add_resources(
        &self,
        stack: &mut ComponentStack,
        registry: &mut ModelRegistry,
        resources: &BTreeMap<String, RestResource>,
    ) -> Result<(), CodegenError> {
        for (name, resource) in resources {
            let spec: ComponentSpec = ComponentSpec::named(Identifier::resolve(name));
            stack.scoped(spec, |stack| {
                self.add_methods(stack, registry, &resource.methods)?;
                self.add_resources(stack, registry, &resource.resources)
            })?;
        }
        Ok(())
    }

    fn add_methods(
        &self,
        stack: &mut ComponentStack,
        registry: &mut ModelRegistry,
        methods: &BTreeMap<String, RestMethod>,
    ) -> Result<(), CodegenError> {
        for (name, method) in methods {
            self.add_method(stack, registry, name, method)?;
        }
        Ok(())
    }

    fn add_method(
        &self,
        stack: &mut ComponentStack,
        registry: &mut ModelRegistry,
        name: &str,
        method: &RestMethod,
    ) -> Result<(), CodegenError> {
        let identifier: Identifier = Identifier::resolve(name);
        // Required parameters are typed before the class is opened; their
        // nested types still belong to it.
        let class_name: QualifiedName = stack.child_name(&identifier);
        let required_names: Vec<&str> = required_parameters(method);
        let mut pending_nested: Vec<Declaration> = Vec::new();
        let mut required: Vec<ParamDescriptor> = Vec::with_capacity(required_names.len());
        for &parameter in &required_names {
            let Some(schema) = method.parameters.get(parameter) else {
                return Err(CodegenError::UndeclaredParameter {
                    method: method.id.clone().unwrap_or_else(|| name.to_string()),
                    parameter: parameter.to_string(),
                });
            };
            let param_identifier: Identifier = Identifier::resolve(parameter);
            let (ty, nested) = self.resolve_into(
                registry,
                schema,
                Scope::field(&param_identifier, &class_name),
            )?;
            pending_nested.extend(nested);
            required.push(ParamDescriptor::new(param_identifier, ty));
        }

        let body: Option<ParamDescriptor> = method.request.as_ref().map(|request| {
            ParamDescriptor::new(
                Identifier::resolve(BODY_PARAM),
                self.resolver().reference(&request.reference),
            )
        });
        let response: TypeDescriptor = method
            .response
            .as_ref()
            .map_or(TypeDescriptor::Void, |r| self.resolver().reference(&r.reference));

        let spec: ComponentSpec = ComponentSpec {
            name: identifier,
            documentation: method.description.clone(),
            body,
            required,
        };
        stack.scoped(spec, |stack| {
            let body_identifier: Option<Identifier> = method
                .request
                .as_ref()
                .map(|_| Identifier::resolve(BODY_PARAM));
            {
                let class: &mut ClassDescriptor = stack.current_class_mut();
                class.nested.extend(pending_nested);
                class.super_type = Some(TypeDescriptor::parameterized(
                    TypeDescriptor::Named(self.request_name.clone()),
                    vec![response.clone()],
                ));
                class
                    .constants
                    .push(ConstantDescriptor::literal(PATH_CONSTANT, method.path.as_str()));
                self.add_optional_fields(registry, class, &method.parameters, |parameter| {
                    !required_names.contains(&parameter)
                })?;
            }

            if let Some(runtime_constructor) = BASE_REQUEST.primary_constructor() {
                let call: MethodCall<'_> = MethodCall {
                    response: &response,
                    http_method: &method.http_method,
                    path_constant: PATH_CONSTANT,
                    body: body_identifier.as_ref(),
                };
                let args: Vec<Expr> = runtime_constructor.arguments(&call);
                if let Some(constructor) = stack.current_constructor_mut() {
                    constructor.body.push(Statement::ForwardToBase { args });
                }
            }
            Ok(())
        })
    }

    /// Adds the parameters accepted by `include` as private, optional key fields.
    fn add_optional_fields<F>(
        &self,
        registry: &mut ModelRegistry,
        class: &mut ClassDescriptor,
        parameters: &BTreeMap<String, JsonSchema>,
        include: F,
    ) -> Result<(), CodegenError>
    where
        F: Fn(&str) -> bool,
    {
        for (name, schema) in parameters {
            if !include(name) {
                continue;
            }
            let identifier: Identifier = Identifier::resolve(name);
            let (ty, nested) =
                self.resolve_into(registry, schema, Scope::field(&identifier, &class.name))?;
            class.nested.extend(nested);

            let mut field: FieldDescriptor = FieldDescriptor::new(identifier, ty);
            field.key = true;
            field.documentation = schema.documentation().map(escape_doc);
            class.fields.push(field);
        }
        Ok(())
    }
}

/// Required parameters in call order: `parameterOrder` first, then parameters
/// flagged required but missing from it, by name.
fn required_parameters(method: &RestMethod) -> Vec<&str> {
    let mut names: Vec<&str> = method.parameter_order.iter().map(String::as_str).collect();
    for (name, schema) in &method.parameters {
        if schema.is_required() && !names.contains(&name.as_str()) {
            names.push(name.as_str());
        }
    }
    names
}
