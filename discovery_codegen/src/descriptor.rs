//! Language-neutral descriptors of the generated code.
//!
//! Descriptors are plain data: the resolver and builders create them once per
//! generation pass, and a renderer turns them into source text.

use crate::identifier::Identifier;
use std::fmt;

/// Fully-qualified name of a generated type: a package plus the chain of
/// enclosing type names, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    package: Vec<String>,
    names: Vec<String>,
}

impl QualifiedName {
    /// A top-level type `name` in `package`.
    #[must_use]
    pub fn top_level(package: &[String], name: impl Into<String>) -> Self {
        Self {
            package: package.to_vec(),
            names: vec![name.into()],
        }
    }

    /// A type named `name` nested inside this one.
    #[must_use]
    pub fn nested(&self, name: impl Into<String>) -> Self {
        let mut names: Vec<String> = self.names.clone();
        names.push(name.into());
        Self {
            package: self.package.clone(),
            names,
        }
    }

    #[must_use]
    pub fn package(&self) -> &[String] {
        &self.package
    }

    /// Enclosing chain including the simple name, outermost first.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.names.last().map_or("", String::as_str)
    }

}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self
            .package
            .iter()
            .chain(self.names.iter())
            .map(String::as_str)
            .collect();
        f.write_str(&joined.join("."))
    }
}

/// Built-in value kinds a schema can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Boolean,
    Int32,
    Int64,
    Float32,
    Float64,
    /// Calendar date without time.
    Date,
    /// Timestamp with a UTC offset.
    DateTime,
    /// IANA time zone identifier.
    TimeZone,
    /// Untyped JSON value.
    Any,
}

/// Types owned by the external client runtime the generated code builds on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeType {
    /// Base type of the generated client entry type.
    Client,
    /// Generic base request type (one type parameter: the response).
    Request,
    /// HTTP verb.
    HttpMethod,
    /// Marker carrying a response type (one type parameter).
    ResponseType,
    /// Serialized request body, possibly absent.
    Content,
}

/// A resolved type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Named(QualifiedName),
    Runtime(RuntimeType),
    Primitive(Primitive),
    List(Box<TypeDescriptor>),
    /// Map with string keys.
    Map(Box<TypeDescriptor>),
    Parameterized {
        raw: Box<TypeDescriptor>,
        args: Vec<TypeDescriptor>,
    },
    Variable(String),
    Void,
}

impl TypeDescriptor {
    #[must_use]
    pub fn list_of(item: Self) -> Self {
        Self::List(Box::new(item))
    }

    #[must_use]
    pub fn map_of(value: Self) -> Self {
        Self::Map(Box::new(value))
    }

    #[must_use]
    pub fn parameterized(raw: Self, args: Vec<Self>) -> Self {
        Self::Parameterized {
            raw: Box::new(raw),
            args,
        }
    }
}

/// How a field's value is written on the wire when it differs from the
/// type's default serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationOverride {
    /// `yyyy-MM-dd'T'HH:mm:ssXXX` string.
    Rfc3339Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub identifier: Identifier,
    pub ty: TypeDescriptor,
    /// Set once through the constructor, never changed afterwards.
    pub required: bool,
    /// Sent on the wire as a request parameter key.
    pub key: bool,
    pub documentation: Option<String>,
    pub serialization_override: Option<SerializationOverride>,
}

impl FieldDescriptor {
    /// An optional, non-key field.
    #[must_use]
    pub fn new(identifier: Identifier, ty: TypeDescriptor) -> Self {
        Self {
            identifier,
            ty,
            required: false,
            key: false,
            documentation: None,
            serialization_override: None,
        }
    }
}

/// A constructor or factory method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
    pub identifier: Identifier,
    pub ty: TypeDescriptor,
}

impl ParamDescriptor {
    #[must_use]
    pub fn new(identifier: Identifier, ty: TypeDescriptor) -> Self {
        Self { identifier, ty }
    }
}

/// Argument expressions in constructor bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// The client instance enclosing the component.
    ClientInstance,
    /// A value standing for a type (e.g. the response type).
    TypeLiteral(TypeDescriptor),
    /// An HTTP verb such as `GET`.
    HttpVerb(String),
    /// A constant of the class under construction.
    Constant(String),
    /// A constructor parameter.
    Param(Identifier),
    /// Explicit absence of a value.
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Pass the arguments to the base type's constructor.
    ForwardToBase { args: Vec<Expr> },
    /// Store the parameter of the same name in `field`, failing fast with
    /// `message` when it is missing or empty.
    RequireNonNull { field: Identifier, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDescriptor {
    pub name: String,
    pub params: Vec<ParamDescriptor>,
    pub body: Vec<Statement>,
}

impl ConstructorDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, params: Vec<ParamDescriptor>) -> Self {
        Self {
            name: name.into(),
            params,
            body: Vec::new(),
        }
    }
}

/// A method on an enclosing type that constructs and returns a nested component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryMethod {
    pub name: Identifier,
    pub params: Vec<ParamDescriptor>,
    pub returns: QualifiedName,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstantValue {
    Literal(String),
    /// Concatenation of other constants of the same class, by name.
    Concat(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantDescriptor {
    pub name: String,
    pub value: ConstantValue,
}

impl ConstantDescriptor {
    #[must_use]
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ConstantValue::Literal(value.into()),
        }
    }
}

/// What a class stands for in the generated client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    /// Value type for a schema.
    Model,
    /// Resource or method, nested under its parent.
    Component,
    /// Client entry type.
    Client,
    /// Per-API request base type.
    RequestBase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDescriptor {
    pub name: QualifiedName,
    pub kind: ClassKind,
    pub documentation: Option<String>,
    pub type_parameters: Vec<String>,
    pub super_type: Option<TypeDescriptor>,
    pub constants: Vec<ConstantDescriptor>,
    pub fields: Vec<FieldDescriptor>,
    pub constructors: Vec<ConstructorDescriptor>,
    pub factories: Vec<FactoryMethod>,
    pub nested: Vec<Declaration>,
}

impl ClassDescriptor {
    #[must_use]
    pub fn new(name: QualifiedName, kind: ClassKind) -> Self {
        Self {
            name,
            kind,
            documentation: None,
            type_parameters: Vec::new(),
            super_type: None,
            constants: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            factories: Vec::new(),
            nested: Vec::new(),
        }
    }

    #[must_use]
    pub fn constant(&self, name: &str) -> Option<&ConstantDescriptor> {
        self.constants.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn field(&self, wire_name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.identifier.wire_name() == wire_name)
    }

    /// The nested class with the given simple name.
    #[must_use]
    pub fn nested_class(&self, simple_name: &str) -> Option<&ClassDescriptor> {
        self.nested.iter().find_map(|d| match d {
            Declaration::Class(c) if c.name.simple_name() == simple_name => Some(c),
            _ => None,
        })
    }

    /// The nested enum with the given simple name.
    #[must_use]
    pub fn nested_enum(&self, simple_name: &str) -> Option<&EnumDescriptor> {
        self.nested.iter().find_map(|d| match d {
            Declaration::Enum(e) if e.name.simple_name() == simple_name => Some(e),
            _ => None,
        })
    }

    #[must_use]
    pub fn factory(&self, name: &str) -> Option<&FactoryMethod> {
        self.factories.iter().find(|m| m.name.wire_name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConstant {
    pub identifier: Identifier,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    pub name: QualifiedName,
    pub documentation: Option<String>,
    /// In discovery order.
    pub constants: Vec<EnumConstant>,
}

/// A generated type: class or enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Class(ClassDescriptor),
    Enum(EnumDescriptor),
}

impl Declaration {
    #[must_use]
    pub fn name(&self) -> &QualifiedName {
        match self {
            Self::Class(c) => &c.name,
            Self::Enum(e) => &e.name,
        }
    }

    /// Nested declarations (always empty for enums).
    #[must_use]
    pub fn nested(&self) -> &[Declaration] {
        match self {
            Self::Class(c) => &c.nested,
            Self::Enum(_) => &[],
        }
    }
}

/// Escapes free text for use as generated documentation.
#[must_use]
pub fn escape_doc(text: &str) -> String {
    text.trim().replace('/', "&#47;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package() -> Vec<String> {
        vec!["generated".to_string(), "calendar".to_string()]
    }

    #[test]
    fn nested_name_extends_the_chain() {
        let client: QualifiedName = QualifiedName::top_level(&package(), "Calendar");
        let actual: QualifiedName = client.nested("Events").nested("Get");
        assert_eq!("generated.calendar.Calendar.Events.Get", actual.to_string());
        assert_eq!("Get", actual.simple_name());
        assert_eq!(client.package(), actual.package());
    }

    #[test]
    fn escape_doc_replaces_slashes() {
        let actual: String = escape_doc(" See https://example.com/a ");
        let expected: &str = "See https:&#47;&#47;example.com&#47;a";
        assert_eq!(expected, actual);
    }
}
