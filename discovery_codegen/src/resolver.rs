//! Schema-to-type resolution.
//!
//! [`TypeResolver::resolve`] maps a schema node to a [`TypeDescriptor`]. It
//! does not write anywhere: every class or enum created along the way is
//! returned as an [`Emission`] and the caller merges it into the model
//! registry (top-level) or into the enclosing class (nested). Emissions are in
//! depth-first post-order, so a nested type always precedes its parent.

use crate::descriptor::{
    ClassDescriptor, ClassKind, Declaration, EnumConstant, EnumDescriptor, FieldDescriptor,
    Primitive, QualifiedName, SerializationOverride, TypeDescriptor, escape_doc,
};
use crate::discovery::{JsonSchema, SchemaKind};
use crate::enum_values::EnumMiner;
use crate::error::CodegenError;
use crate::identifier::Identifier;
use tracing::warn;

/// Descriptions containing this phrase mark RFC 3339 timestamp strings.
const RFC3339_MARKER: &str = "formatted according to RFC3339";

/// Wire name of the field that always holds a time zone identifier.
const TIME_ZONE_FIELD: &str = "timeZone";

/// Naming context of a schema use site.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope<'a> {
    /// Name of the field or parameter holding the schema.
    pub hint: Option<&'a Identifier>,
    /// Type that nested types created for the schema belong to.
    pub enclosing: Option<&'a QualifiedName>,
}

impl<'a> Scope<'a> {
    /// No field name, no enclosing type: a top-level schema.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// A field named `hint` of the type `enclosing`.
    #[must_use]
    pub fn field(hint: &'a Identifier, enclosing: &'a QualifiedName) -> Self {
        Self {
            hint: Some(hint),
            enclosing: Some(enclosing),
        }
    }

    fn hint_name(&self) -> Option<String> {
        self.hint.map(|h| h.wire_name().to_string())
    }
}

/// A type created as a side product of resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    /// A named model type, owned by the model registry.
    TopLevel(ClassDescriptor),
    /// A type nested in the scope's enclosing type.
    Nested(Declaration),
}

/// Result of resolving one schema node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub ty: TypeDescriptor,
    pub emitted: Vec<Emission>,
}

impl Resolved {
    fn plain(ty: TypeDescriptor) -> Self {
        Self {
            ty,
            emitted: Vec::new(),
        }
    }

    /// Splits the emissions into nested declarations and top-level classes.
    #[must_use]
    pub fn split(self) -> (TypeDescriptor, Vec<Declaration>, Vec<ClassDescriptor>) {
        let mut nested: Vec<Declaration> = Vec::new();
        let mut top_level: Vec<ClassDescriptor> = Vec::new();
        for emission in self.emitted {
            match emission {
                Emission::TopLevel(class) => top_level.push(class),
                Emission::Nested(declaration) => nested.push(declaration),
            }
        }
        (self.ty, nested, top_level)
    }
}

/// Resolves schema nodes of one API against its model package.
#[derive(Debug)]
pub struct TypeResolver<'a> {
    model_package: &'a [String],
    miner: &'a EnumMiner,
}

impl<'a> TypeResolver<'a> {
    #[must_use]
    pub fn new(model_package: &'a [String], miner: &'a EnumMiner) -> Self {
        Self {
            model_package,
            miner,
        }
    }

    /// The model type a `$ref` points to.
    #[must_use]
    pub fn reference(&self, target: &str) -> TypeDescriptor {
        TypeDescriptor::Named(QualifiedName::top_level(self.model_package, target))
    }

    /// Resolves `schema` used at `scope`.
    ///
    /// # Errors
    ///
    /// Returns a malformed-description error when an object or enum has no
    /// derivable name, or a missing-context error when a nested type is needed
    /// but the scope has no enclosing type.
    pub fn resolve(&self, schema: &JsonSchema, scope: Scope<'_>) -> Result<Resolved, CodegenError> {
        let resolved: Resolved = match schema.kind() {
            SchemaKind::Reference(target) => Resolved::plain(self.reference(target)),
            SchemaKind::Object => self.resolve_object(schema, scope)?,
            SchemaKind::String => self.resolve_string(schema, scope)?,
            SchemaKind::Number => Resolved::plain(resolve_number(schema, scope)),
            SchemaKind::Integer => Resolved::plain(TypeDescriptor::Primitive(Primitive::Int32)),
            SchemaKind::Boolean => Resolved::plain(TypeDescriptor::Primitive(Primitive::Boolean)),
            SchemaKind::Null => Resolved::plain(TypeDescriptor::Void),
            SchemaKind::Any => Resolved::plain(TypeDescriptor::Primitive(Primitive::Any)),
            SchemaKind::Array => {
                let Some(ref items) = schema.items else {
                    return Err(CodegenError::MissingItems {
                        field: scope.hint_name(),
                    });
                };
                let item: Resolved = self.resolve(items, scope)?;
                Resolved {
                    ty: TypeDescriptor::list_of(item.ty),
                    emitted: item.emitted,
                }
            }
            SchemaKind::Unknown(tag) => {
                warn!(
                    schema_type = tag.unwrap_or("<missing>"),
                    schema_id = schema.id.as_deref().unwrap_or("<anonymous>"),
                    field = scope.hint.map_or("<none>", Identifier::wire_name),
                    "don't know how to handle schema type, falling back to void"
                );
                Resolved::plain(TypeDescriptor::Void)
            }
        };
        Ok(resolved)
    }

    fn resolve_object(&self, schema: &JsonSchema, scope: Scope<'_>) -> Result<Resolved, CodegenError> {
        // An id names a top-level model class.
        if let Some(ref id) = schema.id {
            let name: QualifiedName = QualifiedName::top_level(self.model_package, id.as_str());
            let (mut class, mut emitted) = self.build_model_class(schema, name.clone())?;
            if scope.enclosing.is_none() {
                class.documentation = schema.documentation().map(escape_doc);
            }
            emitted.push(Emission::TopLevel(class));
            return Ok(Resolved {
                ty: TypeDescriptor::Named(name),
                emitted,
            });
        }

        // Without an id, regular properties make a class nested in the enclosing type.
        if let Some(hint) = scope.hint
            && schema.properties.is_some()
        {
            let Some(enclosing) = scope.enclosing else {
                return Err(CodegenError::MissingContext {
                    kind: "class",
                    field: hint.wire_name().to_string(),
                });
            };
            let name: QualifiedName = enclosing.nested(hint.to_type_name());
            let (class, mut emitted) = self.build_model_class(schema, name.clone())?;
            emitted.push(Emission::Nested(Declaration::Class(class)));
            return Ok(Resolved {
                ty: TypeDescriptor::Named(name),
                emitted,
            });
        }

        // Only additional properties: a string-keyed map.
        if let Some(ref value_schema) = schema.additional_properties {
            let value: Resolved = self.resolve(value_schema, scope)?;
            return Ok(Resolved {
                ty: TypeDescriptor::map_of(value.ty),
                emitted: value.emitted,
            });
        }

        Err(CodegenError::UnnamedObject {
            field: scope.hint_name(),
        })
    }

    /// Builds a model class from `schema`'s properties. Nested emissions of the
    /// properties are attached to the class; top-level ones are passed back.
    fn build_model_class(
        &self,
        schema: &JsonSchema,
        name: QualifiedName,
    ) -> Result<(ClassDescriptor, Vec<Emission>), CodegenError> {
        let mut class: ClassDescriptor = ClassDescriptor::new(name, ClassKind::Model);
        let mut passed_up: Vec<Emission> = Vec::new();

        for (key, property) in schema.properties.iter().flatten() {
            let identifier: Identifier = Identifier::resolve(key);
            let resolved: Resolved = self.resolve(property, Scope::field(&identifier, &class.name))?;
            let (ty, nested, top_level) = resolved.split();
            class.nested.extend(nested);
            passed_up.extend(top_level.into_iter().map(Emission::TopLevel));

            let mut field: FieldDescriptor = FieldDescriptor::new(identifier, ty);
            field.documentation = property.documentation().map(escape_doc);
            field.serialization_override = serialization_override(property);
            class.fields.push(field);
        }

        Ok((class, passed_up))
    }

    fn resolve_string(&self, schema: &JsonSchema, scope: Scope<'_>) -> Result<Resolved, CodegenError> {
        match schema.format.as_deref() {
            Some("date") => return Ok(Resolved::plain(TypeDescriptor::Primitive(Primitive::Date))),
            Some("date-time") => {
                return Ok(Resolved::plain(TypeDescriptor::Primitive(Primitive::DateTime)));
            }
            Some("int64") => return Ok(Resolved::plain(TypeDescriptor::Primitive(Primitive::Int64))),
            _ => {}
        }

        if let Some(ref description) = schema.description
            && EnumMiner::applies_to(description)
        {
            let constants: Vec<EnumConstant> = self
                .miner
                .mine(description)
                .into_iter()
                .map(|value| EnumConstant {
                    identifier: Identifier::resolve(&value.token),
                    documentation: Some(escape_doc(&value.documentation)),
                })
                .collect();
            return nested_enum(scope, constants);
        }

        if let Some(ref values) = schema.r#enum
            && !values.is_empty()
        {
            let descriptions: &[String] = schema.enum_descriptions.as_deref().unwrap_or(&[]);
            let constants: Vec<EnumConstant> = values
                .iter()
                .enumerate()
                .map(|(i, value)| EnumConstant {
                    identifier: Identifier::resolve(value),
                    documentation: descriptions
                        .get(i)
                        .map(|d| d.trim())
                        .filter(|d| !d.is_empty())
                        .map(escape_doc),
                })
                .collect();
            return nested_enum(scope, constants);
        }

        let is_time_zone: bool = scope.hint.is_some_and(|h| h.wire_name() == TIME_ZONE_FIELD);
        let primitive: Primitive = if is_time_zone {
            Primitive::TimeZone
        } else {
            Primitive::String
        };
        Ok(Resolved::plain(TypeDescriptor::Primitive(primitive)))
    }
}

/// Wraps `constants` into an enum nested in the scope's enclosing type, named
/// after the scope's field.
fn nested_enum(scope: Scope<'_>, constants: Vec<EnumConstant>) -> Result<Resolved, CodegenError> {
    let Some(hint) = scope.hint else {
        return Err(CodegenError::UnnamedEnum);
    };
    let Some(enclosing) = scope.enclosing else {
        return Err(CodegenError::MissingContext {
            kind: "enum",
            field: hint.wire_name().to_string(),
        });
    };
    let name: QualifiedName = enclosing.nested(hint.to_type_name());
    let descriptor: EnumDescriptor = EnumDescriptor {
        name: name.clone(),
        documentation: None,
        constants,
    };
    Ok(Resolved {
        ty: TypeDescriptor::Named(name),
        emitted: vec![Emission::Nested(Declaration::Enum(descriptor))],
    })
}

fn resolve_number(schema: &JsonSchema, scope: Scope<'_>) -> TypeDescriptor {
    match schema.format.as_deref() {
        Some("float") => TypeDescriptor::Primitive(Primitive::Float32),
        Some("double") => TypeDescriptor::Primitive(Primitive::Float64),
        Some(other) => {
            warn!(
                format = other,
                schema_id = schema.id.as_deref().unwrap_or("<anonymous>"),
                field = scope.hint.map_or("<none>", Identifier::wire_name),
                "don't know how to handle number format, defaulting to 64-bit integer"
            );
            TypeDescriptor::Primitive(Primitive::Int64)
        }
        None => TypeDescriptor::Primitive(Primitive::Int64),
    }
}

fn serialization_override(property: &JsonSchema) -> Option<SerializationOverride> {
    property
        .description
        .as_deref()
        .filter(|d| d.contains(RFC3339_MARKER))
        .map(|_| SerializationOverride::Rfc3339Timestamp)
}
