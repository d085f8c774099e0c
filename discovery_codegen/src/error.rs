use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for discovery code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// An object schema has no `id`, no properties with a naming context, and no
    /// `additionalProperties`.
    #[error("no name derivable for object schema {}", describe_field(.field.as_deref()))]
    UnnamedObject { field: Option<String> },

    /// An enum-bearing string schema was reached without a field name hint.
    #[error("no name derivable for enum-bearing string schema (no field name hint)")]
    UnnamedEnum,

    /// A nested class or enum was requested without an enclosing type.
    #[error("enclosing type for nested {kind} `{field}` is missing")]
    MissingContext { kind: &'static str, field: String },

    /// An array schema without an `items` schema.
    #[error("array schema {} has no item schema", describe_field(.field.as_deref()))]
    MissingItems { field: Option<String> },

    /// A top-level type name was registered twice within one API.
    #[error("duplicate type `{name}`")]
    DuplicateType { name: String },

    /// A name listed in `parameterOrder` is missing from `parameters`.
    #[error("required parameter `{parameter}` of method `{method}` is not declared")]
    UndeclaredParameter { method: String, parameter: String },

    /// A component handle was closed while a deeper handle was still open.
    #[error("component `{name}` closed out of order: {open} handle(s) open above it")]
    HandleOutOfOrder { name: String, open: usize },

    /// The component stack was finished while handles were still open.
    #[error("{open} component handle(s) still open")]
    UnclosedHandles { open: usize },

    /// An API selector that is not of the form `name:version`.
    #[error("invalid API selector `{0}`, expected `name:version`")]
    InvalidApiSelector(String),

    /// The enum value pattern failed to compile.
    #[error("invalid enum value pattern: {0}")]
    Pattern(String),

    /// I/O error (e.g., reading a discovery document).
    #[error(transparent)]
    Io(#[from] io::Error),

    /// JSON parsing error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Failure to persist a generated source unit.
    #[error("failed to write `{}`: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A named top-level schema could not be resolved; wraps the underlying cause.
    #[error("schema `{name}`: {source}")]
    Schema {
        name: String,
        #[source]
        source: Box<CodegenError>,
    },

    /// Two selected APIs would be generated into the same package.
    #[error("APIs `{first}` and `{second}` both generate package `{package}`")]
    PackageCollision {
        package: String,
        first: String,
        second: String,
    },

    /// Generation of one API failed; wraps the underlying cause.
    #[error("failed to generate API `{api}`: {source}")]
    Api {
        api: String,
        #[source]
        source: Box<CodegenError>,
    },
}

impl CodegenError {
    /// Wraps this error with the name of the top-level schema being resolved.
    #[must_use]
    pub fn for_schema(self, name: impl Into<String>) -> Self {
        Self::Schema {
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// Wraps this error with the identity of the API being generated.
    #[must_use]
    pub fn for_api(self, api: impl Into<String>) -> Self {
        match self {
            already @ Self::Api { .. } => already,
            other => Self::Api {
                api: api.into(),
                source: Box::new(other),
            },
        }
    }
}

fn describe_field(field: Option<&str>) -> String {
    field.map_or_else(|| "(anonymous)".to_string(), |f| format!("for field `{f}`"))
}
