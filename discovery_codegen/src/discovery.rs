//! API description (discovery document) input model.
//!
//! Only the fields used by the generator are modeled. Extra keys in the JSON
//! are ignored via serde's default behavior. Uses `BTreeMap` for deterministic
//! ordering of schemas, properties, resources, methods and parameters.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Root of an API description.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestDescription {
    pub name: String,

    pub version: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub root_url: Option<String>,

    #[serde(default)]
    pub service_path: Option<String>,

    #[serde(default)]
    pub batch_path: Option<String>,

    /// Parameters accepted by every method of the API.
    #[serde(default)]
    pub parameters: BTreeMap<String, JsonSchema>,

    #[serde(default)]
    pub schemas: BTreeMap<String, JsonSchema>,

    #[serde(default)]
    pub resources: BTreeMap<String, RestResource>,

    /// Methods declared directly on the API, outside any resource.
    #[serde(default)]
    pub methods: BTreeMap<String, RestMethod>,
}

impl RestDescription {
    /// `name:version`, used to identify the API in errors and logs.
    #[must_use]
    pub fn selector(&self) -> String {
        format!("{}:{}", self.name, self.version)
    }
}

/// A resource: a named group of methods and sub-resources.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestResource {
    #[serde(default)]
    pub methods: BTreeMap<String, RestMethod>,

    #[serde(default)]
    pub resources: BTreeMap<String, RestResource>,
}

/// A method attached to a resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestMethod {
    #[serde(default)]
    pub id: Option<String>,

    pub path: String,

    pub http_method: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Names of the required parameters, in call order.
    #[serde(default)]
    pub parameter_order: Vec<String>,

    #[serde(default)]
    pub parameters: BTreeMap<String, JsonSchema>,

    #[serde(default)]
    pub request: Option<SchemaRef>,

    #[serde(default)]
    pub response: Option<SchemaRef>,
}

/// A `{"$ref": "Name"}` pointer to a named schema.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchemaRef {
    #[serde(rename = "$ref")]
    pub reference: String,
}

/// One node of the API description's type system.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSchema {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default, rename = "$ref")]
    pub reference: Option<String>,

    #[serde(default)]
    pub r#type: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub properties: Option<BTreeMap<String, JsonSchema>>,

    #[serde(default)]
    pub additional_properties: Option<Box<JsonSchema>>,

    #[serde(default)]
    pub items: Option<Box<JsonSchema>>,

    /// Parameter-only: whether the parameter must be supplied.
    #[serde(default)]
    pub required: Option<bool>,

    #[serde(default)]
    pub r#enum: Option<Vec<String>>,

    #[serde(default)]
    pub enum_descriptions: Option<Vec<String>>,
}

/// Classification of a [`JsonSchema`] node by its `$ref` / `type` keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind<'a> {
    Reference(&'a str),
    Object,
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Array,
    Any,
    /// An unrecognized or missing `type` tag.
    Unknown(Option<&'a str>),
}

impl JsonSchema {
    /// Classifies this node. A `$ref` wins over any `type`.
    #[must_use]
    pub fn kind(&self) -> SchemaKind<'_> {
        if let Some(target) = self.reference.as_deref() {
            return SchemaKind::Reference(target);
        }
        match self.r#type.as_deref() {
            Some("object") => SchemaKind::Object,
            Some("string") => SchemaKind::String,
            Some("number") => SchemaKind::Number,
            Some("integer") => SchemaKind::Integer,
            Some("boolean") => SchemaKind::Boolean,
            Some("null") => SchemaKind::Null,
            Some("array") => SchemaKind::Array,
            Some("any") => SchemaKind::Any,
            other => SchemaKind::Unknown(other),
        }
    }

    /// True when this parameter schema is flagged as required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    /// The description, trimmed, with empty/whitespace treated as absent.
    #[must_use]
    pub fn documentation(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_wins_over_type() {
        let schema: JsonSchema = serde_json::from_value(serde_json::json!({
            "$ref": "Event",
            "type": "object"
        }))
        .expect("valid schema");
        assert_eq!(SchemaKind::Reference("Event"), schema.kind());
    }

    #[test]
    fn unknown_and_missing_types_are_unknown() {
        let unknown: JsonSchema =
            serde_json::from_value(serde_json::json!({ "type": "tuple" })).expect("valid schema");
        let missing: JsonSchema = JsonSchema::default();
        assert_eq!(SchemaKind::Unknown(Some("tuple")), unknown.kind());
        assert_eq!(SchemaKind::Unknown(None), missing.kind());
    }

    #[test]
    fn documentation_ignores_blank_descriptions() {
        let schema: JsonSchema = JsonSchema {
            description: Some("   ".to_string()),
            ..JsonSchema::default()
        };
        assert_eq!(None, schema.documentation());
    }

    #[test]
    fn deserializes_method_with_request_and_response() {
        let method: RestMethod = serde_json::from_value(serde_json::json!({
            "id": "calendar.events.insert",
            "path": "calendars/{calendarId}/events",
            "httpMethod": "POST",
            "parameterOrder": ["calendarId"],
            "parameters": {
                "calendarId": { "type": "string", "required": true, "location": "path" },
                "sendUpdates": { "type": "string", "location": "query" }
            },
            "request": { "$ref": "Event" },
            "response": { "$ref": "Event" }
        }))
        .expect("valid method");

        assert_eq!(vec!["calendarId".to_string()], method.parameter_order);
        assert!(method.parameters["calendarId"].is_required());
        assert!(!method.parameters["sendUpdates"].is_required());
        assert_eq!(
            Some(SchemaRef {
                reference: "Event".to_string()
            }),
            method.request
        );
    }
}
