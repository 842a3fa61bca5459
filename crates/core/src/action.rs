//! Declarative schema for destination actions.
//!
//! A field's `default` records where the platform's mapping engine reads the
//! value from. Actions only ever receive fully-resolved payloads, so nothing
//! in this crate interprets the path strings.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Datetime,
}

/// Source of a field's default value in the raw event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldDefault {
    /// Read a single path.
    Path(&'static str),
    /// Read the first path when it exists, otherwise the second.
    PathOr(&'static str, &'static str),
    /// A constant value.
    Literal(Value),
    /// Map every element of the array at the path.
    ArrayPath(&'static str),
    /// Nested object whose properties carry their own defaults.
    Object(Vec<(&'static str, FieldDefault)>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDefinition {
    pub label: &'static str,
    pub description: &'static str,
    pub field_type: FieldType,
    pub required: bool,
    pub multiple: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldDefault>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<(&'static str, FieldDefinition)>,
}

impl FieldDefinition {
    pub fn new(label: &'static str, field_type: FieldType) -> Self {
        Self {
            label,
            description: "",
            field_type,
            required: false,
            multiple: false,
            default: None,
            properties: Vec::new(),
        }
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn default_value(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    pub fn property(mut self, name: &'static str, field: FieldDefinition) -> Self {
        self.properties.push((name, field));
        self
    }
}

/// A named, schema-validated operation forwarding event data to one vendor.
#[derive(Debug, Clone, Serialize)]
pub struct ActionDefinition {
    pub title: &'static str,
    pub description: &'static str,
    pub default_subscription: &'static str,
    pub fields: Vec<(&'static str, FieldDefinition)>,
}

impl ActionDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields
            .iter()
            .find(|(field_name, _)| *field_name == name)
            .map(|(_, field)| field)
    }

    /// Names of the top-level fields marked required.
    pub fn required_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|(_, field)| field.required)
            .map(|(name, _)| *name)
            .collect()
    }
}
