//! Field declarations and the commerce item shape shared by Iterable actions.

use actions_core::{FieldDefault, FieldDefinition, FieldType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Product categories as sent by sources: a single (possibly comma separated)
/// string or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Categories {
    One(String),
    Many(Vec<String>),
}

/// One line item of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommerceItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Categories>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_fields: Option<Map<String, Value>>,
}

impl CommerceItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sku: None,
            name: None,
            description: None,
            categories: None,
            price: None,
            quantity: None,
            image_url: None,
            url: None,
            data_fields: None,
        }
    }
}

pub fn email_field() -> FieldDefinition {
    FieldDefinition::new("Email Address", FieldType::String)
        .description("An email address that identifies a user profile in Iterable.")
}

pub fn user_id_field() -> FieldDefinition {
    FieldDefinition::new("User ID", FieldType::String)
        .description("A user ID that identifies a user profile in Iterable.")
}

pub fn user_data_fields() -> FieldDefinition {
    FieldDefinition::new("User Data Fields", FieldType::Object)
        .description("Data to store on the user profile.")
}

pub fn user_phone_number_field() -> FieldDefinition {
    FieldDefinition::new("User Phone Number", FieldType::String)
        .description("User phone number. Must be in E.164 format.")
}

pub fn merge_nested_objects_field() -> FieldDefinition {
    FieldDefinition::new("Merge Nested Objects", FieldType::Boolean).description(
        "Merge top level objects instead of overwriting them on the user profile.",
    )
}

pub fn event_data_fields() -> FieldDefinition {
    FieldDefinition::new("Event Data Fields", FieldType::Object)
        .description("Additional event properties.")
        .default_value(FieldDefault::Path("$.properties"))
}

pub fn created_at_field() -> FieldDefinition {
    FieldDefinition::new("Timestamp", FieldType::Datetime)
        .description("Time the event happened.")
        .default_value(FieldDefault::Path("$.timestamp"))
}

pub fn campaign_id_field() -> FieldDefinition {
    FieldDefinition::new("Campaign ID", FieldType::Integer)
        .description("Iterable campaign the event is attributed to.")
        .default_value(FieldDefault::Path("$.properties.campaign_id"))
}

pub fn template_id_field() -> FieldDefinition {
    FieldDefinition::new("Template ID", FieldType::Integer)
        .description("Iterable template the event is attributed to.")
        .default_value(FieldDefault::Path("$.properties.template_id"))
}

pub fn items_field() -> FieldDefinition {
    FieldDefinition::new("Cart Items", FieldType::Object)
        .description("Line items of the order.")
        .required()
        .multiple()
        .default_value(FieldDefault::ArrayPath("$.properties.products"))
        .property(
            "id",
            FieldDefinition::new("Product ID", FieldType::String)
                .required()
                .default_value(FieldDefault::Path("$.product_id")),
        )
        .property(
            "sku",
            FieldDefinition::new("SKU", FieldType::String)
                .default_value(FieldDefault::Path("$.sku")),
        )
        .property(
            "name",
            FieldDefinition::new("Product Name", FieldType::String)
                .default_value(FieldDefault::Path("$.name")),
        )
        .property(
            "price",
            FieldDefinition::new("Price", FieldType::Number)
                .default_value(FieldDefault::Path("$.price")),
        )
        .property(
            "quantity",
            FieldDefinition::new("Quantity", FieldType::Integer)
                .default_value(FieldDefault::Path("$.quantity")),
        )
        .property(
            "categories",
            FieldDefinition::new("Categories", FieldType::String)
                .default_value(FieldDefault::Path("$.category")),
        )
        .property(
            "url",
            FieldDefinition::new("Product URL", FieldType::String)
                .default_value(FieldDefault::Path("$.url")),
        )
        .property(
            "imageUrl",
            FieldDefinition::new("Image URL", FieldType::String)
                .default_value(FieldDefault::Path("$.image_url")),
        )
}
