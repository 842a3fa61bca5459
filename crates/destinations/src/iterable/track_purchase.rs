//! Iterable "Track Purchase" action.
//!
//! Reshapes a resolved "Order Completed" payload into the body of
//! `POST /api/commerce/trackPurchase` and sends it through the injected
//! request client. The payload is never modified; the request body is built
//! as a new value.

use actions_core::{
    ActionDefinition, ActionError, ActionResult, FieldDefault, FieldDefinition, FieldType,
    RequestClient, RequestOptions, Response,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::{debug, info, warn};

use super::shared_fields::{
    campaign_id_field, created_at_field, email_field, event_data_fields, items_field,
    merge_nested_objects_field, template_id_field, user_data_fields, user_id_field,
    user_phone_number_field, CommerceItem,
};
use super::utils::{convert_dates_in_object, to_epoch_seconds, transform_items, DateValue};

pub const TRACK_PURCHASE_URL: &str = "https://api.iterable.com/api/commerce/trackPurchase";

/// Key removed from event data fields; line items travel in `items`.
const PRODUCTS_KEY: &str = "products";
const PHONE_NUMBER_KEY: &str = "phoneNumber";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_nested_objects: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_fields: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl PurchaseUser {
    fn has_identifier(&self) -> bool {
        let present = |field: &Option<String>| field.as_deref().is_some_and(|v| !v.is_empty());
        present(&self.email) || present(&self.user_id)
    }
}

/// Resolved input of the action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPurchasePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user: PurchaseUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_fields: Option<Map<String, Value>>,
    pub items: Vec<CommerceItem>,
    pub total: Number,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPurchaseUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_nested_objects: Option<bool>,
    pub data_fields: Map<String, Value>,
}

/// Body of the trackPurchase request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPurchaseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user: TrackPurchaseUser,
    pub items: Vec<CommerceItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i64>,
    pub created_at: i64,
    pub total: Number,
    pub data_fields: Map<String, Value>,
}

pub fn definition() -> ActionDefinition {
    ActionDefinition {
        title: "Track Purchase",
        description: "Tracks a purchase to Iterable",
        default_subscription: r#"type = "track" and event == "Order Completed""#,
        fields: vec![
            (
                "id",
                FieldDefinition::new("Order ID", FieldType::String)
                    .description(
                        "If a purchase exists with that id, the purchase will be updated. \
                         If none is specified, Iterable generates a new id.",
                    )
                    .default_value(FieldDefault::Path("$.properties.order_id")),
            ),
            (
                "user",
                FieldDefinition::new("User Data", FieldType::Object)
                    .description("Updates user data or adds a user if none exists")
                    .required()
                    .default_value(FieldDefault::Object(vec![
                        (
                            "email",
                            FieldDefault::PathOr("$.properties.email", "$.context.traits.email"),
                        ),
                        ("userId", FieldDefault::Path("$.userId")),
                        ("dataFields", FieldDefault::Path("$.context.traits")),
                        ("phoneNumber", FieldDefault::Path("$.context.traits.phone")),
                        ("mergeNestedObjects", FieldDefault::Literal(Value::Bool(false))),
                    ]))
                    .property("email", email_field())
                    .property("userId", user_id_field())
                    .property("dataFields", user_data_fields())
                    .property("mergeNestedObjects", merge_nested_objects_field())
                    .property("phoneNumber", user_phone_number_field()),
            ),
            ("dataFields", event_data_fields()),
            ("items", items_field()),
            (
                "total",
                FieldDefinition::new("Total", FieldType::Number)
                    .description("Total order amount.")
                    .required()
                    .default_value(FieldDefault::Path("$.properties.total")),
            ),
            ("createdAt", created_at_field()),
            ("campaignId", campaign_id_field()),
            ("templateId", template_id_field()),
        ],
    }
}

/// Iterable identifies users by email or userId; one of them is required.
pub fn validate(payload: &TrackPurchasePayload) -> ActionResult<()> {
    if !payload.user.has_identifier() {
        return Err(ActionError::PayloadValidation(
            "Must include email or userId.".to_string(),
        ));
    }
    Ok(())
}

/// Build the request body. `now` stands in for a missing `createdAt`.
pub fn build_request(
    payload: &TrackPurchasePayload,
    now: DateTime<Utc>,
) -> ActionResult<TrackPurchaseRequest> {
    validate(payload)?;

    let empty = Map::new();
    let mut data_fields = convert_dates_in_object(payload.data_fields.as_ref().unwrap_or(&empty));
    data_fields.remove(PRODUCTS_KEY);

    let mut user_data_fields =
        convert_dates_in_object(payload.user.data_fields.as_ref().unwrap_or(&empty));
    match &payload.user.phone_number {
        Some(phone) => {
            user_data_fields.insert(PHONE_NUMBER_KEY.to_string(), Value::String(phone.clone()));
        }
        None => {
            user_data_fields.remove(PHONE_NUMBER_KEY);
        }
    }

    let request = TrackPurchaseRequest {
        id: payload.id.clone(),
        user: TrackPurchaseUser {
            email: payload.user.email.clone(),
            user_id: payload.user.user_id.clone(),
            merge_nested_objects: payload.user.merge_nested_objects,
            data_fields: user_data_fields,
        },
        items: transform_items(&payload.items),
        campaign_id: payload.campaign_id,
        template_id: payload.template_id,
        created_at: to_epoch_seconds(payload.created_at.as_ref(), now)?,
        total: payload.total.clone(),
        data_fields,
    };

    debug!(
        order_id = ?request.id,
        items = request.items.len(),
        created_at = request.created_at,
        "assembled trackPurchase request"
    );
    Ok(request)
}

/// Send one purchase to Iterable. Validation failures return before any
/// request is made; client errors are returned as-is.
pub async fn perform<C>(client: &C, payload: &TrackPurchasePayload) -> ActionResult<Response>
where
    C: RequestClient + ?Sized,
{
    let request = match build_request(payload, Utc::now()) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "rejected trackPurchase payload");
            metrics::counter!("iterable.track_purchase.rejected").increment(1);
            return Err(e);
        }
    };

    let body = serde_json::to_value(&request)?;
    info!(order_id = ?request.id, total = %request.total, "sending purchase to Iterable");

    let response = client
        .request(TRACK_PURCHASE_URL, RequestOptions::post(body))
        .await?;
    metrics::counter!("iterable.track_purchase.sent").increment(1);
    Ok(response)
}
