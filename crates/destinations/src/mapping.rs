//! Default field mappings from a raw platform event to action payloads.
//!
//! Each action declares where its fields come from in the event (see the
//! `default` of its field definitions). These functions apply those
//! defaults directly so actions only ever see resolved payloads.

use actions_core::{ActionError, ActionResult};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::iterable::{Categories, CommerceItem, DateValue, PurchaseUser, TrackPurchasePayload};

/// Follow `path` through nested objects. Explicit nulls count as absent.
fn lookup<'a>(event: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = event;
    for key in path {
        current = current.get(*key)?;
    }
    (!current.is_null()).then_some(current)
}

fn string_at(event: &Value, path: &[&str], field: &str) -> ActionResult<Option<String>> {
    match lookup(event, path) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(ActionError::invalid_field(
            field,
            format!("expected a string, got {other}"),
        )),
    }
}

fn number(value: &Value, field: &str) -> ActionResult<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|n| n.is_finite())
        .ok_or_else(|| ActionError::invalid_field(field, format!("expected a number, got {value}")))
}

/// Numeric fields that are forwarded unchanged keep their JSON number form;
/// numeric strings are coerced.
fn json_number(value: &Value, field: &str) -> ActionResult<Number> {
    match value {
        Value::Number(n) => Ok(n.clone()),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .map(Number::from)
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(Number::from_f64))
                .ok_or_else(|| {
                    ActionError::invalid_field(field, format!("expected a number, got {value}"))
                })
        }
        _ => Err(ActionError::invalid_field(
            field,
            format!("expected a number, got {value}"),
        )),
    }
}

fn integer(value: &Value, field: &str) -> ActionResult<i64> {
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    let n = number(value, field)?;
    if n.fract() != 0.0 {
        return Err(ActionError::invalid_field(
            field,
            format!("expected an integer, got {value}"),
        ));
    }
    Ok(n as i64)
}

fn optional<T>(
    event: &Value,
    path: &[&str],
    field: &str,
    convert: fn(&Value, &str) -> ActionResult<T>,
) -> ActionResult<Option<T>> {
    lookup(event, path).map(|v| convert(v, field)).transpose()
}

fn object_at(event: &Value, path: &[&str]) -> Option<Map<String, Value>> {
    lookup(event, path).and_then(Value::as_object).cloned()
}

fn date_at(event: &Value, path: &[&str], field: &str) -> ActionResult<Option<DateValue>> {
    match lookup(event, path) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(DateValue::Text(s.clone()))),
        Some(value @ Value::Number(_)) => Ok(Some(DateValue::Epoch(number(value, field)?))),
        Some(other) => Err(ActionError::invalid_field(
            field,
            format!("expected a date, got {other}"),
        )),
    }
}

fn categories(value: &Value, field: &str) -> ActionResult<Categories> {
    match value {
        Value::String(s) => Ok(Categories::One(s.clone())),
        Value::Array(values) => values
            .iter()
            .map(|v| {
                v.as_str()
                    .map(String::from)
                    .ok_or_else(|| ActionError::invalid_field(field, "categories must be strings"))
            })
            .collect::<ActionResult<Vec<_>>>()
            .map(Categories::Many),
        other => Err(ActionError::invalid_field(
            field,
            format!("expected a string or list, got {other}"),
        )),
    }
}

fn commerce_item(index: usize, product: &Value) -> ActionResult<CommerceItem> {
    let field = |name: &str| format!("items[{index}].{name}");
    if !product.is_object() {
        return Err(ActionError::invalid_field(
            format!("items[{index}]"),
            "expected an object",
        ));
    }

    let id = string_at(product, &["product_id"], &field("id"))?
        .ok_or_else(|| ActionError::MissingField(field("id")))?;

    Ok(CommerceItem {
        id,
        sku: string_at(product, &["sku"], &field("sku"))?,
        name: string_at(product, &["name"], &field("name"))?,
        description: string_at(product, &["description"], &field("description"))?,
        categories: optional(product, &["category"], &field("categories"), categories)?,
        price: optional(product, &["price"], &field("price"), number)?,
        quantity: optional(product, &["quantity"], &field("quantity"), integer)?,
        image_url: string_at(product, &["image_url"], &field("imageUrl"))?,
        url: string_at(product, &["url"], &field("url"))?,
        data_fields: None,
    })
}

/// Resolve the Iterable trackPurchase payload from an "Order Completed" event.
pub fn track_purchase_payload(event: &Value) -> ActionResult<TrackPurchasePayload> {
    let email = match string_at(event, &["properties", "email"], "user.email")? {
        Some(email) => Some(email),
        None => string_at(event, &["context", "traits", "email"], "user.email")?,
    };

    let user = PurchaseUser {
        email,
        user_id: string_at(event, &["userId"], "user.userId")?,
        merge_nested_objects: Some(false),
        data_fields: object_at(event, &["context", "traits"]),
        phone_number: string_at(event, &["context", "traits", "phone"], "user.phoneNumber")?,
    };

    let total = lookup(event, &["properties", "total"])
        .ok_or_else(|| ActionError::MissingField("total".to_string()))
        .and_then(|v| json_number(v, "total"))?;

    let items = match lookup(event, &["properties", "products"]) {
        None => return Err(ActionError::MissingField("items".to_string())),
        Some(Value::Array(products)) => products
            .iter()
            .enumerate()
            .map(|(i, product)| commerce_item(i, product))
            .collect::<ActionResult<Vec<_>>>()?,
        Some(_) => {
            return Err(ActionError::invalid_field(
                "items",
                "properties.products must be a list",
            ))
        }
    };

    let payload = TrackPurchasePayload {
        id: string_at(event, &["properties", "order_id"], "id")?,
        user,
        data_fields: object_at(event, &["properties"]),
        items,
        total,
        created_at: date_at(event, &["timestamp"], "createdAt")?,
        campaign_id: optional(event, &["properties", "campaign_id"], "campaignId", integer)?,
        template_id: optional(event, &["properties", "template_id"], "templateId", integer)?,
    };

    debug!(
        order_id = ?payload.id,
        items = payload.items.len(),
        "resolved trackPurchase payload"
    );
    Ok(payload)
}
