use actions_core::{ActionError, ActionResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::shared_fields::{Categories, CommerceItem};

/// Epoch values above this are taken to be milliseconds.
const MILLIS_THRESHOLD: f64 = 1e11;

/// A date as it arrives in a payload: epoch number or date string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Epoch(f64),
    Text(String),
}

/// Parse the date string forms sources send. Naive timestamps and bare
/// dates are read as UTC.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    // Cheap reject before trying the parsers: every accepted form starts
    // with `YYYY-`.
    let bytes = text.as_bytes();
    if bytes.len() < 10 || !bytes[..4].iter().all(u8::is_ascii_digit) || bytes[4] != b'-' {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Copy of `object` with every date string, at any depth, replaced by its
/// epoch milliseconds.
pub fn convert_dates_in_object(object: &Map<String, Value>) -> Map<String, Value> {
    object
        .iter()
        .map(|(key, value)| (key.clone(), convert_dates_in_value(value)))
        .collect()
}

fn convert_dates_in_value(value: &Value) -> Value {
    match value {
        Value::String(text) => match parse_date(text) {
            Some(date) => Value::from(date.timestamp_millis()),
            None => value.clone(),
        },
        Value::Object(object) => Value::Object(convert_dates_in_object(object)),
        Value::Array(values) => Value::Array(values.iter().map(convert_dates_in_value).collect()),
        _ => value.clone(),
    }
}

/// Whole epoch seconds for `value`, or for `now` when absent. Fractions are
/// floored.
pub fn to_epoch_seconds(value: Option<&DateValue>, now: DateTime<Utc>) -> ActionResult<i64> {
    match value {
        None => Ok(now.timestamp()),
        Some(DateValue::Epoch(epoch)) => {
            if !epoch.is_finite() {
                return Err(ActionError::invalid_field("createdAt", "not a finite number"));
            }
            let seconds = if epoch.abs() > MILLIS_THRESHOLD {
                epoch / 1000.0
            } else {
                *epoch
            };
            Ok(seconds.floor() as i64)
        }
        Some(DateValue::Text(text)) => parse_date(text)
            .map(|date| date.timestamp())
            .ok_or_else(|| {
                ActionError::invalid_field("createdAt", format!("unparseable date {text:?}"))
            }),
    }
}

/// Normalise line items: categories become a trimmed list and dates inside
/// item data fields are converted. Everything else passes through.
pub fn transform_items(items: &[CommerceItem]) -> Vec<CommerceItem> {
    items
        .iter()
        .map(|item| CommerceItem {
            categories: item.categories.as_ref().map(normalize_categories),
            data_fields: item.data_fields.as_ref().map(convert_dates_in_object),
            ..item.clone()
        })
        .collect()
}

fn normalize_categories(categories: &Categories) -> Categories {
    let list: Vec<String> = match categories {
        Categories::One(joined) => joined.split(',').map(str::trim).map(String::from).collect(),
        Categories::Many(list) => list.iter().map(|c| c.trim().to_string()).collect(),
    };
    Categories::Many(list.into_iter().filter(|c| !c.is_empty()).collect())
}
