//! Algolia Insights wire vocabulary: event shapes and endpoint URLs.

use actions_core::{ActionError, ActionResult};
use serde::{Deserialize, Serialize};

pub const BASE_INSIGHTS_URL: &str = "https://insights.algolia.io";

/// Endpoint that receives behaviour (view / click / conversion) events.
pub fn behaviour_endpoint() -> String {
    format!("{BASE_INSIGHTS_URL}/1/events")
}

/// Key lookup URL for the configured application. The id and key are
/// interpolated as-is.
pub fn permissions_url(settings: &AlgoliaSettings) -> String {
    format!(
        "https://{}.algolia.net/1/keys/{}",
        settings.app_id, settings.api_key
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgoliaSettings {
    pub app_id: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgoliaEventType {
    View,
    Click,
    Conversion,
}

/// Fields shared by every Insights event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCommon {
    pub event_name: String,
    pub index: String,
    pub user_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(rename = "queryID", skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
    pub event_type: AlgoliaEventType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgoliaProductViewedEvent {
    #[serde(flatten)]
    pub common: EventCommon,
    #[serde(rename = "objectIDs")]
    pub object_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgoliaProductClickedEvent {
    #[serde(flatten)]
    pub common: EventCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<u32>>,
    #[serde(rename = "objectIDs")]
    pub object_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgoliaFilterClickedEvent {
    #[serde(flatten)]
    pub common: EventCommon,
    pub filters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgoliaConversionEvent {
    #[serde(flatten)]
    pub common: EventCommon,
    #[serde(rename = "objectIDs")]
    pub object_ids: Vec<String>,
}

/// One Insights event. Serialises flat, exactly as the API expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AlgoliaEvent {
    ProductViewed(AlgoliaProductViewedEvent),
    ProductClicked(AlgoliaProductClickedEvent),
    FilterClicked(AlgoliaFilterClickedEvent),
    Conversion(AlgoliaConversionEvent),
}

impl AlgoliaEvent {
    pub fn common(&self) -> &EventCommon {
        match self {
            AlgoliaEvent::ProductViewed(e) => &e.common,
            AlgoliaEvent::ProductClicked(e) => &e.common,
            AlgoliaEvent::FilterClicked(e) => &e.common,
            AlgoliaEvent::Conversion(e) => &e.common,
        }
    }

    pub fn event_type(&self) -> AlgoliaEventType {
        self.common().event_type
    }

    /// The event type each shape must carry.
    fn expected_type(&self) -> AlgoliaEventType {
        match self {
            AlgoliaEvent::ProductViewed(_) => AlgoliaEventType::View,
            AlgoliaEvent::ProductClicked(_) | AlgoliaEvent::FilterClicked(_) => {
                AlgoliaEventType::Click
            }
            AlgoliaEvent::Conversion(_) => AlgoliaEventType::Conversion,
        }
    }

    /// Check the shape invariants before the event is sent.
    pub fn validate(&self) -> ActionResult<()> {
        if self.event_type() != self.expected_type() {
            return Err(ActionError::PayloadValidation(format!(
                "eventType {:?} does not match the event shape",
                self.event_type()
            )));
        }
        match self {
            AlgoliaEvent::ProductViewed(AlgoliaProductViewedEvent { object_ids, .. })
            | AlgoliaEvent::Conversion(AlgoliaConversionEvent { object_ids, .. }) => {
                require_non_empty("objectIDs", object_ids)
            }
            AlgoliaEvent::ProductClicked(event) => {
                require_non_empty("objectIDs", &event.object_ids)?;
                match &event.positions {
                    Some(positions) if positions.len() != event.object_ids.len() => {
                        Err(ActionError::PayloadValidation(
                            "positions must have the same length as objectIDs".to_string(),
                        ))
                    }
                    _ => Ok(()),
                }
            }
            AlgoliaEvent::FilterClicked(event) => require_non_empty("filters", &event.filters),
        }
    }
}

fn require_non_empty(name: &str, values: &[String]) -> ActionResult<()> {
    if values.is_empty() {
        return Err(ActionError::PayloadValidation(format!(
            "{name} must not be empty"
        )));
    }
    Ok(())
}

/// Response shape of the key lookup endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgoliaApiPermissions {
    pub acl: Vec<String>,
}

impl AlgoliaApiPermissions {
    /// The Insights API accepts events from keys carrying the `search` ACL.
    pub fn can_send_events(&self) -> bool {
        self.acl.iter().any(|acl| acl == "search")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn common(event_type: AlgoliaEventType) -> EventCommon {
        EventCommon {
            event_name: "Product Clicked".to_string(),
            index: "products".to_string(),
            user_token: "user-1".to_string(),
            timestamp: None,
            query_id: Some("q-1".to_string()),
            event_type,
        }
    }

    #[test]
    fn test_behaviour_endpoint() {
        assert_eq!(behaviour_endpoint(), "https://insights.algolia.io/1/events");
    }

    #[test]
    fn test_permissions_url() {
        let settings = AlgoliaSettings {
            app_id: "APP1".to_string(),
            api_key: "KEY1".to_string(),
        };
        assert_eq!(
            permissions_url(&settings),
            "https://APP1.algolia.net/1/keys/KEY1"
        );
    }

    #[test]
    fn test_settings_wire_names() {
        let settings: AlgoliaSettings =
            serde_json::from_value(json!({"appId": "A", "apiKey": "K"})).unwrap();
        assert_eq!(settings.app_id, "A");
        assert_eq!(settings.api_key, "K");
    }

    #[test]
    fn test_clicked_event_serializes_flat() {
        let event = AlgoliaEvent::ProductClicked(AlgoliaProductClickedEvent {
            common: common(AlgoliaEventType::Click),
            positions: Some(vec![3]),
            object_ids: vec!["sku-9".to_string()],
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "eventName": "Product Clicked",
                "index": "products",
                "userToken": "user-1",
                "queryID": "q-1",
                "eventType": "click",
                "positions": [3],
                "objectIDs": ["sku-9"],
            })
        );
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_validation_rules() {
        let mismatched_positions = AlgoliaEvent::ProductClicked(AlgoliaProductClickedEvent {
            common: common(AlgoliaEventType::Click),
            positions: Some(vec![1, 2]),
            object_ids: vec!["a".to_string()],
        });
        assert!(mismatched_positions.validate().is_err());

        let empty_filters = AlgoliaEvent::FilterClicked(AlgoliaFilterClickedEvent {
            common: common(AlgoliaEventType::Click),
            filters: vec![],
        });
        assert!(empty_filters.validate().is_err());

        let wrong_tag = AlgoliaEvent::ProductViewed(AlgoliaProductViewedEvent {
            common: common(AlgoliaEventType::Conversion),
            object_ids: vec!["a".to_string()],
        });
        let err = wrong_tag.validate().unwrap_err();
        assert!(err.is_validation());

        let conversion = AlgoliaEvent::Conversion(AlgoliaConversionEvent {
            common: common(AlgoliaEventType::Conversion),
            object_ids: vec!["a".to_string()],
        });
        assert!(conversion.validate().is_ok());
        assert_eq!(conversion.event_type(), AlgoliaEventType::Conversion);
    }

    #[test]
    fn test_permissions() {
        let permissions: AlgoliaApiPermissions =
            serde_json::from_value(json!({"acl": ["search", "browse"]})).unwrap();
        assert!(permissions.can_send_events());

        let write_only = AlgoliaApiPermissions {
            acl: vec!["addObject".to_string()],
        };
        assert!(!write_only.can_send_events());
    }
}
