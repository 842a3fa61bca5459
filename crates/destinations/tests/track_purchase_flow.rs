//! End-to-end flow: raw "Order Completed" event -> resolved payload ->
//! trackPurchase request recorded by an in-memory client.

use actions_core::{ActionError, HttpMethod};
use destination_actions::iterable::{TrackPurchasePayload, TRACK_PURCHASE_URL};
use destination_actions::mapping::track_purchase_payload;
use destination_actions::testing::RecordingClient;
use destination_actions::track_purchase;
use serde_json::{json, Value};

fn order_completed_event() -> Value {
    json!({
        "type": "track",
        "event": "Order Completed",
        "userId": "user-1234",
        "timestamp": "2024-03-05T10:30:00.000Z",
        "context": {
            "traits": {
                "email": "test@example.com",
                "phone": "+14155550100",
                "createdAt": "2023-11-14T22:13:20Z",
                "address": {"city": "Oakland", "movedIn": "2022-06-01"},
            },
        },
        "properties": {
            "order_id": "order-50314",
            "total": 27.5,
            "coupon": "hasbros",
            "deliveredAt": "2024-03-07T08:00:00Z",
            "products": [
                {"product_id": "507f1f77", "sku": "45790-32", "price": 19, "quantity": 1,
                 "category": "Games, Family"},
                {"product_id": "505bd767", "price": 8.5, "quantity": 1},
            ],
        },
    })
}

#[tokio::test]
async fn test_order_completed_end_to_end() {
    let client = RecordingClient::new();
    let payload = track_purchase_payload(&order_completed_event()).unwrap();
    track_purchase::perform(&client, &payload).await.unwrap();

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    let (url, options) = &calls[0];
    assert_eq!(url, TRACK_PURCHASE_URL);
    assert_eq!(options.method, HttpMethod::Post);

    let body = options.json.as_ref().unwrap();
    assert_eq!(body["id"], "order-50314");
    assert_eq!(body["total"], 27.5);
    assert_eq!(body["createdAt"], 1_709_634_600_i64);

    assert_eq!(body["user"]["email"], "test@example.com");
    assert_eq!(body["user"]["userId"], "user-1234");
    assert_eq!(body["user"]["mergeNestedObjects"], false);
    assert!(body["user"].get("phoneNumber").is_none());
    assert_eq!(body["user"]["dataFields"]["phoneNumber"], "+14155550100");
    assert_eq!(body["user"]["dataFields"]["createdAt"], 1_700_000_000_000_i64);
    assert_eq!(
        body["user"]["dataFields"]["address"],
        json!({"city": "Oakland", "movedIn": 1_654_041_600_000_i64})
    );

    assert!(body["dataFields"].get("products").is_none());
    assert_eq!(body["dataFields"]["coupon"], "hasbros");
    assert_eq!(body["dataFields"]["deliveredAt"], 1_709_798_400_000_i64);

    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["items"][0]["id"], "507f1f77");
    assert_eq!(body["items"][0]["categories"], json!(["Games", "Family"]));
    assert_eq!(body["items"][1]["price"], 8.5);
}

#[tokio::test]
async fn test_minimal_purchase_with_epoch_created_at() {
    let client = RecordingClient::new();
    let payload: TrackPurchasePayload = serde_json::from_value(json!({
        "user": {"email": "a@b.com"},
        "total": 10,
        "items": [],
        "createdAt": 1_700_000_000_000_i64,
    }))
    .unwrap();

    track_purchase::perform(&client, &payload).await.unwrap();

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "https://api.iterable.com/api/commerce/trackPurchase");
    let body = calls[0].1.json.as_ref().unwrap();
    assert_eq!(body["total"], 10);
    assert_eq!(serde_json::to_string(&body["total"]).unwrap(), "10");
    assert_eq!(body["createdAt"], 1_700_000_000_i64);
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn test_anonymous_order_is_rejected_before_sending() {
    let mut event = order_completed_event();
    event.as_object_mut().unwrap().remove("userId");
    event["context"]["traits"]
        .as_object_mut()
        .unwrap()
        .remove("email");

    let client = RecordingClient::new();
    let payload = track_purchase_payload(&event).unwrap();
    let err = track_purchase::perform(&client, &payload).await.unwrap_err();

    assert!(matches!(err, ActionError::PayloadValidation(_)));
    assert_eq!(err.to_string(), "Must include email or userId.");
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_server_errors_reach_the_caller() {
    let client = RecordingClient::failing(500, "internal");
    let payload = track_purchase_payload(&order_completed_event()).unwrap();
    let err = track_purchase::perform(&client, &payload).await.unwrap_err();
    assert!(matches!(err, ActionError::Http { status: 500, .. }));
    assert!(!err.is_validation());
}
