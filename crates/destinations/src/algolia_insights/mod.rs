//! Algolia Insights destination.

pub mod api;

use actions_core::{ActionResult, RequestClient, RequestOptions, Response};
use serde_json::json;
use tracing::{debug, info};

pub use api::{
    behaviour_endpoint, permissions_url, AlgoliaApiPermissions, AlgoliaConversionEvent,
    AlgoliaEvent, AlgoliaEventType, AlgoliaFilterClickedEvent, AlgoliaProductClickedEvent,
    AlgoliaProductViewedEvent, AlgoliaSettings, EventCommon, BASE_INSIGHTS_URL,
};

/// Authentication headers for every Insights request.
pub fn insights_headers(settings: &AlgoliaSettings) -> Vec<(String, String)> {
    vec![
        (
            "X-Algolia-Application-Id".to_string(),
            settings.app_id.clone(),
        ),
        ("X-Algolia-API-Key".to_string(), settings.api_key.clone()),
    ]
}

fn with_auth(options: RequestOptions, settings: &AlgoliaSettings) -> RequestOptions {
    insights_headers(settings)
        .into_iter()
        .fold(options, |options, (name, value)| options.with_header(name, value))
}

/// Send events to the behaviour endpoint in one POST. Every event is checked
/// first; an invalid event means nothing is sent.
pub async fn send_events<C>(
    client: &C,
    settings: &AlgoliaSettings,
    events: &[AlgoliaEvent],
) -> ActionResult<Response>
where
    C: RequestClient + ?Sized,
{
    for event in events {
        event.validate()?;
    }

    let body = json!({ "events": serde_json::to_value(events)? });
    debug!(count = events.len(), "sending Algolia Insights events");

    let response = client
        .request(
            &behaviour_endpoint(),
            with_auth(RequestOptions::post(body), settings),
        )
        .await?;
    metrics::counter!("algolia.insights.events_sent").increment(events.len() as u64);
    Ok(response)
}

/// Look up the ACL of the configured API key.
pub async fn fetch_permissions<C>(
    client: &C,
    settings: &AlgoliaSettings,
) -> ActionResult<AlgoliaApiPermissions>
where
    C: RequestClient + ?Sized,
{
    let response = client
        .request(
            &permissions_url(settings),
            with_auth(RequestOptions::get(), settings),
        )
        .await?;
    let permissions: AlgoliaApiPermissions = response.json()?;
    info!(acl = ?permissions.acl, app_id = %settings.app_id, "fetched Algolia key permissions");
    Ok(permissions)
}
