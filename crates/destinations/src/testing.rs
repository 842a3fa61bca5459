//! In-memory [`RequestClient`] for exercising actions without a network.

use actions_core::{ActionError, ActionResult, RequestClient, RequestOptions, Response};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

enum Outcome {
    Respond { status: u16, body: Value },
    Fail { status: u16, body: String },
}

/// Records every request it receives and answers with a canned outcome.
pub struct RecordingClient {
    outcome: Outcome,
    calls: Mutex<Vec<(String, RequestOptions)>>,
}

impl Default for RecordingClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingClient {
    /// Answers every request with `200` and an empty body.
    pub fn new() -> Self {
        Self::with_response(200, Value::Null)
    }

    pub fn with_response(status: u16, body: Value) -> Self {
        Self {
            outcome: Outcome::Respond { status, body },
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every request with [`ActionError::Http`].
    pub fn failing(status: u16, body: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Fail {
                status,
                body: body.into(),
            },
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, RequestOptions)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl RequestClient for RecordingClient {
    async fn request(&self, url: &str, options: RequestOptions) -> ActionResult<Response> {
        self.calls.lock().push((url.to_string(), options));
        match &self.outcome {
            Outcome::Respond { status, body } => Ok(Response {
                status: *status,
                body: body.clone(),
            }),
            Outcome::Fail { status, body } => Err(ActionError::Http {
                status: *status,
                body: body.clone(),
            }),
        }
    }
}
