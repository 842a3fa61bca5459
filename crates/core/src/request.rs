//! The request capability handed to every action.
//!
//! Actions never build HTTP clients themselves: they describe one request
//! (URL, method, JSON body) and hand it to a [`RequestClient`]. Retries,
//! authentication and timeouts belong to the client implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::HttpConfig;
use crate::error::{ActionError, ActionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Options for a single outbound request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    pub method: HttpMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: HttpMethod::Get,
            json: None,
            headers: Vec::new(),
        }
    }

    pub fn post(json: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            json: Some(json),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Response returned by a [`RequestClient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body into a typed response shape.
    pub fn json<T: DeserializeOwned>(&self) -> ActionResult<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

#[async_trait]
pub trait RequestClient: Send + Sync {
    /// Issue one request. Implementations report non-2xx statuses as
    /// [`ActionError::Http`] and network failures as [`ActionError::Transport`].
    async fn request(&self, url: &str, options: RequestOptions) -> ActionResult<Response>;
}

/// [`RequestClient`] backed by a shared `reqwest` client.
pub struct HttpRequestClient {
    client: reqwest::Client,
    default_headers: Vec<(String, String)>,
}

impl HttpRequestClient {
    pub fn new(config: &HttpConfig) -> ActionResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ActionError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            default_headers: Vec::new(),
        })
    }

    /// Headers sent with every request, before the per-request headers.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    fn method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl RequestClient for HttpRequestClient {
    async fn request(&self, url: &str, options: RequestOptions) -> ActionResult<Response> {
        let mut builder = self.client.request(Self::method(options.method), url);
        for (name, value) in self.default_headers.iter().chain(options.headers.iter()) {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(json) = &options.json {
            builder = builder.json(json);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ActionError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ActionError::Transport(e.to_string()))?;

        debug!(method = options.method.as_str(), url, status, "request completed");

        let parsed = Response {
            status,
            body: parse_body(&text),
        };
        if !parsed.is_success() {
            return Err(ActionError::Http { status, body: text });
        }
        Ok(parsed)
    }
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_options() {
        let options = RequestOptions::post(json!({"total": 10})).with_header("Api-Key", "k");
        assert_eq!(options.method, HttpMethod::Post);
        assert_eq!(options.json, Some(json!({"total": 10})));
        assert_eq!(options.headers, vec![("Api-Key".to_string(), "k".to_string())]);

        let serialized = serde_json::to_value(&options).unwrap();
        assert_eq!(serialized["method"], "post");
    }

    #[test]
    fn test_response_decoding() {
        let response = Response {
            status: 200,
            body: json!({"acl": ["search"]}),
        };
        assert!(response.is_success());

        #[derive(Deserialize)]
        struct Acl {
            acl: Vec<String>,
        }
        let acl: Acl = response.json().unwrap();
        assert_eq!(acl.acl, vec!["search"]);

        let failed = Response {
            status: 404,
            body: Value::Null,
        };
        assert!(!failed.is_success());
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("{\"code\":\"Success\"}"), json!({"code": "Success"}));
        assert_eq!(parse_body("ok"), Value::String("ok".to_string()));
    }

    #[test]
    fn test_http_client_builds_from_config() {
        let client = HttpRequestClient::new(&HttpConfig::default())
            .unwrap()
            .with_default_header("Api-Key", "secret");
        assert_eq!(client.default_headers.len(), 1);
    }
}
