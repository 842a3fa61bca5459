pub mod action;
pub mod config;
pub mod error;
pub mod request;

pub use action::{ActionDefinition, FieldDefault, FieldDefinition, FieldType};
pub use config::AppConfig;
pub use error::{ActionError, ActionResult};
pub use request::{HttpMethod, HttpRequestClient, RequestClient, RequestOptions, Response};
