use std::path::Path;

use serde::Deserialize;

/// Root configuration. Loaded from environment variables with the prefix
/// `DESTINATIONS__` and optional TOML config files.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub algolia: AlgoliaConfig,
    #[serde(default)]
    pub iterable: IterableConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlgoliaConfig {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IterableConfig {
    #[serde(default)]
    pub api_key: String,
}

fn default_timeout_ms() -> u64 {
    10_000
}
fn default_user_agent() -> String {
    concat!("destination-actions/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            algolia: AlgoliaConfig::default(),
            iterable: IterableConfig::default(),
        }
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("DESTINATIONS")
        .separator("__")
        .try_parsing(true)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(environment())
            .build()?;
        config.try_deserialize()
    }

    /// Load a TOML file, then let environment variables override it.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .add_source(environment())
            .build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.http.timeout_ms, 10_000);
        assert!(config.http.user_agent.starts_with("destination-actions/"));
        assert!(config.algolia.app_id.is_empty());
        assert!(config.iterable.api_key.is_empty());
    }

    #[test]
    fn test_partial_source_fills_defaults() {
        let config: AppConfig = config::Config::builder()
            .set_override("algolia.app_id", "APP1")
            .unwrap()
            .set_override("http.timeout_ms", 2500)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.algolia.app_id, "APP1");
        assert_eq!(config.algolia.api_key, "");
        assert_eq!(config.http.timeout_ms, 2500);
        assert!(config.http.user_agent.starts_with("destination-actions/"));
    }
}
