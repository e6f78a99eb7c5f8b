use farelink_shared::airline::AirlineCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub token_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// How long raw responses stay retrievable by session id.
    #[serde(default = "default_response_ttl")]
    pub response_ttl_seconds: i64,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_response_ttl() -> i64 {
    900
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RoutingConfig {
    /// Airline code -> routing header value, for carriers whose backend
    /// partition is not addressed by the bare code.
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

impl RoutingConfig {
    /// The routing header for one airline: a configured override, else the
    /// code itself.
    pub fn header_for(&self, airline: &AirlineCode) -> String {
        self.overrides
            .get(airline.as_str())
            .cloned()
            .unwrap_or_else(|| airline.to_string())
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Environment-specific file, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("FARELINK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
