use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub redis: RedisConfig,
    pub search: SearchConfig,
    pub amadeus: AmadeusSettings,
    pub travelpayouts: TravelpayoutsSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Cache entry lifetime in seconds.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

fn default_ttl_seconds() -> u64 {
    1800
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AmadeusSettings {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub flights_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TravelpayoutsSettings {
    pub token: String,
    pub partner_id: String,
    pub base_url: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Environment-specific file, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `SKYFARE__REDIS__URL=...` overrides redis.url
            .add_source(config::Environment::with_prefix("SKYFARE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
