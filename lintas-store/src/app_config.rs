use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// How long an unconfirmed hold keeps its seats.
    pub hold_ttl_seconds: u64,
    /// Period of the background expiry sweep.
    pub reaper_interval_seconds: u64,
    /// Flat fare per seat; total price is base_fare_amount * seat count.
    pub base_fare_amount: i32,
    pub fare_currency: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Then the environment-specific file, if present
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Then a local file that shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Finally environment overrides, e.g. LINTAS__SERVER__PORT=9090
            .add_source(config::Environment::with_prefix("LINTAS").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
