use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub stripe: StripeConfig,
    pub mail: MailConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    #[serde(default = "default_webhook_tolerance")]
    pub webhook_tolerance_seconds: i64,
    pub success_url: String,
    pub cancel_url: String,
    #[serde(default = "default_upstream_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
    pub operator_address: String,
    #[serde(default = "default_upstream_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
    /// Static bearer token accepted on admin endpoints.
    pub token: String,
    /// Secret signing the admin session cookie.
    pub jwt_secret: String,
    #[serde(default = "default_session_days")]
    pub session_days: i64,
}

fn default_webhook_tolerance() -> i64 {
    300
}

fn default_upstream_timeout() -> u64 {
    15
}

fn default_session_days() -> i64 {
    7
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of ELITELINE)
            // Eg.. `ELITELINE__SERVER__PORT=8080` would set the server port
            .add_source(config::Environment::with_prefix("ELITELINE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
