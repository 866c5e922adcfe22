use std::path::Path;
use std::time::Duration;

use ::config::{Config, ConfigError, Environment, File, FileFormat, FileSourceFile};
use secrecy::Secret;
use serde::Deserialize;
use warden_application::RetryPolicy;
use warden_core::{LockoutPolicy, LOCKOUT_DURATION_MINUTES, MAX_LOGIN_ATTEMPTS};

use super::constants::{self, env};
use crate::{
    hashing::argon2_password_hasher::Argon2Cost,
    oauth::OAuthSettings,
    tokens::jwt_token_issuer::{ACCESS_TOKEN_TTL_SECONDS, JwtConfig, REFRESH_TOKEN_TTL_SECONDS},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub storage: StorageBackend,
    #[serde(default)]
    pub server: ServerSettings,
    pub postgres: Option<PostgresSettings>,
    pub redis: Option<RedisSettings>,
    pub auth: AuthSettings,
    #[serde(default)]
    pub oauth: OAuthSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: default_address(),
            request_timeout_seconds: default_request_timeout_seconds(),
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn default_address() -> String {
    constants::prod::APP_ADDRESS.to_owned()
}

fn default_request_timeout_seconds() -> u64 {
    constants::prod::REQUEST_TIMEOUT_SECONDS
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresSettings {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    pub host_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt: JwtSettings,
    #[serde(default)]
    pub lockout: LockoutSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub password_hashing: Argon2Cost,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    pub secret: Secret<String>,
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl_seconds: i64,
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl_seconds: i64,
    #[serde(default)]
    pub issuer: Option<String>,
}

fn default_access_token_ttl() -> i64 {
    ACCESS_TOKEN_TTL_SECONDS
}

fn default_refresh_token_ttl() -> i64 {
    REFRESH_TOKEN_TTL_SECONDS
}

impl JwtSettings {
    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.secret.clone(),
            access_token_ttl: chrono::Duration::seconds(self.access_token_ttl_seconds),
            refresh_token_ttl: chrono::Duration::seconds(self.refresh_token_ttl_seconds),
            issuer: self.issuer.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LockoutSettings {
    pub max_attempts: u32,
    pub duration_minutes: i64,
}

impl Default for LockoutSettings {
    fn default() -> Self {
        Self {
            max_attempts: MAX_LOGIN_ATTEMPTS,
            duration_minutes: LOCKOUT_DURATION_MINUTES,
        }
    }
}

impl LockoutSettings {
    pub fn policy(&self) -> LockoutPolicy {
        LockoutPolicy {
            max_attempts: self.max_attempts,
            duration: chrono::Duration::minutes(self.duration_minutes),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_millis: u64,
    pub max_delay_millis: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_millis: policy.base_delay.as_millis() as u64,
            max_delay_millis: policy.max_delay.as_millis() as u64,
        }
    }
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_millis),
            Duration::from_millis(self.max_delay_millis),
        )
    }
}

impl Settings {
    /// Loads `.env`, then `config/base.json`, then `config/{APP_ENVIRONMENT}.json`,
    /// then `WARDEN__*` environment variables, later sources winning.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is normal outside local development.
        let _ = dotenvy::dotenv();

        let config_dir = std::env::var(env::CONFIG_DIR_ENV_VAR)
            .unwrap_or_else(|_| constants::DEFAULT_CONFIG_DIR.to_owned());
        let environment = std::env::var(env::APP_ENVIRONMENT_ENV_VAR).ok();

        Self::from_sources(
            Path::new(&config_dir),
            environment.as_deref(),
            environment_source(),
        )
    }

    pub fn from_sources(
        config_dir: &Path,
        environment: Option<&str>,
        env_source: Environment,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(json_file(
            config_dir,
            constants::BASE_CONFIG_FILE,
        ));
        if let Some(environment) = environment {
            builder = builder.add_source(json_file(config_dir, environment));
        }

        builder
            .add_source(env_source)
            .build()?
            .try_deserialize::<Settings>()
    }
}

fn json_file(config_dir: &Path, name: &str) -> File<FileSourceFile, FileFormat> {
    File::from(config_dir.join(format!("{name}.json")))
        .format(FileFormat::Json)
        .required(false)
}

pub fn environment_source() -> Environment {
    Environment::with_prefix(env::ENV_PREFIX)
        .prefix_separator(env::ENV_SEPARATOR)
        .separator(env::ENV_SEPARATOR)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("server.allowed_origins")
}
