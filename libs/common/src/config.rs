//! Process configuration
//!
//! The environment (optionally seeded from a `.env` file) is read exactly once
//! at startup into [`AppConfig`], which is then handed to every component by
//! reference.

use serde::Deserialize;
use thiserror::Error;

use crate::database::DatabaseConfig;

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The environment could not be read or deserialized
    #[error("Failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    /// A required setting is absent
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    /// A setting is present but unusable
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Flat view of the environment, one field per variable
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub database_min_connections: u32,
    #[serde(default = "default_connection_timeout")]
    pub database_connection_timeout: u64,
    #[serde(default = "default_true")]
    pub database_run_migrations: bool,

    #[serde(default = "default_host")]
    pub server_host: String,
    #[serde(default = "default_port")]
    pub server_port: u16,
    #[serde(default = "default_mode")]
    pub server_mode: String,

    pub jwt_secret: Option<String>,
    #[serde(default = "default_jwt_expiry_hours")]
    pub jwt_expiry_hours: u64,

    pub sentry_dsn: Option<String>,

    pub s3_endpoint: Option<String>,
    #[serde(default = "default_region")]
    pub s3_region: String,
    #[serde(default)]
    pub s3_access_key: String,
    #[serde(default)]
    pub s3_secret_key: String,
    #[serde(default)]
    pub s3_bucket: String,
    #[serde(default = "default_folder")]
    pub s3_folder: String,
    #[serde(default = "default_presign_seconds")]
    pub s3_presign_seconds: u64,

    #[serde(default = "default_forecast_url")]
    pub forecast_api_url: String,
    pub forecast_api_key: Option<String>,
    #[serde(default = "default_forecast_schedule")]
    pub forecast_schedule: String,
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,
    #[serde(default = "default_true")]
    pub forecast_enabled: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_mode() -> String {
    "debug".to_string()
}

fn default_jwt_expiry_hours() -> u64 {
    24
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_folder() -> String {
    "uploads".to_string()
}

fn default_presign_seconds() -> u64 {
    900
}

fn default_forecast_url() -> String {
    "https://api.weatherapi.com/v1".to_string()
}

fn default_forecast_schedule() -> String {
    // every hour, on the hour
    "0 0 * * * *".to_string()
}

fn default_forecast_days() -> u8 {
    3
}

impl Settings {
    /// Read every variable from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}

/// Server run mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMode {
    Debug,
    Release,
}

impl ServerMode {
    /// Default tracing directive for the mode
    pub fn log_level(&self) -> &'static str {
        match self {
            ServerMode::Debug => "debug",
            ServerMode::Release => "info",
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub mode: ServerMode,
}

impl ServerConfig {
    /// Socket address to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HMAC secret used to sign and verify tokens
    pub secret: String,
    /// Token lifetime in hours
    pub expiry_hours: u64,
}

/// S3-compatible object storage settings
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Host of the storage service, without scheme (e.g. `nyc3.digitaloceanspaces.com`)
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// Key prefix every upload lands under
    pub folder: String,
    /// Lifetime of pre-signed URLs in seconds
    pub presign_seconds: u64,
}

impl StorageConfig {
    /// Whether enough settings are present to talk to a bucket
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some() && !self.bucket.is_empty()
    }
}

/// Forecast worker settings
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    /// Cron expression with a seconds field
    pub schedule: String,
    pub days: u8,
    pub enabled: bool,
}

/// Error telemetry settings
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    pub sentry_dsn: Option<String>,
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub forecast: ForecastConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load `.env` if present, then read the environment
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_settings(Settings::from_env()?)
    }

    /// Split the flat settings into typed sections
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let database_url = settings
            .database_url
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let secret = settings
            .jwt_secret
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let mode = match settings.server_mode.to_ascii_lowercase().as_str() {
            "debug" | "test" => ServerMode::Debug,
            "release" => ServerMode::Release,
            _ => {
                return Err(ConfigError::Invalid {
                    key: "SERVER_MODE",
                    value: settings.server_mode,
                });
            }
        };

        if settings.forecast_days == 0 {
            return Err(ConfigError::Invalid {
                key: "FORECAST_DAYS",
                value: settings.forecast_days.to_string(),
            });
        }

        Ok(AppConfig {
            database: DatabaseConfig {
                database_url,
                max_connections: settings.database_max_connections,
                min_connections: settings.database_min_connections,
                connection_timeout: settings.database_connection_timeout,
                run_migrations: settings.database_run_migrations,
            },
            server: ServerConfig {
                host: settings.server_host,
                port: settings.server_port,
                mode,
            },
            jwt: JwtConfig {
                secret,
                expiry_hours: settings.jwt_expiry_hours,
            },
            storage: StorageConfig {
                endpoint: settings.s3_endpoint.filter(|e| !e.is_empty()),
                region: settings.s3_region,
                access_key: settings.s3_access_key,
                secret_key: settings.s3_secret_key,
                bucket: settings.s3_bucket,
                folder: settings.s3_folder,
                presign_seconds: settings.s3_presign_seconds,
            },
            forecast: ForecastConfig {
                api_url: settings.forecast_api_url,
                api_key: settings.forecast_api_key.filter(|k| !k.is_empty()),
                schedule: settings.forecast_schedule,
                days: settings.forecast_days,
                enabled: settings.forecast_enabled,
            },
            telemetry: TelemetryConfig {
                sentry_dsn: settings.sentry_dsn.filter(|dsn| !dsn.is_empty()),
            },
        })
    }
}
