use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://warehouse.db?mode=rwc";
const DEFAULT_ERP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_WAREHOUSE_LABEL: &str = "Maschinenbau-Zentrallager";
const CONFIG_DIR: &str = "config";

/// Application configuration.
///
/// Loaded from optional files under `config/` plus `APP_`-prefixed
/// environment variables (e.g. `APP_DATABASE_URL`, `APP_ERP_BASE_URL`).
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL
    #[serde(default = "default_database_url")]
    #[validate(length(min = 1))]
    pub database_url: String,

    /// Bind address for the HTTP server
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port for the HTTP server
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON instead of human-readable lines
    #[serde(default)]
    pub log_json: bool,

    /// Run schema migrations on startup
    #[serde(default = "default_true")]
    pub auto_migrate: bool,

    /// Maximum database pool size
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Minimum database pool size
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// Base URL of the external ERP endpoint; ERP exchange is disabled
    /// when unset
    #[serde(default)]
    pub erp_base_url: Option<String>,

    /// Bearer token for the ERP endpoint
    #[serde(default)]
    pub erp_api_key: Option<String>,

    /// Timeout for ERP network calls in seconds
    #[serde(default = "default_erp_timeout_secs")]
    pub erp_timeout_secs: u64,

    /// Warehouse label stamped onto exported inventory snapshots
    #[serde(default = "default_warehouse_label")]
    #[validate(length(min = 1))]
    pub warehouse_label: String,
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_true() -> bool {
    true
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_erp_timeout_secs() -> u64 {
    DEFAULT_ERP_TIMEOUT_SECS
}
fn default_warehouse_label() -> String {
    DEFAULT_WAREHOUSE_LABEL.to_string()
}

/// Loads the configuration from files and environment, then validates it.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

    let cfg: AppConfig = Config::builder()
        .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
        .add_source(File::with_name(&format!("{CONFIG_DIR}/{run_env}")).required(false))
        .add_source(Environment::with_prefix("APP"))
        .build()?
        .try_deserialize()?;

    cfg.validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {e}")))?;
    Ok(cfg)
}

/// Initializes the global tracing subscriber.
///
/// Falls back to the configured level when `RUST_LOG` is unset.
pub fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}
