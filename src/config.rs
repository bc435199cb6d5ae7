use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const CONFIG_DIR: &str = "config";
const DEFAULT_CSV_PATH: &str = "sales_data_sample.csv";

/// Database connection settings.
///
/// When `url` is unset the connection string is composed from the
/// individual parts, which default to the `POSTGRES_*` variables used by the
/// container setup.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the individual parts
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_db_user")]
    pub user: String,

    #[serde(default = "default_db_password")]
    pub password: String,

    #[serde(default = "default_db_host")]
    pub host: String,

    #[serde(default = "default_db_port")]
    pub port: u16,

    #[serde(default = "default_db_name")]
    pub name: String,

    /// Pool: max connections
    #[serde(default = "default_db_max_connections")]
    #[validate(range(min = 1))]
    pub max_connections: u32,

    /// Pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub min_connections: u32,

    /// Timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,

    /// Whether to run migrations when the server starts
    #[serde(default = "default_true_bool")]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            user: default_db_user(),
            password: default_db_password(),
            host: default_db_host(),
            port: default_db_port(),
            name: default_db_name(),
            max_connections: default_db_max_connections(),
            min_connections: default_db_min_connections(),
            connect_timeout_secs: default_db_connect_timeout_secs(),
            idle_timeout_secs: default_db_idle_timeout_secs(),
            acquire_timeout_secs: default_db_acquire_timeout_secs(),
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Resolves the connection URL
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) if !url.trim().is_empty() => url.clone(),
            _ => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.user, self.password, self.host, self.port, self.name
            ),
        }
    }
}

/// Dashboard computation settings
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    /// Share of revenue reported as estimated profit. A business assumption,
    /// not derived from cost data.
    #[serde(default = "default_profit_margin")]
    #[validate(custom = "validate_profit_margin")]
    pub profit_margin: Decimal,

    /// Symbol prefixed to formatted currency values
    #[serde(default = "default_currency_symbol")]
    #[validate(length(min = 1, max = 4))]
    pub currency_symbol: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            profit_margin: default_profit_margin(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

/// CSV loader settings
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoaderConfig {
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// Rows per INSERT statement
    #[serde(default = "default_batch_size")]
    #[validate(range(min = 1, max = 10000))]
    pub batch_size: usize,

    /// Connection attempts before giving up
    #[serde(default = "default_max_retries")]
    #[validate(range(min = 1))]
    pub max_retries: u32,

    /// Fixed delay between connection attempts (seconds)
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    #[serde(default)]
    #[validate]
    pub database: DatabaseConfig,

    #[serde(default)]
    #[validate]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    #[validate]
    pub loader: LoaderConfig,
}

impl AppConfig {
    /// Creates a configuration with built-in defaults pointing at `database_url`
    pub fn new(database_url: String, host: String, port: u16, environment: String) -> Self {
        Self {
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            database: DatabaseConfig {
                url: Some(database_url),
                ..Default::default()
            },
            dashboard: DashboardConfig::default(),
            loader: LoaderConfig::default(),
        }
    }

    /// Gets database URL
    pub fn database_url(&self) -> String {
        self.database.connection_url()
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_db_user() -> String {
    "postgres".to_string()
}
fn default_db_password() -> String {
    "postgres".to_string()
}
fn default_db_host() -> String {
    "db".to_string()
}
fn default_db_port() -> u16 {
    5432
}
fn default_db_name() -> String {
    "sales_db".to_string()
}

fn default_db_max_connections() -> u32 {
    16
}
fn default_db_min_connections() -> u32 {
    2
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}

fn default_true_bool() -> bool {
    true
}

fn default_profit_margin() -> Decimal {
    dec!(0.30)
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_csv_path() -> PathBuf {
    PathBuf::from(DEFAULT_CSV_PATH)
}

fn default_batch_size() -> usize {
    500
}

fn default_max_retries() -> u32 {
    10
}

fn default_retry_delay_secs() -> u64 {
    5
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_profit_margin(margin: &Decimal) -> Result<(), ValidationError> {
    if margin.is_sign_negative() || *margin > Decimal::ONE {
        let mut err = ValidationError::new("profit_margin");
        err.message = Some("profit_margin must be between 0.0 and 1.0".into());
        return Err(err);
    }
    Ok(())
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("sales_dashboard={},tower_http=info", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults, with the database parts seeded from `POSTGRES_*`
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    load_config_from(Path::new(CONFIG_DIR), &run_env)
}

pub(crate) fn load_config_from(config_dir: &Path, run_env: &str) -> Result<AppConfig, AppConfigError> {
    let legacy = |name: &str, fallback: &str| env::var(name).unwrap_or_else(|_| fallback.to_string());

    let config = Config::builder()
        .set_default("environment", run_env)?
        .set_default("database.user", legacy("POSTGRES_USER", "postgres"))?
        .set_default("database.password", legacy("POSTGRES_PASSWORD", "postgres"))?
        .set_default("database.host", legacy("POSTGRES_HOST", "db"))?
        .set_default("database.port", legacy("POSTGRES_PORT", "5432"))?
        .set_default("database.name", legacy("POSTGRES_DB", "sales_db"))?
        .add_source(
            File::with_name(&config_dir.join("default").to_string_lossy()).required(false),
        )
        .add_source(File::with_name(&config_dir.join(run_env).to_string_lossy()).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(format!("{}.toml", name)), content).unwrap();
    }

    #[test]
    fn defaults_fill_every_section() {
        let dir = TempDir::new().unwrap();
        let cfg = load_config_from(dir.path(), "test").unwrap();

        assert_eq!(cfg.environment, "test");
        assert_eq!(cfg.dashboard.profit_margin, dec!(0.30));
        assert_eq!(cfg.dashboard.currency_symbol, "$");
        assert_eq!(cfg.loader.max_retries, 10);
        assert_eq!(cfg.loader.retry_delay_secs, 5);
        assert_eq!(cfg.loader.csv_path, PathBuf::from("sales_data_sample.csv"));
    }

    #[test]
    fn environment_file_overrides_default_file() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            "default",
            r#"
            port = 7000
            [dashboard]
            profit_margin = 0.25
            "#,
        );
        write_config(&dir, "staging", "port = 7100\n");

        let cfg = load_config_from(dir.path(), "staging").unwrap();
        assert_eq!(cfg.port, 7100);
        assert_eq!(cfg.dashboard.profit_margin, dec!(0.25));
    }

    #[test]
    fn margin_above_one_is_rejected() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "default", "[dashboard]\nprofit_margin = 1.5\n");

        let result = load_config_from(dir.path(), "test");
        assert!(matches!(result, Err(AppConfigError::Validation(_))));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            5000,
            "test".into(),
        );
        cfg.log_level = "loud".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn connection_url_prefers_explicit_url() {
        let mut db = DatabaseConfig::default();
        assert_eq!(
            db.connection_url(),
            "postgres://postgres:postgres@db:5432/sales_db"
        );

        db.url = Some("sqlite::memory:".into());
        assert_eq!(db.connection_url(), "sqlite::memory:");

        db.url = Some("   ".into());
        assert!(db.connection_url().starts_with("postgres://"));
    }
}
