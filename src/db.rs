use crate::config::AppConfig;
use crate::entities::sales_record;
use crate::errors::ServiceError;
use crate::middleware_helpers::retry::{with_retry, DbRetryPolicy, RetryConfig};
use crate::models::SalesRecord;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, EntityTrait, QuerySelect};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{debug, error, info};

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Configuration for database connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Idle timeout duration
    pub idle_timeout: Duration,
    /// Acquire connection timeout
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(8),
        }
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        let db = &cfg.database;
        Self {
            url: db.connection_url(),
            max_connections: db.max_connections,
            min_connections: db.min_connections,
            connect_timeout: Duration::from_secs(db.connect_timeout_secs),
            idle_timeout: Duration::from_secs(db.idle_timeout_secs),
            acquire_timeout: Duration::from_secs(db.acquire_timeout_secs),
        }
    }
}

/// Establishes a connection pool to the database with custom configuration
///
/// # Errors
/// Returns a `ServiceError` if the connection cannot be established
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, ServiceError> {
    let mut opt = ConnectOptions::new(config.url.clone());

    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(false);

    info!(
        max_connections = config.max_connections,
        "Connecting to database"
    );

    let db_pool = Database::connect(opt).await?;

    info!("Database connection pool established successfully");
    Ok(db_pool)
}

/// Establish DB pool using AppConfig tuning
pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    let db_cfg: DbConfig = cfg.into();
    establish_connection_with_config(&db_cfg).await
}

/// Connects, retrying connection-level failures per `retry`.
///
/// Used by the loader, which typically starts alongside the database
/// container and has to wait for it to accept connections.
pub async fn connect_with_retry(config: &DbConfig, retry: &RetryConfig) -> Result<DbPool, ServiceError> {
    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .sqlx_logging(false);

    with_retry(retry, DbRetryPolicy, || Database::connect(opt.clone()))
        .await
        .map_err(|e| {
            error!(
                attempts = retry.max_attempts,
                "Failed to connect to the database: {}", e
            );
            ServiceError::ServiceUnavailable("failed to connect to database".to_string())
        })
}

/// Runs database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    info!("Running database migrations");
    let start = std::time::Instant::now();

    let result = migrations::Migrator::up(pool, None)
        .await
        .map_err(ServiceError::DatabaseError);

    let elapsed = start.elapsed();
    match &result {
        Ok(_) => info!("Database migrations completed in {:?}", elapsed),
        Err(e) => error!("Database migrations failed after {:?}: {}", elapsed, e),
    }

    result
}

/// Checks if the database connection is active
pub async fn check_connection(pool: &DbPool) -> Result<Duration, ServiceError> {
    let start = std::time::Instant::now();
    match pool.ping().await {
        Ok(()) => {
            let elapsed = start.elapsed();
            debug!("Database connection check successful in {:?}", elapsed);
            Ok(elapsed)
        }
        Err(e) => {
            error!(
                "Database connection check failed after {:?}: {}",
                start.elapsed(),
                e
            );
            Err(ServiceError::DatabaseError(e))
        }
    }
}

// SQLite and Postgres wording for a missing table or column
const SCHEMA_ERROR_MARKERS: [&str; 4] = [
    "no such table",
    "no such column",
    "does not exist",
    "no column found",
];

/// True when the store answered but the sales table does not have the shape
/// the dashboard reads: a missing table or column, or a required value that
/// is null or of the wrong type.
///
/// Connection failures are never a schema mismatch.
pub fn is_schema_mismatch(err: &DbErr) -> bool {
    match err {
        DbErr::Query(_) | DbErr::Exec(_) => {
            let text = err.to_string().to_lowercase();
            SCHEMA_ERROR_MARKERS
                .iter()
                .any(|marker| text.contains(marker))
        }
        DbErr::Type(_) | DbErr::TryIntoErr { .. } => true,
        _ => false,
    }
}

/// The dashboard's single read query.
///
/// Selects only the five columns the pipeline consumes.
pub async fn fetch_sales_records(pool: &DbPool) -> Result<Vec<SalesRecord>, ServiceError> {
    use sales_record::Column;

    let start = std::time::Instant::now();
    let records = sales_record::Entity::find()
        .select_only()
        .columns([
            Column::Sales,
            Column::OrderDate,
            Column::OrderNumber,
            Column::ProductLine,
            Column::Country,
        ])
        .into_model::<SalesRecord>()
        .all(pool)
        .await
        .map_err(|e| {
            error!("Sales query failed: {}", e);
            ServiceError::DatabaseError(e)
        })?;

    debug!(
        rows = records.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Fetched sales records"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use sea_orm::{ConnAcquireErr, RuntimeErr};

    fn query_err(message: &str) -> DbErr {
        DbErr::Query(RuntimeErr::Internal(message.to_string()))
    }

    #[rstest]
    #[case(query_err("error returned from database: no such column: country"), true)]
    #[case(query_err("error returned from database: no such table: sales_data"), true)]
    #[case(query_err(r#"relation "sales_data" does not exist"#), true)]
    #[case(DbErr::Type("A null value was encountered while decoding sales".into()), true)]
    #[case(query_err("database is locked"), false)]
    #[case(DbErr::Conn(RuntimeErr::Internal("connection refused".into())), false)]
    #[case(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout), false)]
    fn classifies_schema_mismatch(#[case] err: DbErr, #[case] expected: bool) {
        assert_eq!(is_schema_mismatch(&err), expected);
    }
}
