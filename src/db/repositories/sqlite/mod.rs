//! SQLite repository implementation using Diesel.
//!
//! This module implements [`ClimateRepository`] against a local SQLite
//! database holding the pre-populated observation dataset.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures (pool checkout, lock contention)
//! - Embedded schema migrations
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `SQLITE_DATABASE_URL`: Path to the SQLite file (required)
//! - `SQLITE_POOL_MAX`: Maximum pool size (default: 10)
//! - `SQLITE_POOL_MIN`: Minimum pool size (default: 1)
//! - `SQLITE_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `SQLITE_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `SQLITE_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `SQLITE_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::connection::SimpleConnection;
use diesel::dsl::{avg, max, min};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::api::{PrecipitationReading, Station, TemperatureReading, TemperatureSummary};
use crate::db::repository::{
    ClimateRepository, ErrorContext, RepositoryError, RepositoryResult,
};

mod models;
mod schema;

use models::StationRow;

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/sqlite/migrations");

/// Configuration for opening the SQLite store.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Path to the SQLite database file
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl SqliteConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    /// Returns an error if neither `DATABASE_URL` nor `SQLITE_DATABASE_URL`
    /// is set.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("SQLITE_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or SQLITE_DATABASE_URL must be set".to_string())?;

        let max_pool_size = std::env::var("SQLITE_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("SQLITE_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("SQLITE_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_sec = std::env::var("SQLITE_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(600);

        let max_retries = std::env::var("SQLITE_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(3);

        let retry_delay_ms = std::env::var("SQLITE_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(100);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            idle_timeout_sec,
            max_retries,
            retry_delay_ms,
        })
    }

    /// Create a new configuration with a database path.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Sets per-connection pragmas when the pool opens a connection.
///
/// `busy_timeout` makes concurrent readers wait for a writer instead of
/// failing immediately with `database is locked`.
#[derive(Debug)]
struct ConnectionPragmas;

impl diesel::r2d2::CustomizeConnection<SqliteConnection, diesel::r2d2::Error>
    for ConnectionPragmas
{
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Diesel-backed repository for SQLite.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
    config: SqliteConfig,
}

impl SqliteRepository {
    /// Open the store and run pending migrations.
    ///
    /// # Returns
    /// * `Ok(SqliteRepository)` on success
    /// * `Err(RepositoryError)` if the pool or migrations fail
    pub fn new(config: SqliteConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<SqliteConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .connection_customizer(Box::new(ConnectionPragmas))
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("database_url={}", config.database_url)),
                )
            })?;

        // Run migrations once during initialization
        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self { pool, config })
    }

    /// Run pending database migrations.
    fn run_migrations(conn: &mut SqliteConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient
    /// failures.
    ///
    /// Diesel's SQLite driver is synchronous, so the operation runs on the
    /// blocking thread pool. Retryable errors (pool checkout failures, lock
    /// contention) are retried up to `max_retries` times with exponential
    /// backoff.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        tracing::debug!(error = %e, attempt, "retrying repository operation");
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

#[async_trait]
impl ClimateRepository for SqliteRepository {
    async fn latest_observation_date(&self) -> RepositoryResult<Option<NaiveDate>> {
        self.with_conn(|conn| {
            schema::observations::table
                .select(max(schema::observations::date))
                .first::<Option<NaiveDate>>(conn)
                .map_err(RepositoryError::from)
        })
        .await
    }

    async fn list_stations(&self) -> RepositoryResult<Vec<Station>> {
        let rows = self
            .with_conn(|conn| {
                schema::stations::table
                    .select(StationRow::as_select())
                    .load::<StationRow>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;

        Ok(rows.into_iter().map(Station::from).collect())
    }

    async fn precipitation_after(
        &self,
        cutoff: NaiveDate,
    ) -> RepositoryResult<Vec<PrecipitationReading>> {
        let rows = self
            .with_conn(move |conn| {
                schema::observations::table
                    .filter(schema::observations::date.gt(cutoff))
                    .order((
                        schema::observations::date.asc(),
                        schema::observations::station.asc(),
                    ))
                    .select((
                        schema::observations::station,
                        schema::observations::date,
                        schema::observations::prcp,
                    ))
                    .load::<(String, NaiveDate, Option<f64>)>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;

        Ok(rows
            .into_iter()
            .map(|(station, date, prcp)| PrecipitationReading {
                station,
                date,
                prcp,
            })
            .collect())
    }

    async fn temperature_after(
        &self,
        cutoff: NaiveDate,
    ) -> RepositoryResult<Vec<TemperatureReading>> {
        let rows = self
            .with_conn(move |conn| {
                schema::observations::table
                    .filter(schema::observations::date.gt(cutoff))
                    .order((
                        schema::observations::date.asc(),
                        schema::observations::station.asc(),
                    ))
                    .select((
                        schema::observations::station,
                        schema::observations::date,
                        schema::observations::tobs,
                    ))
                    .load::<(String, NaiveDate, f64)>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;

        Ok(rows
            .into_iter()
            .map(|(station, date, tobs)| TemperatureReading {
                station,
                date,
                tobs,
            })
            .collect())
    }

    async fn temperature_summary(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<TemperatureSummary> {
        // BETWEEN is inclusive on both bounds; an inverted or empty window
        // aggregates over zero rows and yields NULLs.
        let (min_t, avg_t, max_t) = self
            .with_conn(move |conn| {
                schema::observations::table
                    .filter(schema::observations::date.between(start, end))
                    .select((
                        min(schema::observations::tobs),
                        avg(schema::observations::tobs),
                        max(schema::observations::tobs),
                    ))
                    .first::<(Option<f64>, Option<f64>, Option<f64>)>(conn)
                    .map_err(RepositoryError::from)
            })
            .await?;

        Ok(TemperatureSummary {
            min: min_t,
            avg: avg_t,
            max: max_t,
        })
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            diesel::sql_query("SELECT 1")
                .execute(conn)
                .map_err(RepositoryError::from)
        })
        .await?;

        Ok(true)
    }
}
