//! Repository factory for dependency injection.
//!
//! This module provides utilities for creating and configuring repository
//! instances based on runtime configuration.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::repo_config::RepositoryConfig;
use super::repositories::LocalRepository;
#[cfg(feature = "sqlite-repo")]
use super::repositories::SqliteRepository;
use super::repository::{ClimateRepository, RepositoryError, RepositoryResult};
use super::SqliteConfig;

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// SQLite + Diesel implementation
    Sqlite,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "sql" => Ok(Self::Sqlite),
            "local" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment variables.
    ///
    /// Reads `REPOSITORY_TYPE`. Defaults to SQLite when a database URL is
    /// present, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var("DATABASE_URL").is_ok() || std::env::var("SQLITE_DATABASE_URL").is_ok() {
            Self::Sqlite
        } else {
            Self::Local
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```ignore
/// use climate_api::db::{RepositoryFactory, RepositoryType, SqliteConfig};
///
/// let config = SqliteConfig::with_url("hawaii.sqlite");
/// let repo = RepositoryFactory::create(RepositoryType::Sqlite, Some(&config))?;
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// # Arguments
    /// * `repo_type` - Type of repository to create
    /// * `sqlite_config` - Database configuration (required for SQLite)
    ///
    /// # Returns
    /// * `Ok(Arc<dyn ClimateRepository>)` - Boxed repository instance
    /// * `Err(RepositoryError)` - If creation fails
    pub fn create(
        repo_type: RepositoryType,
        sqlite_config: Option<&SqliteConfig>,
    ) -> RepositoryResult<Arc<dyn ClimateRepository>> {
        match repo_type {
            RepositoryType::Sqlite => {
                #[cfg(feature = "sqlite-repo")]
                {
                    let config = sqlite_config.ok_or_else(|| {
                        RepositoryError::configuration(
                            "SQLite repository requires SqliteConfig",
                        )
                    })?;
                    let repo = Self::create_sqlite(config)?;
                    Ok(repo as Arc<dyn ClimateRepository>)
                }
                #[cfg(not(feature = "sqlite-repo"))]
                {
                    let _ = sqlite_config;
                    Err(RepositoryError::configuration(
                        "SQLite repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create a repository from environment variables.
    ///
    /// `REPOSITORY_TYPE` selects the backend; a database URL in the
    /// environment implies SQLite.
    pub fn from_env() -> RepositoryResult<Arc<dyn ClimateRepository>> {
        match RepositoryType::from_env() {
            #[cfg(feature = "sqlite-repo")]
            RepositoryType::Sqlite => {
                let config = SqliteConfig::from_env().map_err(RepositoryError::configuration)?;
                Self::create(RepositoryType::Sqlite, Some(&config))
            }
            #[cfg(not(feature = "sqlite-repo"))]
            RepositoryType::Sqlite => Err(RepositoryError::configuration(
                "SQLite repository feature not enabled",
            )),
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create a repository from a TOML configuration file.
    pub fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn ClimateRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config)
    }

    /// Create a repository from a `repository.toml` in a standard location.
    pub fn from_default_config() -> RepositoryResult<Arc<dyn ClimateRepository>> {
        let config = RepositoryConfig::from_default_location()?;
        Self::from_repository_config(&config)
    }

    fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn ClimateRepository>> {
        let repo_type = config
            .repository_type()
            .map_err(|e| RepositoryError::configuration(format!("Invalid repository type: {}", e)))?;

        match repo_type {
            RepositoryType::Sqlite => {
                let sqlite_config = config.to_sqlite_config()?.ok_or_else(|| {
                    RepositoryError::configuration(
                        "SQLite repository requires a [sqlite] section with a database_url",
                    )
                })?;
                Self::create(RepositoryType::Sqlite, Some(&sqlite_config))
            }
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    /// Create a SQLite repository.
    #[cfg(feature = "sqlite-repo")]
    pub fn create_sqlite(config: &SqliteConfig) -> RepositoryResult<Arc<SqliteRepository>> {
        let repo = SqliteRepository::new(config.clone())?;
        Ok(Arc::new(repo))
    }

    /// Create a local in-memory repository.
    pub fn create_local() -> Arc<dyn ClimateRepository> {
        Arc::new(LocalRepository::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_repository_types() {
        assert_eq!("sqlite".parse::<RepositoryType>(), Ok(RepositoryType::Sqlite));
        assert_eq!("Local".parse::<RepositoryType>(), Ok(RepositoryType::Local));
        assert!("mongodb".parse::<RepositoryType>().is_err());
    }

    #[test]
    fn create_local_builds_empty_repository() {
        let _repo = RepositoryFactory::create_local();
    }
}
