//! Database module for the climate observation store.
//!
//! This module provides abstractions for store access via the Repository
//! pattern, allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                              │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                             │
//! │  - Trailing-year windows, trip-date shifting             │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Trait (repository/)                          │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴───────────────┐
//!     │  SqliteRepository (Diesel)    │
//!     │  LocalRepository (in-memory)  │
//!     └───────────────────────────────┘
//! ```
//!
//! # Recommended Usage
//!
//! Use the service layer with any repository implementation:
//!
//! ```ignore
//! use climate_api::db::{services, RepositoryFactory, RepositoryType, SqliteConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SqliteConfig::from_env()?;
//!     let repo = RepositoryFactory::create(RepositoryType::Sqlite, Some(&config))?;
//!     let stations = services::list_stations(repo.as_ref()).await?;
//!     Ok(())
//! }
//! ```

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;


// SQLite config is colocated with the repository implementation.
#[cfg(feature = "sqlite-repo")]
pub use repositories::sqlite::SqliteConfig;
#[cfg(not(feature = "sqlite-repo"))]
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    _private: (),
}

// ==================== Service Layer ====================

pub use services::{
    health_check, list_stations, precipitation_trailing_year, temperature_trailing_year,
    trip_summary,
};

// ==================== Repository Pattern Exports ====================

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "sqlite-repo")]
pub use repositories::SqliteRepository;
pub use repository::{
    ClimateRepository, ErrorContext, RepositoryError, RepositoryResult,
};

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn ClimateRepository>> = OnceLock::new();

fn create_selected_repository() -> RepositoryResult<Arc<dyn ClimateRepository>> {
    // A repository.toml in a standard location takes precedence; a malformed
    // file is an error rather than a silent fall-through to the environment.
    if let Some(path) = RepositoryConfig::default_location() {
        tracing::info!(path = %path.display(), "Loading repository configuration file");
        return RepositoryFactory::from_config_file(path);
    }
    RepositoryFactory::from_env()
}

/// Initialize the global repository singleton for the selected backend.
///
/// Selection prefers a `repository.toml` in a standard location, then falls
/// back to [`RepositoryType::from_env`]: SQLite when a database URL is
/// configured, in-memory otherwise.
pub fn init_repository() -> Result<()> {
    if REPOSITORY.get().is_some() {
        return Ok(());
    }

    let repo = create_selected_repository()
        .map_err(|e| anyhow::Error::msg(e.to_string()))
        .context("Failed to initialize repository")?;
    let _ = REPOSITORY.set(repo);
    Ok(())
}

/// Get a reference to the global repository instance.
pub fn get_repository() -> Result<&'static Arc<dyn ClimateRepository>> {
    if REPOSITORY.get().is_none() {
        let _ = init_repository();
    }

    REPOSITORY
        .get()
        .context("Repository not initialized. Call init_repository() first.")
}
