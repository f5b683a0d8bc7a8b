//! Repository trait for the observation store.
//!
//! The trait abstracts over the storage backend so the service and HTTP
//! layers work identically against SQLite and the in-memory repository.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::api::{PrecipitationReading, Station, TemperatureReading, TemperatureSummary};

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

/// Read-only repository over the climate observation store.
///
/// Every operation maps to one fixed query; the service layer supplies the
/// date windows. Empty result sets are not errors anywhere: listings return
/// empty vectors and aggregates over an empty window return all-`None`
/// summaries.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ClimateRepository: Send + Sync {
    /// The most recent observation date present in the store.
    ///
    /// Returns `Ok(None)` for an empty store. This is queried at request
    /// time so the trailing-year window tracks a growing dataset instead of
    /// a fixed snapshot date.
    async fn latest_observation_date(&self) -> RepositoryResult<Option<NaiveDate>>;

    /// All station records, unfiltered, no ordering guarantee.
    async fn list_stations(&self) -> RepositoryResult<Vec<Station>>;

    /// Precipitation readings strictly after `cutoff`, ordered by date
    /// ascending (then station code, for a stable order).
    async fn precipitation_after(
        &self,
        cutoff: NaiveDate,
    ) -> RepositoryResult<Vec<PrecipitationReading>>;

    /// Temperature readings strictly after `cutoff`, ordered by date
    /// ascending (then station code).
    async fn temperature_after(
        &self,
        cutoff: NaiveDate,
    ) -> RepositoryResult<Vec<TemperatureReading>>;

    /// Min/avg/max temperature over `[start, end]` inclusive.
    ///
    /// A window with no observations (including `start > end`) yields an
    /// all-`None` summary rather than an error.
    async fn temperature_summary(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<TemperatureSummary>;

    /// Verify the store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
