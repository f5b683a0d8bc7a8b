//! High-level query functions over the observation store.
//!
//! This layer owns the date-window logic: the trailing-year cutoff for the
//! listing endpoints and the one-year shift applied to trip-summary dates.
//! Handlers call these functions with any [`ClimateRepository`]
//! implementation.

use chrono::{Duration, NaiveDate};

use crate::api::{PrecipitationReading, Station, TemperatureReading, TemperatureSummary};
use crate::db::repository::{ClimateRepository, RepositoryResult};

/// The trailing-year window and the trip-date shift both use a fixed
/// 365-day year, so the window length never depends on leap days.
fn one_year() -> Duration {
    Duration::days(365)
}

/// Cutoff for the trailing-year listings: readings strictly after this
/// date fall inside the window ending at `anchor`.
pub fn trailing_year_cutoff(anchor: NaiveDate) -> NaiveDate {
    anchor - one_year()
}

/// List all stations.
pub async fn list_stations(repo: &dyn ClimateRepository) -> RepositoryResult<Vec<Station>> {
    repo.list_stations().await
}

/// Precipitation readings for the trailing year.
///
/// The window anchors to the most recent date present in the store, queried
/// at request time, so it tracks a growing dataset. An empty store yields
/// an empty list.
pub async fn precipitation_trailing_year(
    repo: &dyn ClimateRepository,
) -> RepositoryResult<Vec<PrecipitationReading>> {
    match repo.latest_observation_date().await? {
        Some(anchor) => repo.precipitation_after(trailing_year_cutoff(anchor)).await,
        None => Ok(Vec::new()),
    }
}

/// Temperature readings for the trailing year, same window as
/// [`precipitation_trailing_year`].
pub async fn temperature_trailing_year(
    repo: &dyn ClimateRepository,
) -> RepositoryResult<Vec<TemperatureReading>> {
    match repo.latest_observation_date().await? {
        Some(anchor) => repo.temperature_after(trailing_year_cutoff(anchor)).await,
        None => Ok(Vec::new()),
    }
}

/// Min/avg/max temperature for a trip window.
///
/// Caller-supplied dates are shifted back one year before querying: the
/// endpoint answers "what was this window like last year", matching the
/// dataset's historical snapshot. With no `end`, the window runs through
/// the most recent date in the store.
///
/// `start > end` (after the shift) is an empty window and yields an
/// all-`None` summary, not an error.
pub async fn trip_summary(
    repo: &dyn ClimateRepository,
    start: NaiveDate,
    end: Option<NaiveDate>,
) -> RepositoryResult<TemperatureSummary> {
    let window_start = start - one_year();
    let window_end = match end {
        Some(end) => end - one_year(),
        None => match repo.latest_observation_date().await? {
            Some(latest) => latest,
            None => return Ok(TemperatureSummary::default()),
        },
    };

    repo.temperature_summary(window_start, window_end).await
}

/// Verify the store is reachable.
pub async fn health_check(repo: &dyn ClimateRepository) -> RepositoryResult<bool> {
    repo.health_check().await
}
