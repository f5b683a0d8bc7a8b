//! Data Transfer Objects for the HTTP API.
//!
//! The listing DTOs are re-exported from the domain types since they already
//! derive Serialize/Deserialize; this module adds the response shapes that
//! exist only at the HTTP surface.

use serde::{Deserialize, Serialize};

pub use crate::api::{PrecipitationReading, Station, TemperatureReading};

/// Station record as returned by `/api/v1.0/stations`: identifier and name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationDto {
    /// Station code
    pub station: String,
    /// Station name
    pub name: String,
}

impl From<Station> for StationDto {
    fn from(station: Station) -> Self {
        Self {
            station: station.station,
            name: station.name,
        }
    }
}

/// Trip summary response: the JSON array `[min, avg, max]`.
///
/// Fields are null when the queried window held no observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSummaryDto(pub [Option<f64>; 3]);

impl From<crate::api::TemperatureSummary> for TripSummaryDto {
    fn from(summary: crate::api::TemperatureSummary) -> Self {
        Self([summary.min, summary.avg, summary.max])
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Store connection status
    pub database: String,
}
