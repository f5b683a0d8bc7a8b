//! Domain types shared across the repository, service, and HTTP layers.
//!
//! All types derive Serialize/Deserialize for JSON serialization.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A fixed weather-monitoring location.
///
/// Stations are immutable reference data; the service never writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Station code, e.g. `USC00519397`
    pub station: String,
    /// Human-readable station name
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees
    pub longitude: Option<f64>,
    /// Elevation in meters
    pub elevation: Option<f64>,
}

/// One station's daily measurement record.
///
/// The source data is not deduplicated: multiple stations report on the
/// same date, and the listing endpoints keep one entry per station-date
/// pair rather than collapsing into a date-keyed mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Station code this reading belongs to
    pub station: String,
    /// Observation date (day granularity)
    pub date: NaiveDate,
    /// Precipitation in inches; missing for stations without a gauge reading
    pub prcp: Option<f64>,
    /// Temperature observation in degrees Fahrenheit
    pub tobs: f64,
}

/// A dated precipitation reading, as returned by the trailing-year listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecipitationReading {
    pub station: String,
    pub date: NaiveDate,
    pub prcp: Option<f64>,
}

/// A dated temperature reading, as returned by the trailing-year listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub station: String,
    pub date: NaiveDate,
    pub tobs: f64,
}

/// Min/avg/max temperature aggregate over a date window.
///
/// All fields are `None` when the window contains no observations; an
/// average over zero rows is null, never a fault.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TemperatureSummary {
    pub min: Option<f64>,
    pub avg: Option<f64>,
    pub max: Option<f64>,
}

impl TemperatureSummary {
    /// True when the underlying window contained no observations.
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.avg.is_none() && self.max.is_none()
    }
}

impl From<&Observation> for PrecipitationReading {
    fn from(obs: &Observation) -> Self {
        Self {
            station: obs.station.clone(),
            date: obs.date,
            prcp: obs.prcp,
        }
    }
}

impl From<&Observation> for TemperatureReading {
    fn from(obs: &Observation) -> Self {
        Self {
            station: obs.station.clone(),
            date: obs.date,
            tobs: obs.tobs,
        }
    }
}
