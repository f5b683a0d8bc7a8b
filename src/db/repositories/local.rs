//! In-memory repository for unit testing and local development.
//!
//! Holds stations and observations in a `RwLock`-guarded store and answers
//! the same queries as the SQLite backend. Seeding goes through
//! `insert_station` / `insert_observation`; the HTTP surface itself never
//! writes.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::RwLock;

use crate::api::{
    Observation, PrecipitationReading, Station, TemperatureReading, TemperatureSummary,
};
use crate::db::repository::{ClimateRepository, RepositoryError, RepositoryResult};

#[derive(Debug, Default)]
struct Store {
    stations: Vec<Station>,
    observations: Vec<Observation>,
}

/// In-memory implementation of [`ClimateRepository`].
#[derive(Debug, Default)]
pub struct LocalRepository {
    store: RwLock<Store>,
}

impl LocalRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-seeded with stations and observations.
    pub fn with_data(stations: Vec<Station>, observations: Vec<Observation>) -> Self {
        Self {
            store: RwLock::new(Store {
                stations,
                observations,
            }),
        }
    }

    /// Add a station record.
    pub fn insert_station(&self, station: Station) {
        self.store
            .write()
            .expect("local store lock poisoned")
            .stations
            .push(station);
    }

    /// Add an observation record.
    pub fn insert_observation(&self, observation: Observation) {
        self.store
            .write()
            .expect("local store lock poisoned")
            .observations
            .push(observation);
    }

    fn read(&self) -> RepositoryResult<std::sync::RwLockReadGuard<'_, Store>> {
        self.store
            .read()
            .map_err(|_| RepositoryError::internal("local store lock poisoned"))
    }
}

#[async_trait]
impl ClimateRepository for LocalRepository {
    async fn latest_observation_date(&self) -> RepositoryResult<Option<NaiveDate>> {
        let store = self.read()?;
        Ok(store.observations.iter().map(|o| o.date).max())
    }

    async fn list_stations(&self) -> RepositoryResult<Vec<Station>> {
        let store = self.read()?;
        Ok(store.stations.clone())
    }

    async fn precipitation_after(
        &self,
        cutoff: NaiveDate,
    ) -> RepositoryResult<Vec<PrecipitationReading>> {
        let store = self.read()?;
        let mut readings: Vec<PrecipitationReading> = store
            .observations
            .iter()
            .filter(|o| o.date > cutoff)
            .map(PrecipitationReading::from)
            .collect();
        readings.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.station.cmp(&b.station)));
        Ok(readings)
    }

    async fn temperature_after(
        &self,
        cutoff: NaiveDate,
    ) -> RepositoryResult<Vec<TemperatureReading>> {
        let store = self.read()?;
        let mut readings: Vec<TemperatureReading> = store
            .observations
            .iter()
            .filter(|o| o.date > cutoff)
            .map(TemperatureReading::from)
            .collect();
        readings.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.station.cmp(&b.station)));
        Ok(readings)
    }

    async fn temperature_summary(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<TemperatureSummary> {
        let store = self.read()?;
        let mut min: Option<f64> = None;
        let mut max: Option<f64> = None;
        let mut sum = 0.0;
        let mut count: u64 = 0;

        for obs in store
            .observations
            .iter()
            .filter(|o| o.date >= start && o.date <= end)
        {
            min = Some(min.map_or(obs.tobs, |m: f64| m.min(obs.tobs)));
            max = Some(max.map_or(obs.tobs, |m: f64| m.max(obs.tobs)));
            sum += obs.tobs;
            count += 1;
        }

        let avg = (count > 0).then(|| sum / count as f64);
        Ok(TemperatureSummary { min, avg, max })
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(station: &str, date: &str, prcp: Option<f64>, tobs: f64) -> Observation {
        Observation {
            station: station.to_string(),
            date: date.parse().unwrap(),
            prcp,
            tobs,
        }
    }

    #[tokio::test]
    async fn latest_date_of_empty_store_is_none() {
        let repo = LocalRepository::new();
        assert_eq!(repo.latest_observation_date().await.unwrap(), None);
    }

    #[tokio::test]
    async fn readings_are_ordered_by_date_then_station() {
        let repo = LocalRepository::new();
        repo.insert_observation(obs("B", "2017-08-02", Some(0.1), 75.0));
        repo.insert_observation(obs("A", "2017-08-02", None, 76.0));
        repo.insert_observation(obs("A", "2017-08-01", Some(0.0), 74.0));

        let cutoff: NaiveDate = "2017-01-01".parse().unwrap();
        let readings = repo.precipitation_after(cutoff).await.unwrap();
        let order: Vec<(String, NaiveDate)> = readings
            .iter()
            .map(|r| (r.station.clone(), r.date))
            .collect();
        assert_eq!(
            order,
            vec![
                ("A".to_string(), "2017-08-01".parse().unwrap()),
                ("A".to_string(), "2017-08-02".parse().unwrap()),
                ("B".to_string(), "2017-08-02".parse().unwrap()),
            ]
        );
    }

    #[tokio::test]
    async fn summary_over_empty_window_is_all_none() {
        let repo = LocalRepository::new();
        repo.insert_observation(obs("A", "2017-08-01", None, 78.0));

        let summary = repo
            .temperature_summary("2018-01-01".parse().unwrap(), "2018-12-31".parse().unwrap())
            .await
            .unwrap();
        assert!(summary.is_empty());
    }

    #[tokio::test]
    async fn summary_bounds_are_inclusive() {
        let repo = LocalRepository::new();
        repo.insert_observation(obs("A", "2017-08-01", None, 78.0));
        repo.insert_observation(obs("A", "2017-08-10", None, 80.0));

        let summary = repo
            .temperature_summary("2017-08-01".parse().unwrap(), "2017-08-10".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(summary.min, Some(78.0));
        assert_eq!(summary.avg, Some(79.0));
        assert_eq!(summary.max, Some(80.0));
    }
}
