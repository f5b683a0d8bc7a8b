//! End-to-end tests for the HTTP surface, driven through the router with an
//! in-memory repository.

#![cfg(feature = "http-server")]

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use async_trait::async_trait;
use chrono::NaiveDate;

use climate_api::api::{
    Observation, PrecipitationReading, Station, TemperatureReading, TemperatureSummary,
};
use climate_api::db::repositories::LocalRepository;
use climate_api::db::repository::{ClimateRepository, RepositoryError, RepositoryResult};
use climate_api::http::{create_router, AppState};

fn station(code: &str, name: &str) -> Station {
    Station {
        station: code.to_string(),
        name: name.to_string(),
        latitude: None,
        longitude: None,
        elevation: None,
    }
}

fn obs(code: &str, date: &str, prcp: Option<f64>, tobs: f64) -> Observation {
    Observation {
        station: code.to_string(),
        date: date.parse().unwrap(),
        prcp,
        tobs,
    }
}

/// Router over a store holding only the worked example: one station with
/// readings on 2017-08-01 (tobs 78) and 2017-08-10 (tobs 80).
fn example_app() -> Router {
    let repo = LocalRepository::new();
    repo.insert_station(station("USC001", "Waikiki"));
    repo.insert_observation(obs("USC001", "2017-08-01", Some(0.05), 78.0));
    repo.insert_observation(obs("USC001", "2017-08-10", None, 80.0));
    app_with(repo)
}

fn app_with(repo: LocalRepository) -> Router {
    let state = AppState::new(Arc::new(repo) as Arc<dyn ClimateRepository>);
    create_router(state)
}

/// Store whose every operation fails with a connection error, standing in
/// for an unreachable database.
struct OfflineStore;

impl OfflineStore {
    fn err<T>() -> RepositoryResult<T> {
        Err(RepositoryError::connection("store offline"))
    }
}

#[async_trait]
impl ClimateRepository for OfflineStore {
    async fn latest_observation_date(&self) -> RepositoryResult<Option<NaiveDate>> {
        Self::err()
    }

    async fn list_stations(&self) -> RepositoryResult<Vec<Station>> {
        Self::err()
    }

    async fn precipitation_after(
        &self,
        _cutoff: NaiveDate,
    ) -> RepositoryResult<Vec<PrecipitationReading>> {
        Self::err()
    }

    async fn temperature_after(
        &self,
        _cutoff: NaiveDate,
    ) -> RepositoryResult<Vec<TemperatureReading>> {
        Self::err()
    }

    async fn temperature_summary(
        &self,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> RepositoryResult<TemperatureSummary> {
        Self::err()
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Self::err()
    }
}

fn offline_app() -> Router {
    create_router(AppState::new(Arc::new(OfflineStore)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, bytes) = get(app, uri).await;
    let value = serde_json::from_slice(&bytes).expect("response body should be JSON");
    (status, value)
}

#[tokio::test]
async fn index_lists_available_routes() {
    let (status, bytes) = get(example_app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(bytes).unwrap();
    assert!(html.contains("/api/v1.0/precipitation"));
    assert!(html.contains("/api/v1.0/stations"));
    assert!(html.contains("/api/v1.0/tobs"));
}

#[tokio::test]
async fn health_reports_connected_store() {
    let (status, json) = get_json(example_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "connected");
}

#[tokio::test]
async fn health_reports_unreachable_store_as_degraded() {
    let (status, json) = get_json(offline_app(), "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "degraded");
    assert!(json["database"]
        .as_str()
        .unwrap()
        .starts_with("error:"));
}

#[tokio::test]
async fn data_routes_surface_store_outage_as_unavailable() {
    let (status, json) = get_json(offline_app(), "/api/v1.0/precipitation").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "STORE_UNAVAILABLE");
}

#[tokio::test]
async fn stations_returns_single_record_unmodified() {
    let (status, json) = get_json(example_app(), "/api/v1.0/stations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!([{"station": "USC001", "name": "Waikiki"}])
    );
}

#[tokio::test]
async fn precipitation_excludes_trailing_year_cutoff() {
    let repo = LocalRepository::new();
    repo.insert_station(station("USC001", "Waikiki"));
    // Latest date 2017-08-23 puts the cutoff at 2016-08-23.
    repo.insert_observation(obs("USC001", "2016-08-23", Some(1.0), 70.0));
    repo.insert_observation(obs("USC001", "2016-08-24", Some(0.5), 71.0));
    repo.insert_observation(obs("USC001", "2017-08-23", Some(0.0), 80.0));

    let (status, json) = get_json(app_with(repo), "/api/v1.0/precipitation").await;
    assert_eq!(status, StatusCode::OK);
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    for entry in entries {
        assert!(entry["date"].as_str().unwrap() > "2016-08-23");
    }
}

#[tokio::test]
async fn tobs_returns_station_date_pairs_ascending() {
    let (status, json) = get_json(example_app(), "/api/v1.0/tobs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!([
            {"station": "USC001", "date": "2017-08-01", "tobs": 78.0},
            {"station": "USC001", "date": "2017-08-10", "tobs": 80.0},
        ])
    );
}

#[tokio::test]
async fn trip_start_only_matches_worked_example() {
    // 2018-08-01 shifts back one year to 2017-08-01 and runs through the
    // end of the data.
    let (status, json) = get_json(example_app(), "/api/v1.0/2018-08-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([78.0, 79.0, 80.0]));
}

#[tokio::test]
async fn trip_range_shifts_both_bounds() {
    let (status, json) = get_json(example_app(), "/api/v1.0/2018-08-01/2018-08-10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([78.0, 79.0, 80.0]));
}

#[tokio::test]
async fn trip_range_inverted_yields_nulls_not_fault() {
    let (status, json) = get_json(example_app(), "/api/v1.0/2018-08-10/2018-08-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([null, null, null]));
}

#[tokio::test]
async fn trip_with_no_observations_in_window_yields_nulls() {
    let (status, json) = get_json(example_app(), "/api/v1.0/2021-01-01/2021-12-31").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([null, null, null]));
}

#[tokio::test]
async fn malformed_start_date_is_bad_request() {
    let (status, json) = get_json(example_app(), "/api/v1.0/not-a-date").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["message"].as_str().unwrap().contains("not-a-date"));
}

#[tokio::test]
async fn malformed_end_date_is_bad_request() {
    let (status, json) = get_json(example_app(), "/api/v1.0/2018-08-01/2018-13-99").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn listing_routes_win_over_date_capture() {
    // "stations" must route to the listing handler, not parse as a date.
    let (status, _) = get_json(example_app(), "/api/v1.0/stations").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn empty_store_listings_are_empty_arrays() {
    let app = app_with(LocalRepository::new());
    let (status, json) = get_json(app.clone(), "/api/v1.0/precipitation").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([]));

    let (status, json) = get_json(app, "/api/v1.0/tobs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([]));
}
