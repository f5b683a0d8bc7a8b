//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to one API endpoint and delegates to the
//! service layer for the query logic.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::NaiveDate;

use super::dto::{
    HealthResponse, PrecipitationReading, StationDto, TemperatureReading, TripSummaryDto,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

const INDEX_HTML: &str = concat!(
    "Available Routes:<br/>",
    "<br/>",
    "/api/v1.0/precipitation<br/>",
    "- Precipitation readings from the trailing year for all stations<br/>",
    "<br/>",
    "/api/v1.0/stations<br/>",
    "- List of station codes and names<br/>",
    "<br/>",
    "/api/v1.0/tobs<br/>",
    "- Temperature observations from the trailing year for all stations<br/>",
    "<br/>",
    "/api/v1.0/&lt;start&gt;<br/>",
    "- MIN/AVG/MAX temperature from the start date (YYYY-MM-DD, shifted back \
     one year) through the end of the data<br/>",
    "<br/>",
    "/api/v1.0/&lt;start&gt;/&lt;end&gt;<br/>",
    "- MIN/AVG/MAX temperature between the start and end dates (YYYY-MM-DD, \
     both shifted back one year), inclusive<br/>",
);

fn parse_date(input: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|e| {
        AppError::BadRequest(format!(
            "invalid date '{}': expected YYYY-MM-DD ({})",
            input, e
        ))
    })
}

/// GET /
///
/// HTML listing of the available routes.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is
/// reachable. Returns 503 with a `degraded` status when the store probe
/// fails, so load balancers can take the instance out of rotation.
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let (status_code, db_status) = match services::health_check(state.repository.as_ref()).await {
        Ok(true) => (StatusCode::OK, "connected".to_string()),
        Ok(false) => (StatusCode::SERVICE_UNAVAILABLE, "disconnected".to_string()),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("error: {}", e)),
    };

    let status = if status_code == StatusCode::OK {
        "ok"
    } else {
        "degraded"
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: "v1.0".to_string(),
            database: db_status,
        }),
    )
}

/// GET /api/v1.0/precipitation
///
/// Precipitation readings for the trailing year, one entry per station-date
/// pair, ordered by date ascending.
pub async fn precipitation(
    State(state): State<AppState>,
) -> HandlerResult<Vec<PrecipitationReading>> {
    let readings = services::precipitation_trailing_year(state.repository.as_ref()).await?;
    Ok(Json(readings))
}

/// GET /api/v1.0/stations
///
/// All station codes and names, unmodified.
pub async fn stations(State(state): State<AppState>) -> HandlerResult<Vec<StationDto>> {
    let stations = services::list_stations(state.repository.as_ref()).await?;
    Ok(Json(stations.into_iter().map(StationDto::from).collect()))
}

/// GET /api/v1.0/tobs
///
/// Temperature observations for the trailing year, same window and ordering
/// as the precipitation listing.
pub async fn tobs(State(state): State<AppState>) -> HandlerResult<Vec<TemperatureReading>> {
    let readings = services::temperature_trailing_year(state.repository.as_ref()).await?;
    Ok(Json(readings))
}

/// GET /api/v1.0/{start}
///
/// Min/avg/max temperature from the start date (shifted back one year)
/// through the most recent date in the store. Malformed dates yield 400.
pub async fn trip_from_start(
    State(state): State<AppState>,
    Path(start): Path<String>,
) -> HandlerResult<TripSummaryDto> {
    let start = parse_date(&start)?;
    let summary = services::trip_summary(state.repository.as_ref(), start, None).await?;
    Ok(Json(summary.into()))
}

/// GET /api/v1.0/{start}/{end}
///
/// Min/avg/max temperature between the start and end dates (both shifted
/// back one year), inclusive. An inverted range yields `[null, null, null]`.
pub async fn trip_range(
    State(state): State<AppState>,
    Path((start, end)): Path<(String, String)>,
) -> HandlerResult<TripSummaryDto> {
    let start = parse_date(&start)?;
    let end = parse_date(&end)?;
    let summary = services::trip_summary(state.repository.as_ref(), start, Some(end)).await?;
    Ok(Json(summary.into()))
}
