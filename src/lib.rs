//! # Climate API
//!
//! Read-only HTTP/JSON service over a fixed climate-observation dataset:
//! station metadata plus daily precipitation and temperature readings held
//! in a local SQLite store. Each endpoint runs one predetermined listing or
//! aggregate query, optionally parameterized by a date or date range.
//!
//! ## Architecture
//!
//! The crate is organized into three layers:
//!
//! - [`api`]: domain types shared across layers (stations, readings,
//!   temperature summaries)
//! - [`db`]: repository pattern over the observation store, with a Diesel
//!   SQLite implementation and an in-memory implementation for tests and
//!   local development, plus the service layer that owns the date-window
//!   logic
//! - [`http`]: axum-based HTTP server, request handlers, and error mapping
//!
//! The HTTP surface is versioned under `/api/v1.0` and is strictly
//! read-only; the store is expected to be pre-populated.

pub mod api;

pub mod db;

#[cfg(feature = "http-server")]
pub mod http;
