//! Core types for flightline.
//!
//! This crate provides the foundational types used throughout the system:
//! - [`FlightRecord`] - A flight telemetry record, raw or enriched
//! - [`GeoPoint`] - A latitude/longitude pair in `geo_point` object form
//! - [`FlightType`] - Domestic / international classification

pub mod flight;
pub mod geo;

pub use flight::*;
pub use geo::*;
