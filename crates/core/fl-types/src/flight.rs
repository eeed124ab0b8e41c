//! Flight record types.

use crate::GeoPoint;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Classification of a flight by the countries of its airports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightType {
    /// Departure and arrival airports are in the same country
    Domestic,
    /// Departure and arrival airports are in different countries
    International,
    /// At least one airport has no known country
    Unknown,
}

impl FlightType {
    /// Returns the wire name of the classification.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Domestic => "Domestic",
            Self::International => "International",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for FlightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flight telemetry record.
///
/// The same type carries both the raw upstream record and the enriched index
/// document. The derived fields (`flight_type`, `dep_pos`, `arr_pos`,
/// `Departure`, `Arrival`) are unset until enrichment runs.
///
/// Fields the pipeline does not know about are kept in `extra` so a record
/// survives a parse/serialize cycle without losing upstream data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    /// ICAO 24-bit aircraft address
    #[serde(
        default,
        deserialize_with = "lenient_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub hex: Option<String>,

    /// Current aircraft position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<GeoPoint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,

    /// Altitude
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,

    /// Heading in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<f64>,

    /// Ground speed
    #[serde(
        default,
        deserialize_with = "lenient_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub speed: Option<i64>,

    /// Vertical speed
    #[serde(
        default,
        deserialize_with = "lenient_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub v_speed: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_icao: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_iata: Option<String>,

    /// Departure airport IATA code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dep_iata: Option<String>,

    /// Arrival airport IATA code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arr_iata: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airline_iata: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aircraft_icao: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Derived: domestic / international / unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_type: Option<FlightType>,

    /// Derived: departure airport position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dep_pos: Option<GeoPoint>,

    /// Derived: arrival airport position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arr_pos: Option<GeoPoint>,

    /// Derived: departure airport name
    #[serde(rename = "Departure", default, skip_serializing_if = "Option::is_none")]
    pub departure: Option<String>,

    /// Derived: arrival airport name
    #[serde(rename = "Arrival", default, skip_serializing_if = "Option::is_none")]
    pub arrival: Option<String>,

    /// Upstream fields not modelled above
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FlightRecord {
    /// Returns the publish key: the `hex` field, or an empty string when absent.
    pub fn key(&self) -> &str {
        self.hex.as_deref().unwrap_or("")
    }

    /// Returns the document id used by the index, if the record has one.
    ///
    /// Records without a `hex` (or with an empty one) have no stable identity
    /// and are left for the store to assign.
    pub fn document_id(&self) -> Option<&str> {
        self.hex.as_deref().filter(|hex| !hex.is_empty())
    }

    /// Returns true once enrichment has classified the record.
    pub fn is_enriched(&self) -> bool {
        self.flight_type.is_some()
    }
}

/// Extracts the publish key from a raw upstream JSON object.
///
/// Mirrors [`FlightRecord::key`] for payloads that are forwarded verbatim:
/// a missing or null `hex` yields an empty string, a non-string value is
/// rendered as JSON text.
pub fn raw_key(value: &serde_json::Value) -> String {
    match value.get("hex") {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Reads `hex` the way [`raw_key`] renders it, so a record the producer keyed
/// is never rejected by the consumer.
fn lenient_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Accepts integers, floats (truncated toward zero) and null for integer fields.
///
/// The upstream API reports some speeds as fractional values.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(value.and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64))))
}
