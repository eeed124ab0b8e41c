//! Flight enrichment functions.
//!
//! Every function here is a pure function of its inputs and the snapshot it
//! is given. Unmapped airport codes are an ordinary outcome, never an error.

use crate::ReferenceSnapshot;
use fl_types::{FlightRecord, FlightType, GeoPoint};
use rayon::prelude::*;

/// Classifies a flight by the countries of its departure and arrival airports.
///
/// Returns [`FlightType::Unknown`] when either airport has no known country.
pub fn determine_flight_type(
    dep_iata: &str,
    arr_iata: &str,
    snapshot: &ReferenceSnapshot,
) -> FlightType {
    match (snapshot.country(dep_iata), snapshot.country(arr_iata)) {
        (Some(dep), Some(arr)) if dep == arr => FlightType::Domestic,
        (Some(_), Some(_)) => FlightType::International,
        _ => FlightType::Unknown,
    }
}

/// Position of an airport, `(0.0, 0.0)` when unmapped.
///
/// The origin is kept as a real point rather than an absent value so index
/// documents always carry a `geo_point`.
pub fn get_position(iata: &str, snapshot: &ReferenceSnapshot) -> GeoPoint {
    snapshot.position(iata)
}

/// Name of an airport, `None` when unmapped.
pub fn get_name<'a>(iata: &str, snapshot: &'a ReferenceSnapshot) -> Option<&'a str> {
    snapshot.name(iata)
}

/// Attaches the derived fields to a record.
///
/// A missing `dep_iata` or `arr_iata` is looked up as an empty code, which is
/// never mapped.
pub fn enrich(mut record: FlightRecord, snapshot: &ReferenceSnapshot) -> FlightRecord {
    let dep = record.dep_iata.as_deref().unwrap_or("");
    let arr = record.arr_iata.as_deref().unwrap_or("");

    let flight_type = determine_flight_type(dep, arr, snapshot);
    let dep_pos = get_position(dep, snapshot);
    let arr_pos = get_position(arr, snapshot);
    let departure = get_name(dep, snapshot).map(str::to_string);
    let arrival = get_name(arr, snapshot).map(str::to_string);

    record.flight_type = Some(flight_type);
    record.dep_pos = Some(dep_pos);
    record.arr_pos = Some(arr_pos);
    record.departure = departure;
    record.arrival = arrival;
    record
}

/// Enriches a batch in parallel, preserving input order.
pub fn enrich_batch(records: Vec<FlightRecord>, snapshot: &ReferenceSnapshot) -> Vec<FlightRecord> {
    records
        .into_par_iter()
        .map(|record| enrich(record, snapshot))
        .collect()
}
