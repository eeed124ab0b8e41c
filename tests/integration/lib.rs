//! Shared fixtures for the flightline integration tests.

use fl_producer::PublishedMessage;
use fl_worker::StdinSource;
use serde_json::Value;
use std::io::{Cursor, Write};
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Airports used across the scenarios, in the OurAirports column layout.
pub const AIRPORTS_CSV: &str = "\
id,ident,type,name,latitude_deg,longitude_deg,iso_country,iata_code
1382,LFPG,large_airport,Charles de Gaulle International Airport,49.012798,2.55,FR,CDG
1418,LFPO,large_airport,Paris-Orly Airport,48.7233333,2.3794444,FR,ORY
3622,KJFK,large_airport,John F Kennedy International Airport,40.639801,-73.7789,US,JFK
4000,ZZZZ,heliport,Unnamed Pad,1.0,1.0,US,
";

/// Writes [`AIRPORTS_CSV`] to a temporary file.
pub fn airports_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(AIRPORTS_CSV.as_bytes()).expect("write airports");
    file.flush().expect("flush airports");
    file
}

/// Starts a mock flight API answering `GET /flights` with `items`.
pub async fn flight_api(items: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": items
        })))
        .mount(&server)
        .await;
    server
}

/// Turns published messages into a source replaying their payloads.
pub fn replay(messages: &[PublishedMessage]) -> StdinSource {
    let mut lines = String::new();
    for message in messages {
        lines.push_str(&String::from_utf8_lossy(&message.payload));
        lines.push('\n');
    }
    StdinSource::with_reader(Box::new(Cursor::new(lines)))
}

/// Returns `var` or `default`.
pub fn env_or(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

/// A name unique to this test run.
pub fn unique_name(prefix: &str) -> String {
    format!(
        "{prefix}-{}",
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}
