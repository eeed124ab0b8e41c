//! CSV loading utilities for reference tables.

use crate::LookupTable;
use fl_error::{ReferenceError, Result};
use fl_types::GeoPoint;
use reqwest::Client;
use std::path::Path;
use tracing::{debug, info};

/// Loads a CSV source and returns (headers, records).
///
/// Supports both local files and `http(s)://` URLs. When no HTTP client is
/// supplied for a URL source a default client is created.
pub async fn load_csv(source: &str, http_client: Option<&Client>) -> Result<CsvContent> {
    let content = if is_remote(source) {
        load_from_http(source, http_client).await?
    } else {
        load_from_file(source).await?
    };

    parse_csv(&content)
}

/// Headers and rows of a parsed CSV source.
pub type CsvContent = (Vec<String>, Vec<csv::StringRecord>);

/// Builds the IATA → country code table.
pub(crate) fn country_table(
    source: &str,
    (headers, records): &CsvContent,
    key_field: &str,
    country_field: &str,
) -> Result<LookupTable<String>> {
    let key_idx = column_index(&headers, key_field)?;
    let country_idx = column_index(&headers, country_field)?;

    let table = string_table(records, key_idx, country_idx);

    info!(source = %source, entries = table.len(), "Built country table");
    Ok(table)
}

/// Builds the IATA → airport name table.
pub(crate) fn name_table(
    source: &str,
    (headers, records): &CsvContent,
    key_field: &str,
    name_field: &str,
) -> Result<LookupTable<String>> {
    let key_idx = column_index(&headers, key_field)?;
    let name_idx = column_index(&headers, name_field)?;

    let table = string_table(records, key_idx, name_idx);

    info!(source = %source, entries = table.len(), "Built name table");
    Ok(table)
}

/// Builds the IATA → (lat, lon) table.
///
/// Rows whose coordinates are missing or not numbers are skipped.
pub(crate) fn position_table(
    source: &str,
    (headers, records): &CsvContent,
    key_field: &str,
    lat_field: &str,
    lon_field: &str,
) -> Result<LookupTable<GeoPoint>> {
    let key_idx = column_index(&headers, key_field)?;
    let lat_idx = column_index(&headers, lat_field)?;
    let lon_idx = column_index(&headers, lon_field)?;

    let mut table = LookupTable::new();
    let mut skipped = 0usize;

    for (line_num, record) in records.iter().enumerate() {
        let key = record.get(key_idx).unwrap_or("").trim();
        if key.is_empty() {
            continue;
        }

        let lat = record.get(lat_idx).and_then(|v| v.trim().parse::<f64>().ok());
        let lon = record.get(lon_idx).and_then(|v| v.trim().parse::<f64>().ok());

        match (lat, lon) {
            (Some(lat), Some(lon)) => table.insert(key, GeoPoint::new(lat, lon)),
            _ => {
                debug!(
                    line = line_num + 2, // +2 for 1-indexed and header row
                    iata = %key,
                    "Skipping row with invalid coordinates"
                );
                skipped += 1;
            }
        }
    }

    info!(
        source = %source,
        entries = table.len(),
        skipped = skipped,
        "Built position table"
    );
    Ok(table)
}

fn string_table(records: &[csv::StringRecord], key_idx: usize, value_idx: usize) -> LookupTable<String> {
    let mut table = LookupTable::new();
    for record in records {
        let key = record.get(key_idx).unwrap_or("").trim();
        let value = record.get(value_idx).unwrap_or("").trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        table.insert(key, value.to_string());
    }
    table
}

fn column_index(headers: &[String], field: &str) -> Result<usize> {
    headers.iter().position(|h| h == field).ok_or_else(|| {
        ReferenceError::Schema(format!(
            "Column '{}' not found in CSV headers: {:?}",
            field, headers
        ))
        .into()
    })
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

async fn load_from_file(path: &str) -> Result<String> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(ReferenceError::NotFound(path.display().to_string()).into());
    }

    tokio::fs::read_to_string(path).await.map_err(|e| {
        ReferenceError::Io(format!("Failed to read {}: {}", path.display(), e)).into()
    })
}

async fn load_from_http(url: &str, http_client: Option<&Client>) -> Result<String> {
    let owned;
    let client = match http_client {
        Some(client) => client,
        None => {
            owned = Client::new();
            &owned
        }
    };

    debug!(url = %url, "Loading reference table over HTTP");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ReferenceError::Fetch(format!("Failed to fetch {url}: {e}")))?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ReferenceError::NotFound(url.to_string()).into());
    }
    if !status.is_success() {
        return Err(ReferenceError::Fetch(format!("{url} responded with status {status}")).into());
    }

    response
        .text()
        .await
        .map_err(|e| ReferenceError::Fetch(format!("Failed to read body of {url}: {e}")).into())
}

fn parse_csv(content: &str) -> Result<CsvContent> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReferenceError::Parse(format!("Failed to parse CSV headers: {e}")))?
        .iter()
        .map(|s| s.trim().to_string())
        .collect();

    let records: Vec<csv::StringRecord> = reader.records().filter_map(|r| r.ok()).collect();

    Ok((headers, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const AIRPORTS: &str = "iata_code,iso_country,latitude_deg,longitude_deg,name\n\
                            CDG,FR,49.0097,2.5479,Charles de Gaulle\n\
                            ORY,FR,48.7262,2.3652,Paris Orly\n\
                            JFK,US,40.6413,-73.7781,John F Kennedy\n\
                            ,US,1.0,1.0,No Code\n\
                            ZZZ,,bad,2.0,\n";

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    async fn read(file: &NamedTempFile) -> CsvContent {
        load_csv(file.path().to_str().unwrap(), None).await.unwrap()
    }

    #[tokio::test]
    async fn test_country_table() {
        let file = create_test_csv(AIRPORTS);
        let table = country_table("airports", &read(&file).await, "iata_code", "iso_country").unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get("CDG").map(String::as_str), Some("FR"));
        assert!(table.get("ZZZ").is_none());
    }

    #[tokio::test]
    async fn test_position_table_skips_bad_coordinates() {
        let file = create_test_csv(AIRPORTS);
        let table = position_table(
            "airports",
            &read(&file).await,
            "iata_code",
            "latitude_deg",
            "longitude_deg",
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get("JFK"), Some(&GeoPoint::new(40.6413, -73.7781)));
        assert!(table.get("ZZZ").is_none());
    }

    #[tokio::test]
    async fn test_name_table() {
        let file = create_test_csv(AIRPORTS);
        let table = name_table("airports", &read(&file).await, "iata_code", "name").unwrap();

        assert_eq!(table.get("ORY").map(String::as_str), Some("Paris Orly"));
        assert!(table.get("ZZZ").is_none());
    }

    #[tokio::test]
    async fn test_load_csv_file_not_found() {
        let result = load_csv("/nonexistent/airports.csv", None).await;
        assert!(matches!(
            result,
            Err(fl_error::FlError::Reference(ReferenceError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_missing_column() {
        let file = create_test_csv("code,country\nCDG,FR\n");
        let result = country_table("airports", &read(&file).await, "iata_code", "country");
        assert!(matches!(
            result,
            Err(fl_error::FlError::Reference(ReferenceError::Schema(_)))
        ));
    }

    #[tokio::test]
    async fn test_load_csv_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/airports.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string(AIRPORTS))
            .mount(&server)
            .await;

        let (headers, records) = load_csv(&format!("{}/airports.csv", server.uri()), None)
            .await
            .unwrap();

        assert_eq!(headers[0], "iata_code");
        assert_eq!(records.len(), 5);
    }

    #[tokio::test]
    async fn test_load_csv_http_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = load_csv(&format!("{}/missing.csv", server.uri()), None).await;
        assert!(matches!(
            result,
            Err(fl_error::FlError::Reference(ReferenceError::NotFound(_)))
        ));
    }
}
