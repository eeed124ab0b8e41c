//! Destination index mapping.

use fl_error::{IndexerError, Result};
use serde_json::{json, Value};
use std::path::Path;

/// Default destination index.
pub const DEFAULT_INDEX: &str = "esflight";

/// Returns the default mapping document for flight records.
///
/// Positions are `geo_point`, identifiers and categories are `keyword`,
/// altitude and heading are `float`, speeds are `integer`.
pub fn flight_index_schema() -> Value {
    let keyword = json!({"type": "keyword"});
    let geo_point = json!({"type": "geo_point"});

    let mut properties = serde_json::Map::new();
    for field in ["position", "arr_pos", "dep_pos"] {
        properties.insert(field.to_string(), geo_point.clone());
    }
    for field in [
        "hex",
        "reg_number",
        "flag",
        "flight_number",
        "flight_icao",
        "flight_iata",
        "dep_iata",
        "arr_iata",
        "airline_iata",
        "aircraft_icao",
        "status",
        "type",
        "Departure",
        "Arrival",
    ] {
        properties.insert(field.to_string(), keyword.clone());
    }
    for field in ["alt", "dir"] {
        properties.insert(field.to_string(), json!({"type": "float"}));
    }
    for field in ["speed", "v_speed"] {
        properties.insert(field.to_string(), json!({"type": "integer"}));
    }

    json!({ "mappings": { "properties": properties } })
}

/// Reads a mapping document from a JSON file.
///
/// The document is passed to the store as-is; it only has to be a JSON
/// object.
pub fn load_schema(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        IndexerError::MappingError(format!("Failed to read schema {}: {e}", path.display()))
    })?;

    let schema: Value = serde_json::from_str(&content).map_err(|e| {
        IndexerError::MappingError(format!("Invalid schema JSON in {}: {e}", path.display()))
    })?;

    if !schema.is_object() {
        return Err(IndexerError::MappingError(format!(
            "Schema in {} must be a JSON object",
            path.display()
        ))
        .into());
    }

    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_field_types() {
        let schema = flight_index_schema();
        let props = &schema["mappings"]["properties"];

        assert_eq!(props["position"]["type"], "geo_point");
        assert_eq!(props["dep_pos"]["type"], "geo_point");
        assert_eq!(props["hex"]["type"], "keyword");
        assert_eq!(props["Departure"]["type"], "keyword");
        assert_eq!(props["alt"]["type"], "float");
        assert_eq!(props["v_speed"]["type"], "integer");
        assert_eq!(props.as_object().unwrap().len(), 21);
    }

    #[test]
    fn test_load_schema() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"mappings": {{"properties": {{"hex": {{"type": "keyword"}}}}}}}}"#)
            .unwrap();

        let schema = load_schema(file.path()).unwrap();
        assert_eq!(schema["mappings"]["properties"]["hex"]["type"], "keyword");
    }

    #[test]
    fn test_load_schema_rejects_non_object() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[1, 2]").unwrap();

        assert!(load_schema(file.path()).is_err());
        assert!(load_schema("/nonexistent/schema.json").is_err());
    }
}
