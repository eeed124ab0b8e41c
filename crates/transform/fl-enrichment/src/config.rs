//! Configuration for reference table sources.

use serde::{Deserialize, Serialize};

/// Where the airport reference tables come from and which columns to read.
///
/// By default all three tables are read from one airport CSV in the
/// OurAirports layout. Each table can be pointed at its own source, which
/// must carry the key column plus that table's value columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSourceConfig {
    /// Airport CSV source (local path or `http(s)://` URL).
    pub airports: String,

    /// Column holding the IATA code.
    #[serde(default = "default_key_field")]
    pub key_field: String,

    /// Column holding the ISO country code.
    #[serde(default = "default_country_field")]
    pub country_field: String,

    /// Column holding the latitude in degrees.
    #[serde(default = "default_lat_field")]
    pub lat_field: String,

    /// Column holding the longitude in degrees.
    #[serde(default = "default_lon_field")]
    pub lon_field: String,

    /// Column holding the airport name.
    #[serde(default = "default_name_field")]
    pub name_field: String,

    /// Overrides the source of the country table.
    #[serde(default)]
    pub country_source: Option<String>,

    /// Overrides the source of the position table.
    #[serde(default)]
    pub position_source: Option<String>,

    /// Overrides the source of the name table.
    #[serde(default)]
    pub name_source: Option<String>,
}

fn default_key_field() -> String {
    "iata_code".to_string()
}

fn default_country_field() -> String {
    "iso_country".to_string()
}

fn default_lat_field() -> String {
    "latitude_deg".to_string()
}

fn default_lon_field() -> String {
    "longitude_deg".to_string()
}

fn default_name_field() -> String {
    "name".to_string()
}

impl ReferenceSourceConfig {
    /// Creates a configuration reading every table from one airport CSV.
    pub fn new(airports: impl Into<String>) -> Self {
        Self {
            airports: airports.into(),
            key_field: default_key_field(),
            country_field: default_country_field(),
            lat_field: default_lat_field(),
            lon_field: default_lon_field(),
            name_field: default_name_field(),
            country_source: None,
            position_source: None,
            name_source: None,
        }
    }

    /// Set the key column name.
    pub fn with_key_field(mut self, field: impl Into<String>) -> Self {
        self.key_field = field.into();
        self
    }

    /// Set the country column name.
    pub fn with_country_field(mut self, field: impl Into<String>) -> Self {
        self.country_field = field.into();
        self
    }

    /// Set the latitude and longitude column names.
    pub fn with_position_fields(mut self, lat: impl Into<String>, lon: impl Into<String>) -> Self {
        self.lat_field = lat.into();
        self.lon_field = lon.into();
        self
    }

    /// Set the name column name.
    pub fn with_name_field(mut self, field: impl Into<String>) -> Self {
        self.name_field = field.into();
        self
    }

    /// Read the country table from a separate source.
    pub fn with_country_source(mut self, source: impl Into<String>) -> Self {
        self.country_source = Some(source.into());
        self
    }

    /// Read the position table from a separate source.
    pub fn with_position_source(mut self, source: impl Into<String>) -> Self {
        self.position_source = Some(source.into());
        self
    }

    /// Read the name table from a separate source.
    pub fn with_name_source(mut self, source: impl Into<String>) -> Self {
        self.name_source = Some(source.into());
        self
    }

    /// Source used for the country table.
    pub fn country_source(&self) -> &str {
        self.country_source.as_deref().unwrap_or(&self.airports)
    }

    /// Source used for the position table.
    pub fn position_source(&self) -> &str {
        self.position_source.as_deref().unwrap_or(&self.airports)
    }

    /// Source used for the name table.
    pub fn name_source(&self) -> &str {
        self.name_source.as_deref().unwrap_or(&self.airports)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.airports.trim().is_empty() {
            return Err("airports source must not be empty".to_string());
        }
        for (name, value) in [
            ("key_field", &self.key_field),
            ("country_field", &self.country_field),
            ("lat_field", &self.lat_field),
            ("lon_field", &self.lon_field),
            ("name_field", &self.name_field),
        ] {
            if value.is_empty() {
                return Err(format!("{name} must not be empty"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReferenceSourceConfig::new("airports.csv");

        assert_eq!(config.key_field, "iata_code");
        assert_eq!(config.country_field, "iso_country");
        assert_eq!(config.country_source(), "airports.csv");
        assert_eq!(config.position_source(), "airports.csv");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_source_overrides() {
        let config = ReferenceSourceConfig::new("airports.csv")
            .with_country_source("countries.csv")
            .with_name_source("https://example.com/names.csv");

        assert_eq!(config.country_source(), "countries.csv");
        assert_eq!(config.position_source(), "airports.csv");
        assert_eq!(config.name_source(), "https://example.com/names.csv");
    }

    #[test]
    fn test_serde_defaults() {
        let config: ReferenceSourceConfig =
            serde_json::from_str(r#"{"airports": "/data/airports.csv"}"#).unwrap();
        assert_eq!(config, ReferenceSourceConfig::new("/data/airports.csv"));
    }

    #[test]
    fn test_validation() {
        assert!(ReferenceSourceConfig::new("").validate().is_err());
        assert!(ReferenceSourceConfig::new("a.csv")
            .with_key_field("")
            .validate()
            .is_err());
    }
}
