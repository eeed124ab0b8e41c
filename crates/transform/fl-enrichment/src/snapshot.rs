//! ReferenceSnapshot - the immutable set of airport lookup tables.

use crate::loader::{country_table, load_csv, name_table, position_table, CsvContent};
use crate::{LookupTable, ReferenceSourceConfig};
use fl_error::{FlError, Result};
use fl_types::GeoPoint;
use hashbrown::HashMap;
use reqwest::Client;
use tracing::info;

/// Airport reference tables, built once and shared read-only by every
/// enrichment worker.
///
/// A snapshot has no interior mutability. Refreshing reference data means
/// building a new snapshot and swapping it in through a
/// [`SnapshotHandle`](crate::SnapshotHandle).
#[derive(Debug, Clone, Default)]
pub struct ReferenceSnapshot {
    countries: LookupTable<String>,
    positions: LookupTable<GeoPoint>,
    names: LookupTable<String>,
}

impl ReferenceSnapshot {
    /// Creates a snapshot from already-built tables.
    pub fn new(
        countries: LookupTable<String>,
        positions: LookupTable<GeoPoint>,
        names: LookupTable<String>,
    ) -> Self {
        Self {
            countries,
            positions,
            names,
        }
    }

    /// Starts building a snapshot in code.
    pub fn builder() -> ReferenceSnapshotBuilder {
        ReferenceSnapshotBuilder::default()
    }

    /// Loads all three tables from the configured sources.
    ///
    /// # Arguments
    ///
    /// * `config` - Source locations and column names
    /// * `http_client` - Optional HTTP client for URL sources
    pub async fn load(config: &ReferenceSourceConfig, http_client: Option<&Client>) -> Result<Self> {
        config.validate().map_err(FlError::Config)?;

        // One read per distinct source, so the tables come from the same version of it
        let sources = [
            config.country_source(),
            config.position_source(),
            config.name_source(),
        ];
        let mut contents: HashMap<&str, CsvContent> = HashMap::new();
        for source in sources {
            if !contents.contains_key(source) {
                contents.insert(source, load_csv(source, http_client).await?);
            }
        }

        let [country_source, position_source, name_source] = sources;
        let countries = country_table(
            country_source,
            &contents[country_source],
            &config.key_field,
            &config.country_field,
        )?;
        let positions = position_table(
            position_source,
            &contents[position_source],
            &config.key_field,
            &config.lat_field,
            &config.lon_field,
        )?;
        let names = name_table(
            name_source,
            &contents[name_source],
            &config.key_field,
            &config.name_field,
        )?;

        let snapshot = Self::new(countries, positions, names);
        let stats = snapshot.stats();

        info!(
            countries = stats.countries,
            positions = stats.positions,
            names = stats.names,
            "Loaded reference snapshot"
        );

        Ok(snapshot)
    }

    /// Country code of an airport, if known.
    pub fn country(&self, iata: &str) -> Option<&str> {
        self.countries.get(iata).map(String::as_str)
    }

    /// Position of an airport, if known.
    pub fn lookup_position(&self, iata: &str) -> Option<GeoPoint> {
        self.positions.get(iata).copied()
    }

    /// Position of an airport, or `(0.0, 0.0)` when unknown.
    pub fn position(&self, iata: &str) -> GeoPoint {
        self.lookup_position(iata).unwrap_or(GeoPoint::ORIGIN)
    }

    /// Name of an airport, if known.
    pub fn name(&self, iata: &str) -> Option<&str> {
        self.names.get(iata).map(String::as_str)
    }

    /// Returns entry counts per table.
    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            countries: self.countries.len(),
            positions: self.positions.len(),
            names: self.names.len(),
        }
    }

    /// Returns true if every table is empty.
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty() && self.positions.is_empty() && self.names.is_empty()
    }
}

/// Entry counts of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotStats {
    /// Entries in the country table
    pub countries: usize,
    /// Entries in the position table
    pub positions: usize,
    /// Entries in the name table
    pub names: usize,
}

/// Builder for snapshots assembled in code.
#[derive(Debug, Default)]
pub struct ReferenceSnapshotBuilder {
    countries: LookupTable<String>,
    positions: LookupTable<GeoPoint>,
    names: LookupTable<String>,
}

impl ReferenceSnapshotBuilder {
    /// Adds a country mapping.
    pub fn country(mut self, iata: impl Into<String>, country: impl Into<String>) -> Self {
        self.countries.insert(iata, country.into());
        self
    }

    /// Adds a position mapping.
    pub fn position(mut self, iata: impl Into<String>, lat: f64, lon: f64) -> Self {
        self.positions.insert(iata, GeoPoint::new(lat, lon));
        self
    }

    /// Adds a name mapping.
    pub fn name(mut self, iata: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(iata, name.into());
        self
    }

    /// Adds all three mappings for one airport.
    pub fn airport(
        self,
        iata: &str,
        country: impl Into<String>,
        lat: f64,
        lon: f64,
        name: impl Into<String>,
    ) -> Self {
        self.country(iata, country)
            .position(iata, lat, lon)
            .name(iata, name)
    }

    /// Finishes the snapshot.
    pub fn build(self) -> ReferenceSnapshot {
        ReferenceSnapshot::new(self.countries, self.positions, self.names)
    }
}
