//! Reference data and enrichment for flightline.
//!
//! This crate provides:
//! - [`ReferenceSnapshot`] - Immutable airport lookup tables (country, position, name)
//! - [`SnapshotHandle`] - Shared handle that hands the same snapshot to every
//!   worker and swaps in reloaded snapshots atomically
//! - Pure enrichment functions ([`determine_flight_type`], [`get_position`],
//!   [`get_name`], [`enrich`], [`enrich_batch`])
//!
//! # Example
//!
//! ```rust,ignore
//! use fl_enrichment::{enrich_batch, ReferenceSnapshot, ReferenceSourceConfig, SnapshotHandle};
//!
//! let config = ReferenceSourceConfig::new("data/airports.csv");
//! let handle = SnapshotHandle::new(ReferenceSnapshot::load(&config, None).await?);
//!
//! let snapshot = handle.load();
//! let enriched = enrich_batch(records, &snapshot);
//! ```

mod config;
mod engine;
mod handle;
mod loader;
mod snapshot;
mod table;

pub use config::ReferenceSourceConfig;
pub use engine::{determine_flight_type, enrich, enrich_batch, get_name, get_position};
pub use handle::SnapshotHandle;
pub use loader::{load_csv, CsvContent};
pub use snapshot::{ReferenceSnapshot, ReferenceSnapshotBuilder, SnapshotStats};
pub use table::LookupTable;
