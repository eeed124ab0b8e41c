//! SnapshotHandle - atomically swappable shared reference snapshot.

use crate::{ReferenceSnapshot, ReferenceSourceConfig, SnapshotStats};
use arc_swap::ArcSwap;
use fl_error::Result;
use reqwest::Client;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared handle to the current [`ReferenceSnapshot`].
///
/// Every worker calls [`load`](SnapshotHandle::load) to get an `Arc` to the
/// current snapshot and keeps using it for the whole batch it is enriching.
/// [`reload`](SnapshotHandle::reload) and [`store`](SnapshotHandle::store)
/// replace the snapshot as a whole, so a batch never sees a mix of old and
/// new tables.
#[derive(Debug)]
pub struct SnapshotHandle {
    current: ArcSwap<ReferenceSnapshot>,
}

impl SnapshotHandle {
    /// Creates a handle holding `snapshot`.
    pub fn new(snapshot: ReferenceSnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    /// Returns the current snapshot.
    pub fn load(&self) -> Arc<ReferenceSnapshot> {
        self.current.load_full()
    }

    /// Replaces the current snapshot.
    pub fn store(&self, snapshot: ReferenceSnapshot) {
        self.current.store(Arc::new(snapshot));
    }

    /// Builds a fresh snapshot from `config` and swaps it in.
    ///
    /// If loading fails the previous snapshot stays in place.
    pub async fn reload(
        &self,
        config: &ReferenceSourceConfig,
        http_client: Option<&Client>,
    ) -> Result<SnapshotStats> {
        match ReferenceSnapshot::load(config, http_client).await {
            Ok(snapshot) => {
                let stats = snapshot.stats();
                self.store(snapshot);
                info!(
                    countries = stats.countries,
                    positions = stats.positions,
                    names = stats.names,
                    "Reference snapshot reloaded"
                );
                Ok(stats)
            }
            Err(e) => {
                warn!(error = %e, "Reference reload failed, keeping previous snapshot");
                Err(e)
            }
        }
    }
}

impl Default for SnapshotHandle {
    fn default() -> Self {
        Self::new(ReferenceSnapshot::default())
    }
}
