//! Periodic reference snapshot refresh.

use fl_enrichment::{ReferenceSourceConfig, SnapshotHandle};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Spawns a task reloading the reference tables every `every`.
///
/// Each reload replaces the whole snapshot; a failed reload keeps the
/// previous one. The task ends when `cancel` fires.
pub fn spawn_snapshot_refresh(
    handle: Arc<SnapshotHandle>,
    config: ReferenceSourceConfig,
    http_client: Option<Client>,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the snapshot is already loaded
        ticker.tick().await;

        info!(every_secs = every.as_secs(), "Reference refresh enabled");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    // Errors are logged by the handle
                    let _ = handle.reload(&config, http_client.as_ref()).await;
                }
            }
        }

        debug!("Reference refresh stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_enrichment::ReferenceSnapshot;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_refresh_swaps_snapshot() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "iata_code,iso_country,latitude_deg,longitude_deg,name").unwrap();
        writeln!(file, "CDG,FR,49.0128,2.55,Charles de Gaulle International Airport").unwrap();
        file.flush().unwrap();

        let handle = Arc::new(SnapshotHandle::new(ReferenceSnapshot::default()));
        let config = ReferenceSourceConfig::new(file.path().to_string_lossy());
        let cancel = CancellationToken::new();

        let task = spawn_snapshot_refresh(
            handle.clone(),
            config,
            None,
            Duration::from_millis(20),
            cancel.clone(),
        );

        let mut loaded = false;
        for _ in 0..100 {
            if handle.load().country("CDG") == Some("FR") {
                loaded = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        cancel.cancel();
        task.await.unwrap();
        assert!(loaded);
    }
}
