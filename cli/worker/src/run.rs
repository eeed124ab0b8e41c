//! Main execution logic for fl-worker CLI.

use anyhow::Result;
use fl_enrichment::{ReferenceSnapshot, ReferenceSourceConfig, SnapshotHandle};
use fl_indexer::{
    flight_index_schema, load_schema, ElasticsearchConfig, ElasticsearchStore, IndexSchemaManager,
    RetryConfig,
};
use fl_worker::{
    spawn_snapshot_refresh, KafkaSource, KafkaSourceConfig, StatsSnapshot, StdinSource, Worker,
    WorkerConfig,
};
use fl_traits::RecordSource;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::args::{Cli, InputType};
use crate::progress::ProgressReporter;

/// Execute the worker with the provided arguments.
pub async fn execute(args: Cli) -> Result<StatsSnapshot> {
    let config = WorkerConfig::new()
        .with_batch_size(args.batch_size)
        .with_poll_wait(Duration::from_millis(args.poll_wait_ms));
    config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;

    let reference_config = reference_config(&args);
    reference_config
        .validate()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let cancel = fl_cli_common::cancel_on_ctrl_c();

    // Reference tables are fully loaded before any record is consumed
    let http = reqwest::Client::new();
    let snapshot = ReferenceSnapshot::load(&reference_config, Some(&http)).await?;
    let handle = Arc::new(SnapshotHandle::new(snapshot));

    let refresh = args.reference_refresh.map(|secs| {
        spawn_snapshot_refresh(
            handle.clone(),
            reference_config.clone(),
            Some(http.clone()),
            Duration::from_secs(secs),
            cancel.clone(),
        )
    });

    let manager = Arc::new(index_manager(&args).await?);

    let stats = match args.input {
        InputType::Stdin => {
            let worker = Worker::new(config, StdinSource::new(), handle, manager);
            run_worker(&worker, &args, &cancel).await?
        }
        InputType::Kafka => {
            let source_config = KafkaSourceConfig::new(&args.bootstrap_servers, &args.topic)
                .with_group_id(&args.group_id);
            let source = KafkaSource::new(&source_config)?;
            let worker = Worker::new(config, source, handle, manager);
            run_worker(&worker, &args, &cancel).await?
        }
    };

    cancel.cancel();
    if let Some(task) = refresh {
        let _ = task.await;
    }

    Ok(stats)
}

async fn run_worker<S>(
    worker: &Worker<S>,
    args: &Cli,
    cancel: &CancellationToken,
) -> Result<StatsSnapshot>
where
    S: RecordSource + 'static,
{
    let mut progress = ProgressReporter::new(args.progress, args.progress_interval);
    progress.start(worker.stats().clone());

    let result = worker.run(cancel).await;
    progress.stop(worker.stats()).await;

    Ok(result?)
}

fn reference_config(args: &Cli) -> ReferenceSourceConfig {
    let mut config = ReferenceSourceConfig::new(&args.airports);
    if let Some(source) = &args.country_source {
        config = config.with_country_source(source);
    }
    if let Some(source) = &args.position_source {
        config = config.with_position_source(source);
    }
    if let Some(source) = &args.name_source {
        config = config.with_name_source(source);
    }
    config
}

async fn index_manager(args: &Cli) -> Result<IndexSchemaManager> {
    let mut es_config = ElasticsearchConfig::new(&args.es_url);
    if let Some(user) = &args.es_user {
        es_config = es_config.with_basic_auth(user, args.es_password.clone());
    }
    let store = Arc::new(ElasticsearchStore::new(&es_config)?);

    let manager = IndexSchemaManager::new(store, &args.index)
        .with_retry_config(RetryConfig::new().with_max_retries(args.max_retries));

    let schema = match &args.schema {
        Some(path) => load_schema(path)?,
        None => flight_index_schema(),
    };
    let status = manager.ensure_index(&schema).await?;
    info!(index = %args.index, status = %status, "Index ready");

    Ok(manager)
}
