//! fl-index CLI
//!
//! Creates the flight index with its mapping unless it already exists.

use anyhow::Result;
use clap::Parser;
use fl_indexer::{
    flight_index_schema, load_schema, ElasticsearchConfig, ElasticsearchStore, IndexSchemaManager,
    IndexStatus,
};
use fl_traits::IndexStore;
use std::sync::Arc;
use tracing::warn;

mod args;

use args::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    fl_cli_common::init_logging(args.log_level)?;

    let schema = match &args.schema {
        Some(path) => load_schema(path)?,
        None => flight_index_schema(),
    };

    let mut es_config = ElasticsearchConfig::new(&args.es_url);
    if let Some(user) = &args.es_user {
        es_config = es_config.with_basic_auth(user, args.es_password.clone());
    }
    let store = Arc::new(ElasticsearchStore::new(&es_config)?);

    if !store.health_check().await.unwrap_or(false) {
        warn!(url = %args.es_url, "Cluster health check failed, trying anyway");
    }

    let manager = IndexSchemaManager::new(store, &args.index);
    match manager.ensure_index(&schema).await? {
        IndexStatus::Created => println!("Index '{}' has been created.", args.index),
        IndexStatus::Exists => println!("Index '{}' already exists. No action taken.", args.index),
    }

    Ok(())
}
