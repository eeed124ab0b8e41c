//! Index management and writes against a live Elasticsearch cluster.

use fl_indexer::{
    flight_index_schema, ElasticsearchConfig, ElasticsearchStore, IndexSchemaManager, IndexStatus,
};
use fl_traits::IndexStore;
use fl_types::{FlightRecord, FlightType};
use integration_tests::{env_or, unique_name};
use std::sync::Arc;

fn store() -> Option<Arc<ElasticsearchStore>> {
    let config = ElasticsearchConfig::new(env_or("FL_ES_URL", "http://localhost:9200"));
    ElasticsearchStore::new(&config).ok().map(Arc::new)
}

#[tokio::test]
#[ignore = "requires Elasticsearch"]
async fn test_ensure_index_is_idempotent() {
    let Some(store) = store() else { return };
    if !store.health_check().await.unwrap_or(false) {
        eprintln!("Elasticsearch not available, skipping test");
        return;
    }

    let index = unique_name("esflight-it");
    let manager = IndexSchemaManager::new(store.clone(), index.clone());
    let schema = flight_index_schema();

    assert_eq!(manager.ensure_index(&schema).await.unwrap(), IndexStatus::Created);
    let created = store.get_schema(&index).await.unwrap().expect("schema");

    assert_eq!(manager.ensure_index(&schema).await.unwrap(), IndexStatus::Exists);
    assert_eq!(store.get_schema(&index).await.unwrap(), Some(created.clone()));
    assert_eq!(
        created["mappings"]["properties"]["position"]["type"],
        "geo_point"
    );
}

#[tokio::test]
#[ignore = "requires Elasticsearch"]
async fn test_write_batch_upserts_by_hex() {
    let Some(store) = store() else { return };
    if !store.health_check().await.unwrap_or(false) {
        eprintln!("Elasticsearch not available, skipping test");
        return;
    }

    let index = unique_name("esflight-it");
    let manager = IndexSchemaManager::new(store.clone(), index);
    manager.ensure_index(&flight_index_schema()).await.unwrap();

    let record = FlightRecord {
        hex: Some("abc123".to_string()),
        dep_iata: Some("CDG".to_string()),
        arr_iata: Some("ORY".to_string()),
        flight_type: Some(FlightType::Domestic),
        ..Default::default()
    };

    let first = manager.write_batch(std::slice::from_ref(&record)).await.unwrap();
    let second = manager.write_batch(&[record]).await.unwrap();

    assert!(first.is_complete());
    assert!(second.is_complete());
    assert_eq!(second.written, 1);
}
