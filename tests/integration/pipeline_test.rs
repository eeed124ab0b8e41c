//! End-to-end runs over a mock flight API, the in-memory publisher and the
//! in-memory index store.

use fl_enrichment::{ReferenceSnapshot, ReferenceSourceConfig, SnapshotHandle};
use fl_error::{FlError, IngestError};
use fl_indexer::{flight_index_schema, IndexSchemaManager, IndexStatus, MemoryIndexStore};
use fl_producer::{IngestionProducer, MemoryPublisher, ProducerConfig};
use fl_worker::{Worker, WorkerConfig};
use integration_tests::{airports_file, flight_api, replay};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDEX: &str = "esflight";

fn producer_config(server: &MockServer) -> ProducerConfig {
    ProducerConfig::new(format!("{}/flights", server.uri()))
        .with_send_interval(Duration::ZERO)
        .with_request_timeout(Duration::from_millis(500))
}

async fn load_snapshot() -> Arc<SnapshotHandle> {
    let airports = airports_file();
    let config = ReferenceSourceConfig::new(airports.path().to_string_lossy());
    let snapshot = ReferenceSnapshot::load(&config, None).await.unwrap();
    Arc::new(SnapshotHandle::new(snapshot))
}

#[tokio::test]
async fn test_fetch_enrich_and_index() {
    let server = flight_api(json!([
        {"hex": "abc123", "flight_iata": "AF7300", "dep_iata": "CDG", "arr_iata": "ORY", "alt": 3200},
        {"hex": "def456", "flight_iata": "AF006", "dep_iata": "CDG", "arr_iata": "JFK", "speed": 870},
        {"hex": "ghi789", "dep_iata": "CDG", "arr_iata": "XXX"}
    ]))
    .await;

    let publisher = Arc::new(MemoryPublisher::new());
    let producer = IngestionProducer::new(producer_config(&server), publisher.clone()).unwrap();
    let summary = producer
        .fetch_and_publish(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.delivered, 3);
    assert!(summary.is_complete());

    let messages = publisher.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].topic, "flights");
    assert_eq!(messages[0].key, "abc123");

    let store = Arc::new(MemoryIndexStore::new());
    let manager = Arc::new(IndexSchemaManager::new(store.clone(), INDEX));
    assert_eq!(
        manager.ensure_index(&flight_index_schema()).await.unwrap(),
        IndexStatus::Created
    );

    let worker = Worker::new(WorkerConfig::new(), replay(&messages), load_snapshot().await, manager);
    let stats = worker.run(&CancellationToken::new()).await.unwrap();

    assert_eq!(stats.received, 3);
    assert_eq!(stats.written, 3);
    assert_eq!(stats.failed, 0);
    assert_eq!(store.document_count(INDEX), 3);

    let domestic = store.document(INDEX, "abc123").unwrap();
    assert_eq!(domestic["flight_type"], "Domestic");
    assert_eq!(domestic["Departure"], "Charles de Gaulle International Airport");
    assert_eq!(domestic["Arrival"], "Paris-Orly Airport");
    assert_eq!(domestic["flight_iata"], "AF7300");
    assert_eq!(domestic["alt"], 3200.0);

    let international = store.document(INDEX, "def456").unwrap();
    assert_eq!(international["flight_type"], "International");
    assert_eq!(international["Arrival"], "John F Kennedy International Airport");

    let unknown = store.document(INDEX, "ghi789").unwrap();
    assert_eq!(unknown["flight_type"], "Unknown");
    assert_eq!(unknown["arr_pos"], json!({"lat": 0.0, "lon": 0.0}));
    assert_eq!(unknown["dep_pos"]["lat"], 49.012798);
    assert!(unknown.get("Arrival").is_none());
}

#[tokio::test]
async fn test_repeated_runs_overwrite_by_hex() {
    let server = flight_api(json!([
        {"hex": "abc123", "dep_iata": "CDG", "arr_iata": "ORY", "alt": 1000}
    ]))
    .await;

    let store = Arc::new(MemoryIndexStore::new());
    let manager = Arc::new(IndexSchemaManager::new(store.clone(), INDEX));
    let snapshot = load_snapshot().await;

    for expected in [IndexStatus::Created, IndexStatus::Exists] {
        assert_eq!(
            manager.ensure_index(&flight_index_schema()).await.unwrap(),
            expected
        );

        let publisher = Arc::new(MemoryPublisher::new());
        let producer = IngestionProducer::new(producer_config(&server), publisher.clone()).unwrap();
        producer
            .fetch_and_publish(&CancellationToken::new())
            .await
            .unwrap();

        let worker = Worker::new(
            WorkerConfig::new(),
            replay(&publisher.messages()),
            snapshot.clone(),
            manager.clone(),
        );
        worker.run(&CancellationToken::new()).await.unwrap();
    }

    assert_eq!(store.create_calls(), 1);
    assert_eq!(store.document_count(INDEX), 1);
}

#[tokio::test]
async fn test_api_timeout_publishes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flights"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": [{"hex": "abc123"}]}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let publisher = Arc::new(MemoryPublisher::new());
    let producer = IngestionProducer::new(producer_config(&server), publisher.clone()).unwrap();
    let result = producer.fetch_and_publish(&CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(FlError::Ingest(IngestError::ApiTimeout(_)))
    ));
    assert!(publisher.is_empty());
    assert_eq!(publisher.flush_count(), 0);
}

#[tokio::test]
async fn test_reference_reload_applies_to_next_batch() {
    let handle = load_snapshot().await;
    assert_eq!(handle.load().country("CDG"), Some("FR"));
    assert!(handle.load().country("XXX").is_none());

    handle.store(
        ReferenceSnapshot::builder()
            .airport("XXX", "FR", 45.0, 5.0, "Test Field")
            .airport("CDG", "FR", 49.0128, 2.55, "Charles de Gaulle International Airport")
            .build(),
    );

    let store = Arc::new(MemoryIndexStore::new());
    let manager = Arc::new(IndexSchemaManager::new(store.clone(), INDEX));
    let publisher = Arc::new(MemoryPublisher::new());
    let server = flight_api(json!([{"hex": "ghi789", "dep_iata": "CDG", "arr_iata": "XXX"}])).await;
    IngestionProducer::new(producer_config(&server), publisher.clone())
        .unwrap()
        .fetch_and_publish(&CancellationToken::new())
        .await
        .unwrap();

    let worker = Worker::new(WorkerConfig::new(), replay(&publisher.messages()), handle, manager);
    worker.run(&CancellationToken::new()).await.unwrap();

    let doc = store.document(INDEX, "ghi789").unwrap();
    assert_eq!(doc["flight_type"], "Domestic");
    assert_eq!(doc["Arrival"], "Test Field");
}
