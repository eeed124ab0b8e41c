//! Round trip through a live Kafka broker.

use fl_producer::{KafkaPublisher, KafkaPublisherConfig};
use fl_traits::{MessagePublisher, RecordSource};
use fl_worker::{KafkaSource, KafkaSourceConfig};
use integration_tests::{env_or, unique_name};
use std::time::Duration;

fn bootstrap_servers() -> String {
    env_or("FL_KAFKA_BOOTSTRAP_SERVERS", "localhost:9092")
}

#[tokio::test]
#[ignore = "requires Kafka"]
async fn test_publish_then_consume() {
    let topic = unique_name("flights-it");
    let publisher = KafkaPublisher::new(&KafkaPublisherConfig::new(bootstrap_servers()))
        .expect("Failed to create publisher");

    let payloads = [
        ("abc123", r#"{"hex":"abc123","dep_iata":"CDG","arr_iata":"ORY"}"#),
        ("def456", r#"{"hex":"def456","dep_iata":"CDG","arr_iata":"JFK"}"#),
    ];
    let deliveries: Vec<_> = payloads
        .iter()
        .map(|(key, payload)| publisher.publish(&topic, key, payload.as_bytes().to_vec()))
        .collect();
    publisher.flush(Duration::from_secs(30)).await.unwrap();
    for delivery in deliveries {
        delivery.await.expect("delivery failed");
    }

    let source = KafkaSource::new(
        &KafkaSourceConfig::new(bootstrap_servers(), topic.clone())
            .with_group_id(unique_name("flight-enrichment-it")),
    )
    .expect("Failed to create source");

    let mut received = Vec::new();
    for _ in 0..30 {
        if let Some(batch) = source.receive(10, Duration::from_secs(1)).await.unwrap() {
            received.extend(batch);
        }
        if received.len() >= payloads.len() {
            break;
        }
    }

    assert_eq!(received.len(), payloads.len());
    assert_eq!(received[0].key.as_deref(), Some("abc123"));
    assert_eq!(received[0].payload, payloads[0].1.as_bytes());

    source.commit(&received).await.expect("commit failed");
}
