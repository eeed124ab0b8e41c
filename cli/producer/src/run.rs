//! Main execution logic for fl-producer CLI.

use anyhow::Result;
use fl_producer::{
    IngestionProducer, KafkaPublisher, KafkaPublisherConfig, MemoryPublisher, ProducerConfig,
    PublishSummary,
};
use fl_traits::MessagePublisher;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::args::Cli;

/// Execute one producer run with the provided arguments.
pub async fn execute(args: Cli) -> Result<PublishSummary> {
    let config = ProducerConfig::new(&args.api_url)
        .with_topic(&args.topic)
        .with_request_timeout(Duration::from_millis(args.request_timeout_ms))
        .with_send_interval(Duration::from_millis(args.send_interval_ms))
        .with_flush_timeout(Duration::from_secs(args.flush_timeout))
        .with_delivery_policy(args.delivery_policy.into());

    config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;

    let cancel = fl_cli_common::cancel_on_ctrl_c();

    if args.dry_run {
        info!("Dry run, messages are printed instead of published");
        let publisher = Arc::new(MemoryPublisher::new());
        let producer = IngestionProducer::new(config, publisher.clone())?;
        let summary = producer.fetch_and_publish(&cancel).await?;

        let mut stdout = io::stdout().lock();
        for message in publisher.messages() {
            let line = serde_json::json!({
                "topic": message.topic,
                "key": message.key,
                "value": message.json()?,
            });
            writeln!(stdout, "{line}")?;
        }
        return Ok(summary);
    }

    let kafka_config = KafkaPublisherConfig::new(&args.bootstrap_servers);
    let publisher: Arc<dyn MessagePublisher> = Arc::new(KafkaPublisher::new(&kafka_config)?);
    let producer = IngestionProducer::new(config, publisher)?;

    Ok(producer.fetch_and_publish(&cancel).await?)
}
