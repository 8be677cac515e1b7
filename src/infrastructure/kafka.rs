use crate::domain::ports::{EventPublisher, EventSource, InboundMessage};
use crate::error::{RelayError, Result};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info};

fn transport_error(err: rdkafka::error::KafkaError) -> RelayError {
    RelayError::TransportError(err.to_string())
}

/// Consumer configuration shared by every relay instance of a group.
pub fn consumer_config(bootstrap_servers: &str, group_id: &str) -> ClientConfig {
    let mut config = ClientConfig::new();
    config
        .set("bootstrap.servers", bootstrap_servers)
        .set("group.id", group_id)
        .set("auto.offset.reset", "earliest")
        .set("enable.auto.commit", "true")
        .set("enable.partition.eof", "false");
    config
}

/// Producer configuration. `acks=all` so an acknowledgment means the event
/// reached every in-sync replica.
pub fn producer_config(bootstrap_servers: &str, delivery_timeout: Duration) -> ClientConfig {
    let mut config = ClientConfig::new();
    config
        .set("bootstrap.servers", bootstrap_servers)
        .set("acks", "all")
        .set("message.timeout.ms", delivery_timeout.as_millis().to_string());
    config
}

/// Reads inbound events from the creation and confirmation topics.
pub struct KafkaEventSource {
    consumer: StreamConsumer,
}

impl KafkaEventSource {
    pub fn new(bootstrap_servers: &str, group_id: &str, topics: &[&str]) -> Result<Self> {
        let consumer: StreamConsumer = consumer_config(bootstrap_servers, group_id)
            .create()
            .map_err(transport_error)?;
        consumer.subscribe(topics).map_err(transport_error)?;

        info!(topics = ?topics, group_id = %group_id, "Kafka consumer has been started");
        Ok(Self { consumer })
    }
}

#[async_trait]
impl EventSource for KafkaEventSource {
    async fn next_message(&mut self) -> Result<Option<InboundMessage>> {
        loop {
            let received = self.consumer.recv().await.map(|message| {
                debug!(
                    topic = %message.topic(),
                    partition = message.partition(),
                    offset = message.offset(),
                    "Received message"
                );
                InboundMessage {
                    topic: message.topic().to_string(),
                    payload: message.payload().map(<[u8]>::to_vec).unwrap_or_default(),
                }
            });

            match received {
                Ok(message) => return Ok(Some(message)),
                Err(e) => {
                    error!(error = %e, "Error receiving message from Kafka");
                    sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

/// Publishes events and waits for the broker's delivery report.
pub struct KafkaPublisher {
    producer: FutureProducer,
}

impl KafkaPublisher {
    pub fn new(bootstrap_servers: &str, delivery_timeout: Duration) -> Result<Self> {
        let producer: FutureProducer = producer_config(bootstrap_servers, delivery_timeout)
            .create()
            .map_err(transport_error)?;
        Ok(Self { producer })
    }
}

#[async_trait]
impl EventPublisher for KafkaPublisher {
    async fn publish(&self, payload: &[u8], topic: &str, key: Option<&str>) -> Result<()> {
        let mut record = FutureRecord::<str, [u8]>::to(topic).payload(payload);
        if let Some(key) = key {
            record = record.key(key);
        }

        match self.producer.send(record, Timeout::Never).await {
            Ok(_) => {
                debug!(topic = %topic, payload_size = payload.len(), "Delivery acknowledged");
                Ok(())
            }
            Err((err, _)) => Err(transport_error(err)),
        }
    }
}
