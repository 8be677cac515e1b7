use super::routing::{InboundTopic, TopicRouter, bank_topic};
use super::workflow::TransactionWorkflow;
use crate::domain::event::{TransactionEvent, Verbatim};
use crate::domain::ports::{EventPublisherBox, EventSource, InboundMessage};
use crate::domain::transaction::{TransactionId, TransactionStatus};
use crate::error::{RelayError, Result};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// What happened to a single inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// A derived event was acknowledged on `topic`.
    Published {
        topic: String,
        transaction_id: TransactionId,
    },
    /// The transaction reached its terminal state; nothing is routed.
    Completed(TransactionId),
    /// Acknowledged without action.
    Ignored,
    /// Processing failed; the error was logged and the message discarded.
    Dropped,
}

/// Routes inbound events to the transaction workflow and publishes the
/// derived events to the per-bank topics.
///
/// Messages are handled one at a time: an outbound event is only published
/// after the state transition it reports has been saved, and the next message
/// is not pulled until the publisher has acknowledged (or the delivery timeout
/// has expired).
pub struct EventProcessor {
    workflow: TransactionWorkflow,
    publisher: EventPublisherBox,
    topics: TopicRouter,
    delivery_timeout: Duration,
}

impl EventProcessor {
    pub fn new(
        workflow: TransactionWorkflow,
        publisher: EventPublisherBox,
        topics: TopicRouter,
    ) -> Self {
        Self {
            workflow,
            publisher,
            topics,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }

    pub fn with_delivery_timeout(mut self, delivery_timeout: Duration) -> Self {
        self.delivery_timeout = delivery_timeout;
        self
    }

    /// Consumes `source` until it is exhausted.
    ///
    /// Failures while handling a message never stop the loop; only an error
    /// from the source itself is returned.
    pub async fn run(&self, source: &mut dyn EventSource) -> Result<()> {
        info!("Event processor has been started");
        while let Some(message) = source.next_message().await? {
            self.process_message(&message).await;
        }
        info!("Event source exhausted, stopping");
        Ok(())
    }

    /// Handles one message, logging and dropping it on failure.
    pub async fn process_message(&self, message: &InboundMessage) -> Disposition {
        match self.handle(message).await {
            Ok(disposition) => disposition,
            Err(e) => {
                error!(topic = %message.topic, error = %e, "Dropping event");
                Disposition::Dropped
            }
        }
    }

    pub async fn handle(&self, message: &InboundMessage) -> Result<Disposition> {
        match self.topics.classify(&message.topic) {
            InboundTopic::Creation => self.process_transaction(&message.payload).await,
            InboundTopic::Confirmation => self.process_confirmation(&message.payload).await,
            InboundTopic::Unknown => {
                warn!(
                    topic = %message.topic,
                    payload = %String::from_utf8_lossy(&message.payload),
                    "Not a valid topic"
                );
                Ok(Disposition::Ignored)
            }
        }
    }

    async fn process_transaction(&self, payload: &[u8]) -> Result<Disposition> {
        let mut event = TransactionEvent::decode(payload)?;
        let request = event.creation_request()?;

        let created = self
            .workflow
            .register(
                &request.account_id,
                request.amount,
                &request.pix_key_to,
                request.pix_key_kind_to,
                &request.description,
            )
            .await?;

        // Payee's bank learns about the new transaction.
        let topic = bank_topic(created.destination_bank());
        event.id = Some(created.id);
        event.status = Some(Verbatim::new(TransactionStatus::Pending)?);
        self.publish(&event, &topic, created.id).await?;

        Ok(Disposition::Published {
            topic,
            transaction_id: created.id,
        })
    }

    async fn process_confirmation(&self, payload: &[u8]) -> Result<Disposition> {
        let event = TransactionEvent::decode(payload)?;

        match event.status() {
            Some(TransactionStatus::Confirmed) => self.confirm_transaction(&event).await,
            Some(TransactionStatus::Completed) => self.complete_transaction(&event).await,
            status => {
                debug!(
                    transaction_id = ?event.id,
                    status = ?status,
                    "Confirmation event carries no actionable status, ignoring"
                );
                Ok(Disposition::Ignored)
            }
        }
    }

    async fn confirm_transaction(&self, event: &TransactionEvent) -> Result<Disposition> {
        let id = event.transaction_id()?;
        let confirmed = self.workflow.confirm(id).await?;

        // Payer's bank learns the payee accepted; the inbound event is forwarded as is.
        let topic = bank_topic(confirmed.origin_bank());
        self.publish(event, &topic, id).await?;

        Ok(Disposition::Published {
            topic,
            transaction_id: id,
        })
    }

    async fn complete_transaction(&self, event: &TransactionEvent) -> Result<Disposition> {
        let id = event.transaction_id()?;

        match self.workflow.complete(id).await {
            Ok(_) => Ok(Disposition::Completed(id)),
            Err(RelayError::InvalidState {
                actual: TransactionStatus::Completed,
                ..
            }) => {
                info!(transaction_id = %id, "Transaction already completed, ignoring redelivery");
                Ok(Disposition::Ignored)
            }
            Err(e) => Err(e),
        }
    }

    async fn publish(&self, event: &TransactionEvent, topic: &str, id: TransactionId) -> Result<()> {
        let payload = event.encode()?;
        let key = id.to_string();
        let delivery = self.publisher.publish(&payload, topic, Some(&key));

        match tokio::time::timeout(self.delivery_timeout, delivery).await {
            Ok(Ok(())) => {
                info!(transaction_id = %id, topic = %topic, "Published event");
                Ok(())
            }
            Ok(Err(e)) => {
                // The transition is already saved; the receiving bank will not hear about it.
                error!(
                    transaction_id = %id,
                    topic = %topic,
                    error = %e,
                    "Failed to publish event after state transition"
                );
                Err(e)
            }
            Err(_) => {
                error!(
                    transaction_id = %id,
                    topic = %topic,
                    timeout_ms = self.delivery_timeout.as_millis() as u64,
                    "Timed out waiting for delivery acknowledgment after state transition"
                );
                Err(RelayError::TransportError(format!(
                    "no delivery acknowledgment from {topic} within {:?}",
                    self.delivery_timeout
                )))
            }
        }
    }
}
