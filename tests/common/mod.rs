#![allow(dead_code)]

use async_trait::async_trait;
use pixrelay::application::processor::EventProcessor;
use pixrelay::application::routing::TopicRouter;
use pixrelay::application::workflow::TransactionWorkflow;
use pixrelay::domain::account::{Account, AccountId, Bank, BankCode, PixKey, PixKeyKind};
use pixrelay::domain::ports::{
    EventPublisher, EventPublisherBox, InboundMessage, PixKeyRepository, TransactionRepository,
};
use pixrelay::domain::transaction::{Amount, TransactionDraft, TransactionId};
use pixrelay::error::{RelayError, Result};
use pixrelay::infrastructure::in_memory::{InMemoryPixKeyStore, InMemoryTransactionStore};
use rust_decimal_macros::dec;
use serde_json::Value;
use std::sync::{Arc, Mutex};

pub const CREATION_TOPIC: &str = "transactions";
pub const CONFIRMATION_TOPIC: &str = "transaction_confirmation";

/// Id of the pending transaction every harness starts with (payer A1 @ 104).
pub const SEEDED_TX: TransactionId = TransactionId(7);

#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub topic: String,
    pub key: Option<String>,
    pub payload: Value,
}

#[derive(Default, Clone)]
pub struct RecordingPublisher {
    sent: Arc<Mutex<Vec<Published>>>,
}

impl RecordingPublisher {
    pub fn published(&self) -> Vec<Published> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, payload: &[u8], topic: &str, key: Option<&str>) -> Result<()> {
        let payload = serde_json::from_slice(payload).expect("published payload is JSON");
        self.sent.lock().unwrap().push(Published {
            topic: topic.to_string(),
            key: key.map(str::to_string),
            payload,
        });
        Ok(())
    }
}

pub struct FailingPublisher;

#[async_trait]
impl EventPublisher for FailingPublisher {
    async fn publish(&self, _payload: &[u8], topic: &str, _key: Option<&str>) -> Result<()> {
        Err(RelayError::TransportError(format!("{topic} is unreachable")))
    }
}

/// Never acknowledges.
pub struct StalledPublisher;

#[async_trait]
impl EventPublisher for StalledPublisher {
    async fn publish(&self, _payload: &[u8], _topic: &str, _key: Option<&str>) -> Result<()> {
        std::future::pending().await
    }
}

pub struct Harness {
    pub processor: EventProcessor,
    pub publisher: RecordingPublisher,
    pub pix_keys: InMemoryPixKeyStore,
    pub transactions: InMemoryTransactionStore,
}

pub fn account(id: &str, bank: &str) -> Account {
    Account {
        id: AccountId::new(id),
        number: format!("{id}-0001"),
        owner_name: format!("owner {id}"),
        bank: Bank {
            code: BankCode::new(bank).unwrap(),
            name: format!("bank {bank}"),
        },
    }
}

/// Registers `account` and binds `key` (email) to it.
pub async fn seed_key(pix_keys: &InMemoryPixKeyStore, account: Account, key: &str) {
    pix_keys.add_account(account.clone()).await.unwrap();
    pix_keys
        .register_key(PixKey::new(PixKeyKind::Email, key, account).unwrap())
        .await
        .unwrap();
}

/// Payer A1 banks at 104, payee B1 (key `x@y.com`) banks at 033, and
/// transaction 7 from A1 to B1 is pending.
pub async fn seed(pix_keys: &InMemoryPixKeyStore, transactions: &InMemoryTransactionStore) {
    let payer = account("A1", "104");
    let payee = account("B1", "033");
    pix_keys.add_account(payer.clone()).await.unwrap();
    seed_key(pix_keys, payee.clone(), "x@y.com").await;

    let key = PixKey::new(PixKeyKind::Email, "x@y.com", payee).unwrap();
    let draft = TransactionDraft::new(payer, Amount::new(dec!(100)).unwrap(), key, "rent").unwrap();
    transactions.save(&draft.assign(SEEDED_TX)).await.unwrap();
}

pub async fn processor_with(
    publisher: EventPublisherBox,
) -> (EventProcessor, InMemoryPixKeyStore, InMemoryTransactionStore) {
    let pix_keys = InMemoryPixKeyStore::new();
    let transactions = InMemoryTransactionStore::new();
    seed(&pix_keys, &transactions).await;

    let workflow = TransactionWorkflow::new(Box::new(pix_keys.clone()), Box::new(transactions.clone()));
    let processor = EventProcessor::new(
        workflow,
        publisher,
        TopicRouter::new(CREATION_TOPIC, CONFIRMATION_TOPIC),
    );
    (processor, pix_keys, transactions)
}

pub async fn harness() -> Harness {
    let publisher = RecordingPublisher::default();
    let (processor, pix_keys, transactions) = processor_with(Box::new(publisher.clone())).await;
    Harness {
        processor,
        publisher,
        pix_keys,
        transactions,
    }
}

pub fn message(topic: &str, payload: Value) -> InboundMessage {
    InboundMessage {
        topic: topic.to_string(),
        payload: serde_json::to_vec(&payload).unwrap(),
    }
}
