use super::account::{Account, AccountId, PixKey, PixKeyKind};
use super::transaction::{Transaction, TransactionDraft, TransactionId};
use crate::error::Result;
use async_trait::async_trait;

/// Directory of accounts and the pix keys bound to them.
#[async_trait]
pub trait PixKeyRepository: Send + Sync {
    async fn add_account(&self, account: Account) -> Result<()>;
    async fn find_account(&self, id: &AccountId) -> Result<Option<Account>>;
    async fn register_key(&self, key: PixKey) -> Result<()>;
    async fn find_key(&self, kind: PixKeyKind, key: &str) -> Result<Option<PixKey>>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Persists a new transaction and returns it with its assigned id.
    async fn register(&self, draft: TransactionDraft) -> Result<Transaction>;
    async fn save(&self, tx: &Transaction) -> Result<()>;
    async fn find(&self, id: TransactionId) -> Result<Option<Transaction>>;
}

/// Sends a payload to a named topic.
///
/// `publish` resolves only once the transport has acknowledged (or refused)
/// that specific payload.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, payload: &[u8], topic: &str, key: Option<&str>) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Sequential source of inbound messages. `Ok(None)` means the source is exhausted.
#[async_trait]
pub trait EventSource: Send {
    async fn next_message(&mut self) -> Result<Option<InboundMessage>>;
}

pub type PixKeyRepositoryBox = Box<dyn PixKeyRepository>;
pub type TransactionRepositoryBox = Box<dyn TransactionRepository>;
pub type EventPublisherBox = Box<dyn EventPublisher>;
