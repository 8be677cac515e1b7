use crate::domain::account::{Account, AccountId, PixKey, PixKeyKind};
use crate::domain::ports::{PixKeyRepository, TransactionRepository};
use crate::domain::transaction::{Transaction, TransactionDraft, TransactionId};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A thread-safe in-memory directory of accounts and pix keys.
///
/// Keys are indexed by `(kind, value)`, so the same value may be registered
/// under different kinds.
#[derive(Default, Clone)]
pub struct InMemoryPixKeyStore {
    accounts: Arc<RwLock<HashMap<AccountId, Account>>>,
    keys: Arc<RwLock<HashMap<(PixKeyKind, String), PixKey>>>,
}

impl InMemoryPixKeyStore {
    /// Creates a new, empty in-memory directory.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PixKeyRepository for InMemoryPixKeyStore {
    async fn add_account(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.id.clone(), account);
        Ok(())
    }

    async fn find_account(&self, id: &AccountId) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(id).cloned())
    }

    async fn register_key(&self, key: PixKey) -> Result<()> {
        let mut keys = self.keys.write().await;
        keys.insert((key.kind, key.key.clone()), key);
        Ok(())
    }

    async fn find_key(&self, kind: PixKeyKind, key: &str) -> Result<Option<PixKey>> {
        let keys = self.keys.read().await;
        Ok(keys.get(&(kind, key.to_string())).cloned())
    }
}

/// A thread-safe in-memory store for transactions.
///
/// Ids are assigned from a counter starting at 1.
#[derive(Default, Clone)]
pub struct InMemoryTransactionStore {
    transactions: Arc<RwLock<HashMap<TransactionId, Transaction>>>,
    last_id: Arc<AtomicU64>,
}

impl InMemoryTransactionStore {
    /// Creates a new, empty in-memory transaction store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionStore {
    async fn register(&self, draft: TransactionDraft) -> Result<Transaction> {
        let id = TransactionId(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        let tx = draft.assign(id);
        let mut transactions = self.transactions.write().await;
        transactions.insert(id, tx.clone());
        Ok(tx)
    }

    async fn save(&self, tx: &Transaction) -> Result<()> {
        let mut transactions = self.transactions.write().await;
        transactions.insert(tx.id, tx.clone());
        Ok(())
    }

    async fn find(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions.get(&id).cloned())
    }
}
