use crate::domain::account::{Account, AccountId, PixKey, PixKeyKind};
use crate::domain::ports::{PixKeyRepository, TransactionRepository};
use crate::domain::transaction::{Transaction, TransactionDraft, TransactionId};
use crate::error::{RelayError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing accounts and their banks.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column Family for storing pix keys, keyed by `kind:value`.
pub const CF_PIX_KEYS: &str = "pix_keys";
/// Column Family for storing transactions, keyed by big-endian id.
pub const CF_TRANSACTIONS: &str = "transactions";

/// A persistent store implementation using RocksDB.
///
/// Implements both repositories over separate Column Families. Values are
/// JSON documents. Transaction ids are big-endian so the last key in
/// `transactions` is always the highest id assigned.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    sequence: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_ACCOUNTS, CF_PIX_KEYS, CF_TRANSACTIONS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self {
            db: Arc::new(db),
            sequence: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            RelayError::InternalError(Box::new(std::io::Error::other(format!(
                "Column family {name} not found"
            ))))
        })
    }

    fn put<T: Serialize>(&self, cf: &str, key: &[u8], value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value).map_err(|e| RelayError::InternalError(Box::new(e)))?;
        self.db.put_cf(self.cf(cf)?, key, bytes)?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>> {
        match self.db.get_cf(self.cf(cf)?, key)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| RelayError::InternalError(Box::new(e))),
            None => Ok(None),
        }
    }

    fn last_transaction_id(&self) -> Result<u64> {
        let mut iter = self.db.iterator_cf(self.cf(CF_TRANSACTIONS)?, IteratorMode::End);
        match iter.next() {
            Some(item) => {
                let (key, _) = item?;
                let bytes: [u8; 8] = key.as_ref().try_into().map_err(|_| {
                    RelayError::InternalError(Box::new(std::io::Error::other(
                        "Malformed transaction key",
                    )))
                })?;
                Ok(u64::from_be_bytes(bytes))
            }
            None => Ok(0),
        }
    }
}

fn pix_key_id(kind: PixKeyKind, key: &str) -> Vec<u8> {
    format!("{kind}:{key}").into_bytes()
}

#[async_trait]
impl PixKeyRepository for RocksDBStore {
    async fn add_account(&self, account: Account) -> Result<()> {
        self.put(CF_ACCOUNTS, account.id.as_str().as_bytes(), &account)
    }

    async fn find_account(&self, id: &AccountId) -> Result<Option<Account>> {
        self.get(CF_ACCOUNTS, id.as_str().as_bytes())
    }

    async fn register_key(&self, key: PixKey) -> Result<()> {
        self.put(CF_PIX_KEYS, &pix_key_id(key.kind, &key.key), &key)
    }

    async fn find_key(&self, kind: PixKeyKind, key: &str) -> Result<Option<PixKey>> {
        self.get(CF_PIX_KEYS, &pix_key_id(kind, key))
    }
}

#[async_trait]
impl TransactionRepository for RocksDBStore {
    async fn register(&self, draft: TransactionDraft) -> Result<Transaction> {
        let _guard = self.sequence.lock().await;
        let id = TransactionId(self.last_transaction_id()? + 1);
        let tx = draft.assign(id);
        self.put(CF_TRANSACTIONS, &id.0.to_be_bytes(), &tx)?;
        Ok(tx)
    }

    async fn save(&self, tx: &Transaction) -> Result<()> {
        self.put(CF_TRANSACTIONS, &tx.id.0.to_be_bytes(), tx)
    }

    async fn find(&self, id: TransactionId) -> Result<Option<Transaction>> {
        self.get(CF_TRANSACTIONS, &id.0.to_be_bytes())
    }
}
