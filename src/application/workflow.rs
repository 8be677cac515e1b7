use crate::domain::account::{AccountId, PixKeyKind};
use crate::domain::ports::{PixKeyRepositoryBox, TransactionRepositoryBox};
use crate::domain::transaction::{Amount, Transaction, TransactionDraft, TransactionId};
use crate::error::{RelayError, Result};
use rust_decimal::Decimal;
use tracing::info;

/// Domain service driving a transaction through
/// `Pending -> Confirmed -> Completed`.
///
/// Built once at startup and shared by every handler invocation. Callers are
/// expected to serialize operations (the processor handles one event at a
/// time), so each operation is a plain load-check-save against the store.
pub struct TransactionWorkflow {
    pix_keys: PixKeyRepositoryBox,
    transactions: TransactionRepositoryBox,
}

impl TransactionWorkflow {
    pub fn new(pix_keys: PixKeyRepositoryBox, transactions: TransactionRepositoryBox) -> Self {
        Self {
            pix_keys,
            transactions,
        }
    }

    /// Persists a new `Pending` transaction from `account_id` to the account
    /// bound to the destination key.
    ///
    /// Fails with `ValidationError` for a non-positive amount or when payer and
    /// payee are the same account, and with `NotFound` when the payer account
    /// or the destination key is unknown.
    pub async fn register(
        &self,
        account_id: &str,
        amount: Decimal,
        pix_key_to: &str,
        pix_key_kind_to: PixKeyKind,
        description: &str,
    ) -> Result<Transaction> {
        let amount = Amount::new(amount)?;

        let account_from = self
            .pix_keys
            .find_account(&AccountId::new(account_id))
            .await?
            .ok_or_else(|| RelayError::NotFound(format!("account {account_id}")))?;

        let pix_key = self
            .pix_keys
            .find_key(pix_key_kind_to, pix_key_to)
            .await?
            .ok_or_else(|| {
                RelayError::NotFound(format!("pix key {pix_key_kind_to}:{pix_key_to}"))
            })?;

        let draft = TransactionDraft::new(account_from, amount, pix_key, description)?;
        let tx = self.transactions.register(draft).await?;

        info!(
            transaction_id = %tx.id,
            account_id = %tx.account_from.id,
            bank_code = %tx.destination_bank(),
            "Registered transaction"
        );
        Ok(tx)
    }

    pub async fn confirm(&self, id: TransactionId) -> Result<Transaction> {
        let mut tx = self.load(id).await?;
        tx.confirm()?;
        self.transactions.save(&tx).await?;

        info!(transaction_id = %id, "Confirmed transaction");
        Ok(tx)
    }

    pub async fn complete(&self, id: TransactionId) -> Result<Transaction> {
        let mut tx = self.load(id).await?;
        tx.complete()?;
        self.transactions.save(&tx).await?;

        info!(transaction_id = %id, "Completed transaction");
        Ok(tx)
    }

    async fn load(&self, id: TransactionId) -> Result<Transaction> {
        self.transactions
            .find(id)
            .await?
            .ok_or_else(|| RelayError::NotFound(format!("transaction {id}")))
    }
}
