use super::account::{Account, BankCode, PixKey};
use crate::error::{RelayError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a positive monetary amount for transactions.
///
/// Ensures that transaction amounts are always positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(RelayError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = RelayError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

/// Store-assigned transaction identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub u64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Confirmed")]
    Confirmed,
    #[serde(alias = "Completed")]
    Completed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
        };
        f.write_str(status)
    }
}

/// A validated transaction that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub account_from: Account,
    pub amount: Amount,
    pub pix_key_to: PixKey,
    pub description: String,
}

impl TransactionDraft {
    pub fn new(
        account_from: Account,
        amount: Amount,
        pix_key_to: PixKey,
        description: impl Into<String>,
    ) -> Result<Self> {
        if account_from.id == pix_key_to.account.id {
            return Err(RelayError::ValidationError(
                "Source and destination accounts must differ".to_string(),
            ));
        }
        Ok(Self {
            account_from,
            amount,
            pix_key_to,
            description: description.into(),
        })
    }

    /// Binds the draft to its store-assigned id. New transactions start `Pending`.
    pub fn assign(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            account_from: self.account_from,
            amount: self.amount,
            pix_key_to: self.pix_key_to,
            description: self.description,
            status: TransactionStatus::Pending,
        }
    }
}

/// A persisted transaction with its relations resolved.
///
/// `status` only advances `Pending -> Confirmed -> Completed`; the other fields
/// are fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_from: Account,
    pub amount: Amount,
    pub pix_key_to: PixKey,
    pub description: String,
    pub status: TransactionStatus,
}

impl Transaction {
    pub fn confirm(&mut self) -> Result<()> {
        self.advance(TransactionStatus::Pending, TransactionStatus::Confirmed)
    }

    pub fn complete(&mut self) -> Result<()> {
        self.advance(TransactionStatus::Confirmed, TransactionStatus::Completed)
    }

    /// Payer's bank; confirmations are routed back to it.
    pub fn origin_bank(&self) -> &BankCode {
        &self.account_from.bank.code
    }

    /// Payee's bank; new transactions are routed to it.
    pub fn destination_bank(&self) -> &BankCode {
        self.pix_key_to.bank_code()
    }

    fn advance(&mut self, expected: TransactionStatus, next: TransactionStatus) -> Result<()> {
        if self.status != expected {
            return Err(RelayError::InvalidState {
                id: self.id,
                expected,
                actual: self.status,
            });
        }
        self.status = next;
        Ok(())
    }
}
