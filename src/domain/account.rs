use crate::error::{RelayError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a financial institution. Outbound topics are derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BankCode(String);

impl BankCode {
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(RelayError::ValidationError(
                "Bank code must not be empty".to_string(),
            ));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BankCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    pub code: BankCode,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bank account, always bound to exactly one bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub number: String,
    pub owner_name: String,
    pub bank: Bank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixKeyKind {
    Email,
    Phone,
    #[serde(alias = "cpf")]
    Document,
    Random,
}

impl fmt::Display for PixKeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Document => "document",
            Self::Random => "random",
        };
        f.write_str(kind)
    }
}

/// An alias (key value + kind) bound to exactly one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixKey {
    pub kind: PixKeyKind,
    pub key: String,
    pub account: Account,
}

impl PixKey {
    pub fn new(kind: PixKeyKind, key: impl Into<String>, account: Account) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(RelayError::ValidationError(
                "Pix key value must not be empty".to_string(),
            ));
        }
        Ok(Self { kind, key, account })
    }

    /// Bank that receives payments addressed to this key.
    pub fn bank_code(&self) -> &BankCode {
        &self.account.bank.code
    }
}
