use crate::domain::account::{Account, AccountId, Bank, BankCode, PixKey, PixKeyKind};
use crate::domain::ports::PixKeyRepository;
use crate::error::{RelayError, Result};
use serde::Deserialize;
use std::io::Read;
use tracing::{info, warn};

/// One row of the pix key directory: a key and the account/bank it is bound to.
///
/// Rows with empty `kind` and `key` columns register the account only.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct PixKeyRecord {
    pub bank_code: String,
    pub bank_name: String,
    pub account_id: String,
    pub account_number: String,
    pub owner_name: String,
    pub kind: Option<PixKeyKind>,
    pub key: Option<String>,
}

impl PixKeyRecord {
    pub fn account(&self) -> Result<Account> {
        Ok(Account {
            id: AccountId::new(self.account_id.clone()),
            number: self.account_number.clone(),
            owner_name: self.owner_name.clone(),
            bank: Bank {
                code: BankCode::new(self.bank_code.clone())?,
                name: self.bank_name.clone(),
            },
        })
    }

    pub fn pix_key(&self) -> Result<Option<PixKey>> {
        match (self.kind, &self.key) {
            (Some(kind), Some(key)) => PixKey::new(kind, key.clone(), self.account()?).map(Some),
            (None, None) => Ok(None),
            _ => Err(RelayError::ValidationError(format!(
                "account {} has a pix key kind without a key or the reverse",
                self.account_id
            ))),
        }
    }
}

/// Reads the pix key directory from a CSV source.
///
/// Whitespace around fields is trimmed.
pub struct PixKeyReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> PixKeyReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes directory rows.
    pub fn records(self) -> impl Iterator<Item = Result<PixKeyRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(RelayError::from))
    }
}

/// Loads every valid row into `repository`, skipping malformed ones.
///
/// Returns the number of rows loaded.
pub async fn load_directory<R: Read>(
    reader: PixKeyReader<R>,
    repository: &dyn PixKeyRepository,
) -> Result<usize> {
    let mut loaded = 0;
    for record in reader.records() {
        let parsed = record.and_then(|record| Ok((record.account()?, record.pix_key()?)));
        let (account, pix_key) = match parsed {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Skipping pix key row");
                continue;
            }
        };

        repository.add_account(account).await?;
        if let Some(pix_key) = pix_key {
            repository.register_key(pix_key).await?;
        }
        loaded += 1;
    }

    info!(rows = loaded, "Loaded pix key directory");
    Ok(loaded)
}
