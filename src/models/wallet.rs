use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::wallet::derivation::ChainKind;

/// A derived account as the session knows it. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub chain: ChainKind,
    /// Base58 for Solana, EIP-55 hex for Ethereum.
    pub address: String,
    pub derivation_index: u32,
    pub derivation_path: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.display_name, self.derivation_path, self.address)
    }
}

/// Flat export row used by `accounts --json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub name: String,
    pub chain: String,
    pub index: u32,
    pub path: String,
    pub address: String,
}

impl From<&Account> for AccountRecord {
    fn from(account: &Account) -> Self {
        AccountRecord {
            name: account.display_name.clone(),
            chain: account.chain.ticker().to_string(),
            index: account.derivation_index,
            path: account.derivation_path.clone(),
            address: account.address.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountExport {
    pub accounts: Vec<AccountRecord>,
}
