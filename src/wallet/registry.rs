//! Session-scoped bookkeeping of derived accounts.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::errors::{LaunchpadError, Result};
use crate::models::wallet::Account;
use crate::wallet::derivation::{ChainKind, DerivedKeypair, KeyDerivationEngine};
use crate::wallet::mnemonic::Seed;

#[derive(Debug, Default)]
struct RegistryState {
    counters: HashMap<ChainKind, u32>,
    accounts: Vec<Account>,
}

impl RegistryState {
    fn next_index(&mut self, chain: ChainKind) -> Result<u32> {
        let counter = self.counters.entry(chain).or_insert(0);
        let index = *counter;
        *counter = counter.checked_add(1).ok_or_else(|| {
            LaunchpadError::InvalidPath(format!("{} account indices exhausted", chain))
        })?;
        Ok(index)
    }

    fn register(&mut self, account: Account) -> Result<()> {
        let duplicate = self
            .accounts
            .iter()
            .any(|a| a.chain == account.chain && a.derivation_index == account.derivation_index);
        if duplicate {
            return Err(LaunchpadError::Invariant(format!(
                "{} index {} is already registered",
                account.chain, account.derivation_index
            )));
        }
        self.accounts.push(account);
        Ok(())
    }

    fn count_for(&self, chain: ChainKind) -> usize {
        self.accounts.iter().filter(|a| a.chain == chain).count()
    }
}

/// Hands out strictly increasing per-chain derivation indices and keeps the
/// derived accounts in insertion order. There is no removal operation, so an
/// index is never handed out twice.
#[derive(Debug, Default)]
pub struct AccountRegistry {
    state: Mutex<RegistryState>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        AccountRegistry::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, RegistryState>> {
        self.state
            .lock()
            .map_err(|_| LaunchpadError::Invariant("account registry lock poisoned".to_string()))
    }

    /// Returns the current counter for `chain` and advances it. Starts at 0.
    pub fn next_index(&self, chain: ChainKind) -> Result<u32> {
        self.lock()?.next_index(chain)
    }

    pub fn register(&self, account: Account) -> Result<()> {
        self.lock()?.register(account)
    }

    /// Reserves the next index, derives the keypair and registers the
    /// account while holding the registry lock, so concurrent callers for
    /// the same chain cannot interleave.
    pub fn derive_next(
        &self,
        engine: &KeyDerivationEngine,
        seed: &Seed,
        chain: ChainKind,
    ) -> Result<(Account, DerivedKeypair)> {
        let mut state = self.lock()?;
        let index = state.next_index(chain)?;
        let keypair = engine.derive_keypair(seed, chain, index)?;

        let account = Account {
            id: Uuid::new_v4(),
            chain,
            address: keypair.address(),
            derivation_index: index,
            derivation_path: keypair.path().to_string(),
            display_name: format!("{} Account {}", chain.label(), state.count_for(chain) + 1),
            created_at: Utc::now(),
        };
        state.register(account.clone())?;
        info!("Created {} ({})", account.display_name, account.address);
        Ok((account, keypair))
    }

    pub fn accounts(&self) -> Result<Vec<Account>> {
        Ok(self.lock()?.accounts.clone())
    }

    pub fn accounts_for(&self, chain: ChainKind) -> Result<Vec<Account>> {
        Ok(self
            .lock()?
            .accounts
            .iter()
            .filter(|a| a.chain == chain)
            .cloned()
            .collect())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.accounts.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
