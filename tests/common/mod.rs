#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use launchpad_wallet::errors::{LaunchpadError, Result};
use launchpad_wallet::launch::{ConfirmationPolicy, PipelineOptions};
use launchpad_wallet::models::token::LaunchInput;
use launchpad_wallet::utils::rpc::{ChainRpc, ConfirmationStatus};
use launchpad_wallet::utils::transaction::ConfirmOptions;
use launchpad_wallet::wallet::{KeypairWallet, WalletAdapter};
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};

pub const RENT_LAMPORTS: u64 = 2_500_000;

/// How the mock ledger treats the Nth submission (1-based).
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub fail_submit_on: Option<usize>,
    pub reject_on: Option<usize>,
    pub never_confirm: bool,
}

/// In-memory ledger that records everything the pipeline asks of it.
#[derive(Default)]
pub struct MockRpc {
    script: Script,
    submitted: Mutex<Vec<Transaction>>,
    attempts: Mutex<usize>,
    rent_requests: Mutex<Vec<usize>>,
    status_polls: Mutex<Vec<Signature>>,
    rejected: Mutex<HashSet<Signature>>,
}

impl MockRpc {
    pub fn new() -> Arc<Self> {
        Arc::new(MockRpc::default())
    }

    pub fn scripted(script: Script) -> Arc<Self> {
        Arc::new(MockRpc {
            script,
            ..MockRpc::default()
        })
    }

    /// Transactions the ledger accepted, in order.
    pub fn submitted(&self) -> Vec<Transaction> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }

    pub fn rent_requests(&self) -> Vec<usize> {
        self.rent_requests.lock().unwrap().clone()
    }

    pub fn status_polls(&self) -> Vec<Signature> {
        self.status_polls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainRpc for MockRpc {
    async fn minimum_rent_exempt_balance(&self, data_len: usize) -> Result<u64> {
        self.rent_requests.lock().unwrap().push(data_len);
        Ok(RENT_LAMPORTS)
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        Ok(Hash::new_unique())
    }

    async fn submit_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            *attempts
        };
        if self.script.fail_submit_on == Some(attempt) {
            return Err(LaunchpadError::Rpc(
                "Attempt to debit an account but found no record of a prior credit.".to_string(),
            ));
        }
        transaction
            .verify()
            .map_err(|e| LaunchpadError::Transaction(format!("signature verification failed: {}", e)))?;

        let signature = transaction.signatures[0];
        if self.script.reject_on == Some(attempt) {
            self.rejected.lock().unwrap().insert(signature);
        }
        self.submitted.lock().unwrap().push(transaction.clone());
        Ok(signature)
    }

    async fn confirmation_status(&self, signature: &Signature) -> Result<ConfirmationStatus> {
        self.status_polls.lock().unwrap().push(*signature);
        if self.rejected.lock().unwrap().contains(signature) {
            return Ok(ConfirmationStatus::Failed(
                "Error processing Instruction 0: custom program error: 0x0".to_string(),
            ));
        }
        if self.script.never_confirm {
            return Ok(ConfirmationStatus::Pending);
        }
        Ok(ConfirmationStatus::Confirmed)
    }
}

/// A connected wallet whose user declines every signature request.
pub struct DecliningWallet {
    pub pubkey: Pubkey,
}

#[async_trait]
impl WalletAdapter for DecliningWallet {
    fn public_key(&self) -> Option<Pubkey> {
        Some(self.pubkey)
    }

    async fn sign_and_send(&self, _transaction: Transaction) -> Result<Signature> {
        Err(LaunchpadError::Signing("User rejected the request.".to_string()))
    }
}

pub fn connected_wallet(rpc: Arc<MockRpc>) -> (Arc<KeypairWallet>, Pubkey) {
    let keypair = Keypair::new();
    let owner = keypair.pubkey();
    let wallet = Arc::new(KeypairWallet::new(keypair, rpc));
    wallet.connect();
    (wallet, owner)
}

pub fn fast_options(policy: ConfirmationPolicy) -> PipelineOptions {
    PipelineOptions {
        confirmation_policy: policy,
        confirm: ConfirmOptions {
            max_attempts: 3,
            interval: Duration::from_millis(1),
        },
        priority_fee_micro_lamports: 0,
    }
}

pub fn demo_input() -> LaunchInput {
    LaunchInput {
        name: "Demo".to_string(),
        symbol: "DMO".to_string(),
        uri: "https://example.com/demo.json".to_string(),
        initial_supply: "1000".to_string(),
        decimals: "6".to_string(),
    }
}
