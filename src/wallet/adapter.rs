//! The signing and broadcast capability the launch pipeline runs against.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use log::{debug, info};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};

use crate::errors::{LaunchpadError, Result};
use crate::utils::rpc::ChainRpc;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WalletConnectionState {
    #[default]
    Disconnected,
    Connected(Pubkey),
    Error(String),
}

/// An externally controlled chain identity. The pipeline never sees the
/// wallet's secret; it hands over a transaction that other signers may have
/// already partially signed and gets back the broadcast signature.
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// `None` while disconnected.
    fn public_key(&self) -> Option<Pubkey>;

    fn is_connected(&self) -> bool {
        self.public_key().is_some()
    }

    async fn sign_and_send(&self, transaction: Transaction) -> Result<Signature>;
}

/// A wallet backed by a local keypair that broadcasts through a [`ChainRpc`].
pub struct KeypairWallet {
    keypair: Keypair,
    rpc: Arc<dyn ChainRpc>,
    state: RwLock<WalletConnectionState>,
}

impl KeypairWallet {
    /// Starts out disconnected; call [`KeypairWallet::connect`] first.
    pub fn new(keypair: Keypair, rpc: Arc<dyn ChainRpc>) -> Self {
        KeypairWallet {
            keypair,
            rpc,
            state: RwLock::new(WalletConnectionState::Disconnected),
        }
    }

    pub fn connect(&self) -> WalletConnectionState {
        let connected = WalletConnectionState::Connected(self.keypair.pubkey());
        self.set_state(connected.clone());
        info!("Wallet connected: {}", self.keypair.pubkey());
        connected
    }

    pub fn disconnect(&self) {
        self.set_state(WalletConnectionState::Disconnected);
        info!("Wallet disconnected");
    }

    pub fn state(&self) -> WalletConnectionState {
        match self.state.read() {
            Ok(state) => state.clone(),
            Err(_) => WalletConnectionState::Error("wallet state lock poisoned".to_string()),
        }
    }

    fn set_state(&self, next: WalletConnectionState) {
        match self.state.write() {
            Ok(mut state) => *state = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

#[async_trait]
impl WalletAdapter for KeypairWallet {
    fn public_key(&self) -> Option<Pubkey> {
        match self.state() {
            WalletConnectionState::Connected(pubkey) => Some(pubkey),
            _ => None,
        }
    }

    async fn sign_and_send(&self, mut transaction: Transaction) -> Result<Signature> {
        if !self.is_connected() {
            return Err(LaunchpadError::WalletNotConnected);
        }
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| LaunchpadError::Signing(format!("Wallet failed to sign: {}", e)))?;
        if !transaction.is_signed() {
            return Err(LaunchpadError::Signing(
                "Transaction is missing required signatures".to_string(),
            ));
        }
        debug!("Wallet signed transaction, submitting...");
        self.rpc.submit_transaction(&transaction).await
    }
}
