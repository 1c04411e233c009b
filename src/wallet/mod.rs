use crate::config::Config;
use crate::errors::{LaunchpadError, Result};
use log::{info, warn};
use solana_sdk::signature::{Keypair, SeedDerivable};
use std::fs;
use std::path::Path;

pub mod adapter;
pub mod derivation;
pub mod ethereum;
pub mod mnemonic;
pub mod registry;
pub mod solana;

pub use adapter::{KeypairWallet, WalletAdapter, WalletConnectionState};
pub use derivation::{ChainKind, DerivationPath, DerivedKeypair, KeyDerivationEngine};
pub use mnemonic::{Mnemonic, MnemonicManager, Seed};
pub use registry::AccountRegistry;

/// Loads the launch wallet: the base58 key from config wins, then the
/// keypair file.
pub fn load_wallet_keypair(config: &Config) -> Result<Keypair> {
    if let Some(private_key) = config.wallet_private_key.as_deref().filter(|k| !k.is_empty()) {
        info!("Loading wallet keypair from LAUNCHPAD_WALLET_KEYPAIR...");
        return keypair_from_base58(private_key);
    }
    if let Some(path) = config.wallet_keypair_path.as_deref().filter(|p| !p.is_empty()) {
        info!("Loading wallet keypair from {}", path);
        return read_keypair_json(Path::new(path));
    }
    warn!("No wallet keypair configured (LAUNCHPAD_WALLET_KEYPAIR or LAUNCHPAD_WALLET_KEYPAIR_PATH).");
    Err(LaunchpadError::WalletNotConnected)
}

/// Accepts a 32-byte secret seed or a full 64-byte keypair, base58 encoded.
pub fn keypair_from_base58(private_key: &str) -> Result<Keypair> {
    let decoded = bs58::decode(private_key.trim()).into_vec()?;
    match decoded.len() {
        32 => {
            let mut seed = [0u8; 32];
            seed.copy_from_slice(&decoded);
            Keypair::from_seed(&seed).map_err(|e| {
                LaunchpadError::Wallet(format!("Failed to create keypair from 32-byte seed: {}", e))
            })
        }
        64 => Keypair::from_bytes(&decoded).map_err(|e| {
            LaunchpadError::Wallet(format!("Failed to create keypair from 64-byte array: {}", e))
        }),
        other => Err(LaunchpadError::Wallet(format!(
            "Decoded private key has unexpected length: {}. Expected 32 or 64 bytes.",
            other
        ))),
    }
}

/// Reads a solana-cli style keypair file (JSON array of 64 bytes).
pub fn read_keypair_json(path: &Path) -> Result<Keypair> {
    let contents = fs::read_to_string(path).map_err(|e| {
        LaunchpadError::Wallet(format!("Failed to read keypair file '{}': {}", path.display(), e))
    })?;
    let bytes: Vec<u8> = serde_json::from_str(&contents)?;
    Keypair::from_bytes(&bytes).map_err(|e| {
        LaunchpadError::Wallet(format!("Invalid keypair file '{}': {}", path.display(), e))
    })
}
