//! SLIP-10 ed25519 derivation for Solana accounts.

use std::fmt;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};

use crate::errors::{LaunchpadError, Result};
use crate::wallet::derivation::{
    ChainKind, DerivationPath, DerivationStrategy, DerivedKeypair, ExtendedKey,
};
use crate::wallet::mnemonic::Seed;

const ED25519_CURVE_KEY: &[u8] = b"ed25519 seed";

/// ed25519 has no public-only child derivation, so every segment must be
/// hardened.
pub struct Ed25519Strategy;

impl Ed25519Strategy {
    /// Walks `path` from the SLIP-10 master key and returns the 32-byte
    /// private seed of the final node.
    pub(crate) fn derive_private_seed(seed: &[u8], path: &DerivationPath) -> Result<[u8; 32]> {
        let mut node = ExtendedKey::from_hmac(ED25519_CURVE_KEY, &[seed])?;
        for child in path.segments() {
            if !child.is_hardened() {
                return Err(LaunchpadError::InvalidPath(format!(
                    "ed25519 derivation requires hardened segments, got {} in {}",
                    child, path
                )));
            }
            node = ExtendedKey::from_hmac(
                &node.chain_code,
                &[&[0u8][..], &node.key[..], &child.to_u32().to_be_bytes()[..]],
            )?;
        }
        Ok(node.key)
    }
}

impl DerivationStrategy for Ed25519Strategy {
    fn chain(&self) -> ChainKind {
        ChainKind::Solana
    }

    fn derive(&self, seed: &Seed, path: &DerivationPath) -> Result<DerivedKeypair> {
        let private_seed = Self::derive_private_seed(seed.as_bytes(), path)?;
        let keypair = keypair_from_ed25519_seed(&private_seed)?;
        Ok(DerivedKeypair::Solana(SolanaKeypair {
            keypair,
            path: path.clone(),
        }))
    }
}

/// Standard ed25519 keypair-from-seed expansion, wrapped as a Solana keypair.
pub fn keypair_from_ed25519_seed(seed: &[u8; 32]) -> Result<Keypair> {
    let secret = ed25519_dalek::SecretKey::from_bytes(seed)
        .map_err(|e| LaunchpadError::DerivationFailure(e.to_string()))?;
    let public = ed25519_dalek::PublicKey::from(&secret);
    let dalek = ed25519_dalek::Keypair { secret, public };
    Keypair::from_bytes(&dalek.to_bytes())
        .map_err(|e| LaunchpadError::DerivationFailure(e.to_string()))
}

pub struct SolanaKeypair {
    pub(crate) keypair: Keypair,
    pub(crate) path: DerivationPath,
}

impl SolanaKeypair {
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn address_bytes(&self) -> [u8; 32] {
        self.keypair.pubkey().to_bytes()
    }

    /// Base58 account address.
    pub fn address(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    /// First 32 bytes of the 64-byte Solana secret key layout.
    pub fn secret_bytes(&self) -> [u8; 32] {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&self.keypair.to_bytes()[..32]);
        secret
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    pub fn into_keypair(self) -> Keypair {
        self.keypair
    }
}

impl fmt::Debug for SolanaKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolanaKeypair")
            .field("pubkey", &self.pubkey())
            .field("path", &self.path.to_string())
            .finish()
    }
}
