//! Hierarchical key derivation shared by every supported chain.
//!
//! Each [`ChainKind`] maps to a fixed BIP44 coin type and to a stateless
//! [`DerivationStrategy`]. Adding a chain means adding a variant and a
//! strategy; the engine itself never branches on chain-specific details.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::Sha512;

use crate::errors::{LaunchpadError, Result};
use crate::wallet::ethereum::{EthereumKeypair, Secp256k1Strategy};
use crate::wallet::mnemonic::Seed;
use crate::wallet::solana::{Ed25519Strategy, SolanaKeypair};

pub const HARDENED_OFFSET: u32 = 0x8000_0000;
pub const BIP44_PURPOSE: u32 = 44;

pub(crate) type HmacSha512 = Hmac<Sha512>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ChainKind {
    Solana,
    Ethereum,
}

impl ChainKind {
    pub const ALL: [ChainKind; 2] = [ChainKind::Solana, ChainKind::Ethereum];

    /// SLIP-44 registered coin type.
    pub fn coin_type(self) -> u32 {
        match self {
            ChainKind::Solana => 501,
            ChainKind::Ethereum => 60,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChainKind::Solana => "Solana",
            ChainKind::Ethereum => "Ethereum",
        }
    }

    pub fn ticker(self) -> &'static str {
        match self {
            ChainKind::Solana => "SOL",
            ChainKind::Ethereum => "ETH",
        }
    }

    pub fn strategy(self) -> &'static dyn DerivationStrategy {
        match self {
            ChainKind::Solana => &Ed25519Strategy,
            ChainKind::Ethereum => &Secp256k1Strategy,
        }
    }
}

impl fmt::Display for ChainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ChainKind {
    type Err = LaunchpadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "solana" | "sol" => Ok(ChainKind::Solana),
            "ethereum" | "eth" => Ok(ChainKind::Ethereum),
            other => Err(LaunchpadError::Config(format!("Unknown chain: {}", other))),
        }
    }
}

/// One segment of a BIP32 path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildNumber {
    Normal(u32),
    Hardened(u32),
}

impl ChildNumber {
    pub fn hardened(index: u32) -> Result<Self> {
        if index >= HARDENED_OFFSET {
            return Err(LaunchpadError::InvalidPath(format!(
                "index {} exceeds the hardened range",
                index
            )));
        }
        Ok(ChildNumber::Hardened(index))
    }

    pub fn normal(index: u32) -> Result<Self> {
        if index >= HARDENED_OFFSET {
            return Err(LaunchpadError::InvalidPath(format!(
                "index {} exceeds the non-hardened range",
                index
            )));
        }
        Ok(ChildNumber::Normal(index))
    }

    pub fn is_hardened(self) -> bool {
        matches!(self, ChildNumber::Hardened(_))
    }

    /// The 32-bit value fed into child-key HMACs.
    pub fn to_u32(self) -> u32 {
        match self {
            ChildNumber::Normal(i) => i,
            ChildNumber::Hardened(i) => i | HARDENED_OFFSET,
        }
    }
}

impl fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildNumber::Normal(i) => write!(f, "{}", i),
            ChildNumber::Hardened(i) => write!(f, "{}'", i),
        }
    }
}

/// A BIP32 derivation path such as `m/44'/501'/0'/0'`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    segments: Vec<ChildNumber>,
}

impl DerivationPath {
    pub fn new(segments: Vec<ChildNumber>) -> Self {
        DerivationPath { segments }
    }

    /// `m/44'/{coin}'/{index}'/0'` with every component hardened, the
    /// layout both supported chains use for per-account keys.
    pub fn bip44(chain: ChainKind, index: u32) -> Result<Self> {
        Ok(DerivationPath {
            segments: vec![
                ChildNumber::hardened(BIP44_PURPOSE)?,
                ChildNumber::hardened(chain.coin_type())?,
                ChildNumber::hardened(index)?,
                ChildNumber::hardened(0)?,
            ],
        })
    }

    /// Same as [`bip44`](Self::bip44) for callers holding a signed index
    /// (user input); negative values are rejected.
    pub fn bip44_checked(chain: ChainKind, index: i64) -> Result<Self> {
        let index = u32::try_from(index).map_err(|_| {
            LaunchpadError::InvalidPath(format!("account index {} is out of range", index))
        })?;
        Self::bip44(chain, index)
    }

    pub fn segments(&self) -> &[ChildNumber] {
        &self.segments
    }

    pub fn is_fully_hardened(&self) -> bool {
        self.segments.iter().all(|c| c.is_hardened())
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = LaunchpadError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('/');
        match parts.next() {
            Some("m") | Some("M") => {}
            _ => {
                return Err(LaunchpadError::InvalidPath(format!(
                    "path '{}' must start with 'm'",
                    s
                )))
            }
        }

        let mut segments = Vec::new();
        for part in parts {
            let (digits, hardened) = match part.strip_suffix('\'').or_else(|| part.strip_suffix('h')) {
                Some(digits) => (digits, true),
                None => (part, false),
            };
            let index: u32 = digits.parse().map_err(|_| {
                LaunchpadError::InvalidPath(format!("invalid segment '{}' in '{}'", part, s))
            })?;
            segments.push(if hardened {
                ChildNumber::hardened(index)?
            } else {
                ChildNumber::normal(index)?
            });
        }
        Ok(DerivationPath { segments })
    }
}

/// A 32-byte key plus its chain code, the unit both SLIP-10 and BIP32 walk.
#[derive(Clone)]
pub(crate) struct ExtendedKey {
    pub key: [u8; 32],
    pub chain_code: [u8; 32],
}

impl ExtendedKey {
    /// HMAC-SHA512 over `data` keyed with `key`, split into (IL, IR).
    pub fn from_hmac(key: &[u8], data: &[&[u8]]) -> Result<Self> {
        let mut mac = HmacSha512::new_from_slice(key)
            .map_err(|e| LaunchpadError::DerivationFailure(e.to_string()))?;
        for chunk in data {
            mac.update(chunk);
        }
        let output = mac.finalize().into_bytes();

        let mut key = [0u8; 32];
        let mut chain_code = [0u8; 32];
        key.copy_from_slice(&output[..32]);
        chain_code.copy_from_slice(&output[32..]);
        Ok(ExtendedKey { key, chain_code })
    }
}

impl Drop for ExtendedKey {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.key.zeroize();
        self.chain_code.zeroize();
    }
}

/// Curve-specific derivation. Implementations are pure: same seed and path
/// in, bit-identical keypair out.
pub trait DerivationStrategy: Send + Sync {
    fn chain(&self) -> ChainKind;

    fn derive(&self, seed: &Seed, path: &DerivationPath) -> Result<DerivedKeypair>;
}

/// Keypair produced by the engine, tagged with its chain.
#[derive(Debug)]
pub enum DerivedKeypair {
    Solana(SolanaKeypair),
    Ethereum(EthereumKeypair),
}

impl DerivedKeypair {
    pub fn chain(&self) -> ChainKind {
        match self {
            DerivedKeypair::Solana(_) => ChainKind::Solana,
            DerivedKeypair::Ethereum(_) => ChainKind::Ethereum,
        }
    }

    pub fn path(&self) -> &DerivationPath {
        match self {
            DerivedKeypair::Solana(kp) => &kp.path,
            DerivedKeypair::Ethereum(kp) => &kp.path,
        }
    }

    /// Raw address bytes: 32 for Solana, 20 for Ethereum.
    pub fn address_bytes(&self) -> Vec<u8> {
        match self {
            DerivedKeypair::Solana(kp) => kp.address_bytes().to_vec(),
            DerivedKeypair::Ethereum(kp) => kp.address_bytes().to_vec(),
        }
    }

    /// Chain-native text form of the address.
    pub fn address(&self) -> String {
        match self {
            DerivedKeypair::Solana(kp) => kp.address(),
            DerivedKeypair::Ethereum(kp) => kp.checksum_address(),
        }
    }

    pub fn public_key_bytes(&self) -> Vec<u8> {
        match self {
            DerivedKeypair::Solana(kp) => kp.address_bytes().to_vec(),
            DerivedKeypair::Ethereum(kp) => kp.compressed_public_key().to_vec(),
        }
    }

    pub fn secret_bytes(&self) -> Vec<u8> {
        match self {
            DerivedKeypair::Solana(kp) => kp.secret_bytes().to_vec(),
            DerivedKeypair::Ethereum(kp) => kp.secret_bytes().to_vec(),
        }
    }

    pub fn as_solana(&self) -> Option<&SolanaKeypair> {
        match self {
            DerivedKeypair::Solana(kp) => Some(kp),
            _ => None,
        }
    }

    pub fn as_ethereum(&self) -> Option<&EthereumKeypair> {
        match self {
            DerivedKeypair::Ethereum(kp) => Some(kp),
            _ => None,
        }
    }
}

/// Entry point for turning (seed, chain, index) into a keypair.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyDerivationEngine;

impl KeyDerivationEngine {
    pub fn new() -> Self {
        KeyDerivationEngine
    }

    pub fn derive_keypair(&self, seed: &Seed, chain: ChainKind, index: u32) -> Result<DerivedKeypair> {
        let path = DerivationPath::bip44(chain, index)?;
        self.derive_at_path(seed, chain, &path)
    }

    pub fn derive_at_path(
        &self,
        seed: &Seed,
        chain: ChainKind,
        path: &DerivationPath,
    ) -> Result<DerivedKeypair> {
        let strategy = chain.strategy();
        debug_assert_eq!(strategy.chain(), chain);
        let keypair = strategy.derive(seed, path)?;
        debug!("Derived {} key at {}", chain, path);
        Ok(keypair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bip44_paths_render_per_chain() {
        assert_eq!(
            DerivationPath::bip44(ChainKind::Solana, 3).unwrap().to_string(),
            "m/44'/501'/3'/0'"
        );
        assert_eq!(
            DerivationPath::bip44(ChainKind::Ethereum, 0).unwrap().to_string(),
            "m/44'/60'/0'/0'"
        );
    }

    #[test]
    fn path_parse_round_trips() {
        for text in ["m/44'/501'/7'/0'", "m/44'/60'/0'/0/0", "m"] {
            let path: DerivationPath = text.parse().unwrap();
            assert_eq!(path.to_string(), text);
        }
        let path: DerivationPath = "m/0h/1".parse().unwrap();
        assert_eq!(path.segments(), &[ChildNumber::Hardened(0), ChildNumber::Normal(1)]);
    }

    #[test]
    fn malformed_paths_are_rejected() {
        for text in ["44'/0'", "m/-1'", "m/abc", "m/2147483648'", "m//1"] {
            let err = text.parse::<DerivationPath>().unwrap_err();
            assert!(matches!(err, LaunchpadError::InvalidPath(_)), "{}", text);
        }
    }

    #[test]
    fn index_outside_hardened_range_is_invalid() {
        let err = DerivationPath::bip44(ChainKind::Solana, HARDENED_OFFSET).unwrap_err();
        assert!(matches!(err, LaunchpadError::InvalidPath(_)));
        let err = DerivationPath::bip44_checked(ChainKind::Ethereum, -1).unwrap_err();
        assert!(matches!(err, LaunchpadError::InvalidPath(_)));
    }

    #[test]
    fn child_number_encoding() {
        assert_eq!(ChildNumber::Hardened(44).to_u32(), 0x8000_002c);
        assert_eq!(ChildNumber::Normal(5).to_u32(), 5);
    }

    #[test]
    fn chain_kind_parses_names_and_tickers() {
        assert_eq!("SOL".parse::<ChainKind>().unwrap(), ChainKind::Solana);
        assert_eq!("ethereum".parse::<ChainKind>().unwrap(), ChainKind::Ethereum);
        assert!("bitcoin".parse::<ChainKind>().is_err());
    }
}
