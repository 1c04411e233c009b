//! BIP32 secp256k1 derivation and EIP-55 addresses for Ethereum accounts.

use std::fmt;

use secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey};
use sha3::{Digest, Keccak256};

use crate::errors::{LaunchpadError, Result};
use crate::wallet::derivation::{
    ChainKind, ChildNumber, DerivationPath, DerivationStrategy, DerivedKeypair, ExtendedKey,
};
use crate::wallet::mnemonic::Seed;

const BITCOIN_SEED_KEY: &[u8] = b"Bitcoin seed";

pub struct Secp256k1Strategy;

impl Secp256k1Strategy {
    /// BIP32 private derivation along `path`. Hardened segments hash the
    /// private key, normal segments hash the compressed public key.
    pub(crate) fn derive_secret_key(seed: &[u8], path: &DerivationPath) -> Result<SecretKey> {
        let secp = Secp256k1::new();
        let master = ExtendedKey::from_hmac(BITCOIN_SEED_KEY, &[seed])?;
        let mut secret = SecretKey::from_slice(&master.key)
            .map_err(|e| LaunchpadError::DerivationFailure(format!("master key: {}", e)))?;
        let mut chain_code = master.chain_code;

        for child in path.segments() {
            let index_bytes = child.to_u32().to_be_bytes();
            let node = match child {
                ChildNumber::Hardened(_) => ExtendedKey::from_hmac(
                    &chain_code,
                    &[&[0u8][..], &secret.secret_bytes()[..], &index_bytes[..]],
                )?,
                ChildNumber::Normal(_) => {
                    let public = PublicKey::from_secret_key(&secp, &secret);
                    ExtendedKey::from_hmac(&chain_code, &[&public.serialize()[..], &index_bytes[..]])?
                }
            };

            // IL >= n or a zero child key makes this index unusable (BIP32 says
            // skip to the next index); surface it instead of silently changing paths.
            let tweak = Scalar::from_be_bytes(node.key).map_err(|_| {
                LaunchpadError::DerivationFailure(format!("tweak out of range at {}", child))
            })?;
            secret = secret.add_tweak(&tweak).map_err(|e| {
                LaunchpadError::DerivationFailure(format!("child key at {}: {}", child, e))
            })?;
            chain_code = node.chain_code;
        }
        Ok(secret)
    }
}

impl DerivationStrategy for Secp256k1Strategy {
    fn chain(&self) -> ChainKind {
        ChainKind::Ethereum
    }

    fn derive(&self, seed: &Seed, path: &DerivationPath) -> Result<DerivedKeypair> {
        let secret = Self::derive_secret_key(seed.as_bytes(), path)?;
        Ok(DerivedKeypair::Ethereum(EthereumKeypair::from_secret(
            secret,
            path.clone(),
        )))
    }
}

pub struct EthereumKeypair {
    secret: SecretKey,
    public: PublicKey,
    address: [u8; 20],
    pub(crate) path: DerivationPath,
}

impl EthereumKeypair {
    fn from_secret(secret: SecretKey, path: DerivationPath) -> Self {
        let secp = Secp256k1::signing_only();
        let public = PublicKey::from_secret_key(&secp, &secret);
        let address = address_from_public_key(&public);
        EthereumKeypair {
            secret,
            public,
            address,
            path,
        }
    }

    pub fn compressed_public_key(&self) -> [u8; 33] {
        self.public.serialize()
    }

    pub fn address_bytes(&self) -> [u8; 20] {
        self.address
    }

    pub fn checksum_address(&self) -> String {
        to_checksum_address(&self.address)
    }

    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret.secret_bytes()
    }
}

impl fmt::Debug for EthereumKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EthereumKeypair")
            .field("address", &self.checksum_address())
            .field("path", &self.path.to_string())
            .finish()
    }
}

/// Last 20 bytes of Keccak-256 over the uncompressed key without its 0x04 tag.
pub fn address_from_public_key(public: &PublicKey) -> [u8; 20] {
    let uncompressed = public.serialize_uncompressed();
    let hash = Keccak256::digest(&uncompressed[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// EIP-55 mixed-case rendering.
pub fn to_checksum_address(address: &[u8; 20]) -> String {
    let lower = hex::encode(address);
    let hash = Keccak256::digest(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// True when `address` is 0x-prefixed hex and, if mixed case, carries a
/// correct EIP-55 checksum.
pub fn is_valid_address(address: &str) -> bool {
    let Some(body) = address.strip_prefix("0x") else {
        return false;
    };
    let Ok(bytes) = hex::decode(body) else {
        return false;
    };
    let Ok(raw) = <[u8; 20]>::try_from(bytes.as_slice()) else {
        return false;
    };
    let all_lower = body.chars().all(|c| !c.is_ascii_uppercase());
    let all_upper = body.chars().all(|c| !c.is_ascii_lowercase());
    all_lower || all_upper || to_checksum_address(&raw) == address
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::mnemonic::MnemonicManager;

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn bip32_vector_seed() -> Vec<u8> {
        hex::decode("000102030405060708090a0b0c0d0e0f").unwrap()
    }

    #[test]
    fn bip32_master_key_vector() {
        let key = Secp256k1Strategy::derive_secret_key(
            &bip32_vector_seed(),
            &DerivationPath::new(vec![]),
        )
        .unwrap();
        assert_eq!(
            hex::encode(key.secret_bytes()),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
    }

    #[test]
    fn bip32_first_hardened_child_vector() {
        let key = Secp256k1Strategy::derive_secret_key(&bip32_vector_seed(), &"m/0'".parse().unwrap())
            .unwrap();
        assert_eq!(
            hex::encode(key.secret_bytes()),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );
    }

    #[test]
    fn standard_wallet_path_matches_reference_address() {
        let seed = MnemonicManager::new().parse(ABANDON).unwrap().to_seed("");
        let path: DerivationPath = "m/44'/60'/0'/0/0".parse().unwrap();
        let keypair = Secp256k1Strategy.derive(&seed, &path).unwrap();
        assert_eq!(keypair.address(), "0x9858EfFD232B4033E47d90003D23EC58E053e11f");
    }

    #[test]
    fn eip55_reference_vectors() {
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            let raw: [u8; 20] = hex::decode(&expected[2..].to_lowercase())
                .unwrap()
                .try_into()
                .unwrap();
            assert_eq!(to_checksum_address(&raw), expected);
            assert!(is_valid_address(expected));
        }
    }

    #[test]
    fn broken_checksum_is_invalid() {
        assert!(!is_valid_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD"));
        assert!(is_valid_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
        assert!(!is_valid_address("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
        assert!(!is_valid_address("0x1234"));
    }
}
