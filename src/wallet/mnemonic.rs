//! BIP39 recovery phrases and the seeds derived from them.

use std::fmt;

use bip39::Language;
use log::debug;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::errors::{LaunchpadError, Result};

/// Entropy sizes allowed by BIP39, in bits.
pub const ALLOWED_ENTROPY_BITS: [usize; 5] = [128, 160, 192, 224, 256];
pub const DEFAULT_ENTROPY_BITS: usize = 128;

/// A validated English BIP39 phrase. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct Mnemonic {
    inner: bip39::Mnemonic,
}

impl Mnemonic {
    pub fn phrase(&self) -> String {
        self.inner.to_string()
    }

    pub fn words(&self) -> Vec<String> {
        self.phrase().split_whitespace().map(str::to_string).collect()
    }

    pub fn word_count(&self) -> usize {
        self.inner.word_count()
    }

    /// PBKDF2 seed for this phrase. An empty passphrase is the common case.
    pub fn to_seed(&self, passphrase: &str) -> Seed {
        Seed {
            bytes: self.inner.to_seed(passphrase),
        }
    }
}

// Phrases are secrets; never let them leak through `{:?}`.
impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mnemonic({} words)", self.word_count())
    }
}

/// 64-byte BIP39 seed. Lives only in memory and is wiped on drop.
#[derive(Clone)]
pub struct Seed {
    bytes: [u8; 64],
}

impl Seed {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Seed { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed([redacted])")
    }
}

impl Drop for Seed {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// Generates and checks recovery phrases. Holds no state: every call to
/// [`MnemonicManager::generate`] draws fresh entropy.
#[derive(Debug, Default, Clone, Copy)]
pub struct MnemonicManager;

impl MnemonicManager {
    pub fn new() -> Self {
        MnemonicManager
    }

    pub fn generate(&self, entropy_bits: usize) -> Result<Mnemonic> {
        self.generate_with(&mut OsRng, entropy_bits)
    }

    /// Same as [`generate`](Self::generate) but with a caller-supplied
    /// randomness source.
    pub fn generate_with<R: RngCore + ?Sized>(
        &self,
        rng: &mut R,
        entropy_bits: usize,
    ) -> Result<Mnemonic> {
        if !ALLOWED_ENTROPY_BITS.contains(&entropy_bits) {
            return Err(LaunchpadError::InvalidMnemonic(format!(
                "unsupported entropy size {} bits (expected one of {:?})",
                entropy_bits, ALLOWED_ENTROPY_BITS
            )));
        }

        let mut entropy = vec![0u8; entropy_bits / 8];
        rng.try_fill_bytes(&mut entropy)
            .map_err(|e| LaunchpadError::EntropySource(e.to_string()))?;

        let inner = bip39::Mnemonic::from_entropy_in(Language::English, &entropy)
            .map_err(|e| LaunchpadError::InvalidMnemonic(e.to_string()));
        entropy.zeroize();
        let inner = inner?;

        debug!("Generated {}-word mnemonic", inner.word_count());
        Ok(Mnemonic { inner })
    }

    /// Checksum and wordlist check. Does not allocate a [`Mnemonic`].
    pub fn validate(&self, candidate: &str) -> bool {
        bip39::Mnemonic::parse_in_normalized(Language::English, &normalize(candidate)).is_ok()
    }

    pub fn parse(&self, phrase: &str) -> Result<Mnemonic> {
        let inner = bip39::Mnemonic::parse_in_normalized(Language::English, &normalize(phrase))
            .map_err(|e| LaunchpadError::InvalidMnemonic(e.to_string()))?;
        Ok(Mnemonic { inner })
    }
}

/// Number of words a phrase of `entropy_bits` has.
pub fn word_count_for_bits(entropy_bits: usize) -> usize {
    (entropy_bits + entropy_bits / 32) / 11
}

/// Inverse of [`word_count_for_bits`] for the CLI's `--words` flag.
pub fn bits_for_word_count(words: usize) -> Option<usize> {
    ALLOWED_ENTROPY_BITS
        .iter()
        .copied()
        .find(|bits| word_count_for_bits(*bits) == words)
}

fn normalize(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ABANDON: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, _dest: &mut [u8]) {}
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "no entropy",
            )))
        }
    }

    #[test]
    fn generate_default_is_twelve_valid_words() {
        let manager = MnemonicManager::new();
        let mnemonic = manager.generate(DEFAULT_ENTROPY_BITS).unwrap();
        assert_eq!(mnemonic.word_count(), 12);
        assert!(manager.validate(&mnemonic.phrase()));
    }

    #[test]
    fn generate_twenty_four_words() {
        let mnemonic = MnemonicManager::new().generate(256).unwrap();
        assert_eq!(mnemonic.words().len(), 24);
    }

    #[test]
    fn consecutive_generations_are_independent() {
        let manager = MnemonicManager::new();
        let a = manager.generate(128).unwrap();
        let b = manager.generate(128).unwrap();
        assert_ne!(a.phrase(), b.phrase());
    }

    #[test]
    fn rejects_odd_entropy_size() {
        let err = MnemonicManager::new().generate(100).unwrap_err();
        assert!(matches!(err, LaunchpadError::InvalidMnemonic(_)));
    }

    #[test]
    fn entropy_failure_is_reported() {
        let err = MnemonicManager::new()
            .generate_with(&mut BrokenRng, 128)
            .unwrap_err();
        assert!(matches!(err, LaunchpadError::EntropySource(_)));
    }

    #[test]
    fn same_rng_seed_gives_same_phrase() {
        let manager = MnemonicManager::new();
        let a = manager.generate_with(&mut StdRng::seed_from_u64(7), 128).unwrap();
        let b = manager.generate_with(&mut StdRng::seed_from_u64(7), 128).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn validate_checks_checksum_and_wordlist() {
        let manager = MnemonicManager::new();
        assert!(manager.validate(ABANDON));
        assert!(manager.validate(&format!("  {}  ", ABANDON.to_uppercase())));
        // last word breaks the checksum
        assert!(!manager.validate(&ABANDON.replace("about", "abandon")));
        assert!(!manager.validate("abandon notaword"));
        assert!(!manager.validate(""));
    }

    #[test]
    fn known_seed_for_abandon_phrase() {
        let mnemonic = MnemonicManager::new().parse(ABANDON).unwrap();
        let seed = mnemonic.to_seed("");
        assert_eq!(
            hex::encode(&seed.as_bytes()[..16]),
            "5eb00bbddcf069084889a8ab91555681"
        );
        assert_eq!(format!("{:?}", seed), "Seed([redacted])");
    }

    #[test]
    fn word_counts_map_to_entropy() {
        assert_eq!(word_count_for_bits(128), 12);
        assert_eq!(word_count_for_bits(256), 24);
        assert_eq!(bits_for_word_count(18), Some(192));
        assert_eq!(bits_for_word_count(13), None);
    }
}
