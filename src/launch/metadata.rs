//! Token-2022 metadata packing and account sizing for the identity account.

use borsh::BorshSerialize;
use solana_sdk::pubkey::Pubkey;
use spl_token_2022::extension::ExtensionType;
use spl_token_2022::state::Mint;

use crate::errors::{LaunchpadError, Result};

/// Type tag (u16) plus length prefix (u16), both little-endian.
pub const TLV_HEADER_LEN: usize = 4;

/// Borsh layout of the TokenMetadata extension value.
#[derive(BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct PackedTokenMetadata {
    pub update_authority: [u8; 32],
    pub mint: [u8; 32],
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub additional_metadata: Vec<(String, String)>,
}

impl PackedTokenMetadata {
    pub fn new(update_authority: &Pubkey, mint: &Pubkey, name: &str, symbol: &str, uri: &str) -> Self {
        PackedTokenMetadata {
            update_authority: update_authority.to_bytes(),
            mint: mint.to_bytes(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            uri: uri.to_string(),
            additional_metadata: Vec::new(),
        }
    }

    pub fn pack(&self) -> Result<Vec<u8>> {
        self.try_to_vec()
            .map_err(|e| LaunchpadError::Build(format!("Failed to serialize token metadata: {}", e)))
    }

    /// The value wrapped in its type-length header, as it lands after the
    /// mint's base storage.
    pub fn pack_tlv(&self) -> Result<Vec<u8>> {
        let value = self.pack()?;
        let length = u16::try_from(value.len()).map_err(|_| {
            LaunchpadError::Build(format!("Token metadata too large: {} bytes", value.len()))
        })?;

        let mut out = Vec::with_capacity(TLV_HEADER_LEN + value.len());
        out.extend_from_slice(&(ExtensionType::TokenMetadata as u16).to_le_bytes());
        out.extend_from_slice(&length.to_le_bytes());
        out.extend_from_slice(&value);
        Ok(out)
    }

    pub fn tlv_len(&self) -> Result<usize> {
        Ok(self.pack_tlv()?.len())
    }
}

/// Space allocated up front for the identity account: mint state plus the
/// metadata pointer extension. The metadata itself is appended by the token
/// program when it is initialised, so only its rent is prepaid.
pub fn mint_space() -> Result<usize> {
    Ok(ExtensionType::try_calculate_account_len::<Mint>(&[
        ExtensionType::MetadataPointer,
    ])?)
}
