// src/utils/mod.rs

use solana_sdk::{pubkey::Pubkey, signature::Signature};

pub mod rpc;
pub mod transaction;

pub use rpc::{ChainRpc, ConfirmationStatus};
pub use transaction::{
    add_priority_fee, await_confirmation, ensure_fits_in_packet, serialized_size, ConfirmOptions,
};

/// Renders a base-unit amount in whole tokens, trimming trailing zeros.
pub fn format_token_amount(amount: u64, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }

    let divisor = 10u128.pow(decimals as u32);
    let whole_part = amount as u128 / divisor;
    let fractional_part = amount as u128 % divisor;

    if fractional_part == 0 {
        return whole_part.to_string();
    }

    let fractional_str = format!("{:0width$}", fractional_part, width = decimals as usize);
    let trimmed = fractional_str.trim_end_matches('0');
    format!("{}.{}", whole_part, trimmed)
}

fn cluster_suffix(cluster: &str) -> String {
    match cluster.trim() {
        "" | "mainnet" | "mainnet-beta" => String::new(),
        other => format!("?cluster={}", other),
    }
}

/// Solana explorer link for a transaction.
pub fn explorer_tx_url(signature: &Signature, cluster: &str) -> String {
    format!("https://explorer.solana.com/tx/{}{}", signature, cluster_suffix(cluster))
}

/// Solana explorer link for an account (mint, holding account, wallet).
pub fn explorer_address_url(address: &Pubkey, cluster: &str) -> String {
    format!("https://explorer.solana.com/address/{}{}", address, cluster_suffix(cluster))
}
