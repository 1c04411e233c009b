use crate::errors::{LaunchpadError, Result};
use crate::utils::rpc::{ChainRpc, ConfirmationStatus};
use log::{debug, warn};
use solana_sdk::{
    compute_budget::ComputeBudgetInstruction,
    instruction::Instruction,
    packet::PACKET_DATA_SIZE,
    signature::Signature,
    transaction::Transaction,
};
use std::time::Duration;

pub const DEFAULT_CONFIRM_ATTEMPTS: u32 = 30;
pub const DEFAULT_CONFIRM_INTERVAL_MS: u64 = 1000;

/// How long and how often to poll for a signature status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmOptions {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        ConfirmOptions {
            max_attempts: DEFAULT_CONFIRM_ATTEMPTS,
            interval: Duration::from_millis(DEFAULT_CONFIRM_INTERVAL_MS),
        }
    }
}

/// Polls until the ledger reports `signature` confirmed. A ledger-side
/// rejection fails immediately; running out of attempts is a timeout.
pub async fn await_confirmation(
    rpc: &dyn ChainRpc,
    signature: &Signature,
    options: ConfirmOptions,
) -> Result<()> {
    let attempts = options.max_attempts.max(1);
    for attempt in 1..=attempts {
        match rpc.confirmation_status(signature).await? {
            ConfirmationStatus::Confirmed => {
                debug!("{} confirmed after {} poll(s)", signature, attempt);
                return Ok(());
            }
            ConfirmationStatus::Failed(reason) => {
                warn!("{} rejected by the ledger: {}", signature, reason);
                return Err(LaunchpadError::Transaction(format!(
                    "transaction {} failed: {}",
                    signature, reason
                )));
            }
            ConfirmationStatus::Pending => {
                debug!("{} pending ({}/{})", signature, attempt, attempts);
                if attempt < attempts {
                    tokio::time::sleep(options.interval).await;
                }
            }
        }
    }
    Err(LaunchpadError::ConfirmationTimeout(*signature))
}

/// Prepends a compute-unit price instruction; zero leaves the list as is.
pub fn add_priority_fee(instructions: &mut Vec<Instruction>, micro_lamports: u64) {
    if micro_lamports > 0 {
        instructions.insert(
            0,
            ComputeBudgetInstruction::set_compute_unit_price(micro_lamports),
        );
    }
}

/// Serialized size of `transaction`, rejecting anything over the packet limit.
pub fn ensure_fits_in_packet(transaction: &Transaction) -> Result<usize> {
    let size = serialized_size(transaction)?;
    if size > PACKET_DATA_SIZE {
        return Err(LaunchpadError::Build(format!(
            "Transaction exceeds max size ({} bytes > {} bytes)",
            size, PACKET_DATA_SIZE
        )));
    }
    Ok(size)
}

/// Wire size of `transaction`. Unsigned transactions already carry
/// zeroed signature slots, so the size does not change when signed.
pub fn serialized_size(transaction: &Transaction) -> Result<usize> {
    bincode::serialized_size(transaction)
        .map(|size| size as usize)
        .map_err(|e| LaunchpadError::Build(format!("Failed to serialize transaction: {}", e)))
}
