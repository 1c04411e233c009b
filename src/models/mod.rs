pub mod settings;
pub mod token;
pub mod wallet;

use crate::launch::session::StepKind;
use solana_sdk::{pubkey::Pubkey, signature::Signature};

/// Progress updates published by the launch pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchStatus {
    Starting,
    Validated { symbol: String, base_units: u64 },
    MintGenerated(Pubkey),
    PreparingTx(StepKind),
    Submitted(StepKind, Signature),
    Confirmed(StepKind, Signature),
    /// Submitted and deliberately not awaited.
    Unconfirmed(StepKind, Signature),
    Log(String),
    Completed { mint: Pubkey, holding_account: Pubkey },
    Failure(String),
}
