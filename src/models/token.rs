use serde::{Deserialize, Serialize};
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use std::fmt;

use crate::launch::session::{StepKind, StepStatus};
use crate::utils::format_token_amount;

/// Launch parameters exactly as the user typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchInput {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub initial_supply: String,
    pub decimals: String,
}

/// A validated launch. Only the validator constructs one, and nothing
/// mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLaunchRequest {
    name: String,
    symbol: String,
    uri: String,
    decimals: u8,
    initial_supply: String,
    base_units: u64,
}

impl TokenLaunchRequest {
    pub(crate) fn new(
        name: String,
        symbol: String,
        uri: String,
        decimals: u8,
        initial_supply: String,
        base_units: u64,
    ) -> Self {
        TokenLaunchRequest {
            name,
            symbol,
            uri,
            decimals,
            initial_supply,
            base_units,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Supply in whole tokens, as entered.
    pub fn initial_supply(&self) -> &str {
        &self.initial_supply
    }

    /// `floor(initial_supply * 10^decimals)`.
    pub fn base_units(&self) -> u64 {
        self.base_units
    }
}

/// What happened to one step of a launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReceipt {
    pub step: StepKind,
    pub status: StepStatus,
    /// Absent when the step failed before reaching the network.
    pub signature: Option<Signature>,
}

impl fmt::Display for StepReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} ({}): {}", self.step.ordinal(), self.step.label(), self.status)?;
        if let Some(signature) = &self.signature {
            write!(f, " {}", signature)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LaunchResult {
    pub mint: Pubkey,
    pub holding_account: Pubkey,
    pub owner: Pubkey,
    pub decimals: u8,
    pub base_units: u64,
    pub steps: Vec<StepReceipt>,
    /// Steps that were submitted but never confirmed. Empty unless the
    /// pipeline ran with the first-step-only policy.
    pub unconfirmed_steps: Vec<StepKind>,
}

impl LaunchResult {
    pub fn is_fully_confirmed(&self) -> bool {
        self.unconfirmed_steps.is_empty()
    }

    pub fn signature(&self, step: StepKind) -> Option<Signature> {
        self.steps
            .iter()
            .find(|receipt| receipt.step == step)
            .and_then(|receipt| receipt.signature)
    }

    /// Minted supply in whole tokens, e.g. "1000" or "12.5".
    pub fn display_supply(&self) -> String {
        format_token_amount(self.base_units, self.decimals)
    }
}
