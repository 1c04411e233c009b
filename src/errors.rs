use thiserror::Error;
use solana_client::client_error::ClientError;
use solana_sdk::pubkey::{ParsePubkeyError, Pubkey};
use solana_sdk::program_error::ProgramError;
use solana_sdk::signature::{Signature, SignerError};

use crate::launch::session::StepKind;
use crate::models::token::StepReceipt;

#[derive(Error, Debug)]
pub enum LaunchpadError {
    #[error("Entropy source unavailable: {0}")]
    EntropySource(String),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("Invalid derivation path: {0}")]
    InvalidPath(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailure(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Wallet not connected")]
    WalletNotConnected,

    #[error("Solana client error: {0}")]
    SolanaClient(#[from] ClientError),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Confirmation timed out for {0}")]
    ConfirmationTimeout(Signature),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),

    #[error("Instruction building error: {0}")]
    Build(String),

    #[error("Solana program error: {0}")]
    SolanaProgram(#[from] ProgramError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Pubkey parse error: {0}")]
    PubkeyParseError(#[from] ParsePubkeyError),

    #[error("BS58 decode error: {0}")]
    Bs58DecodeError(#[from] bs58::decode::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invariant condition violated: {0}")]
    Invariant(String),

    #[error("Generic error: {0}")]
    Generic(String),
}

pub type Result<T> = std::result::Result<T, LaunchpadError>;

impl From<anyhow::Error> for LaunchpadError {
    fn from(err: anyhow::Error) -> Self {
        LaunchpadError::Generic(err.to_string())
    }
}

/// Rejections from the launch request validator. Only the first failing
/// rule is ever reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Token name is required")]
    NameRequired,

    #[error("Token symbol is required")]
    SymbolRequired,

    #[error("Symbol must be 10 characters or less (got {0})")]
    SymbolTooLong(usize),

    #[error("Metadata URI is required")]
    UriRequired,

    #[error("Please enter a valid URL for the metadata: {0}")]
    UriInvalid(String),

    #[error("Valid initial supply is required")]
    SupplyInvalid,

    #[error("Initial supply must be greater than 0")]
    SupplyNotPositive,

    #[error("Valid decimals is required")]
    DecimalsInvalid,

    #[error("Decimals must be between 0 and 9")]
    DecimalsOutOfRange,

    #[error("Initial supply is smaller than one base unit at {0} decimals")]
    SupplyBelowBaseUnit(u8),

    #[error("Initial supply does not fit in a 64-bit base-unit amount")]
    SupplyTooLarge,

    #[error("Name, symbol and URI are too long: the mint transaction would be {size} bytes (limit {limit})")]
    MetadataTooLarge { size: usize, limit: usize },
}

/// A launch that stopped part-way. On-chain effects of every step up to
/// `last_submitted_step` are permanent; nothing is rolled back.
#[derive(Error, Debug)]
#[error("launch failed{}: {source}", step_suffix(.failed_step))]
pub struct LaunchError {
    /// Step that was being built or submitted when the error surfaced.
    pub failed_step: Option<StepKind>,
    /// Ordinal of the last step whose transaction reached the network.
    pub last_submitted_step: Option<u8>,
    /// Identity account address, once the session got past `Building`.
    pub mint: Option<Pubkey>,
    pub signatures: Vec<(StepKind, Signature)>,
    /// Every step that was built, with the status it ended in.
    pub steps: Vec<StepReceipt>,
    #[source]
    pub source: LaunchpadError,
}

fn step_suffix(step: &Option<StepKind>) -> String {
    match step {
        Some(step) => format!(" at step {} ({})", step.ordinal(), step.label()),
        None => String::new(),
    }
}

impl LaunchError {
    /// Failure before any session existed (precondition or validation).
    pub fn before_session(source: LaunchpadError) -> Self {
        LaunchError {
            failed_step: None,
            last_submitted_step: None,
            mint: None,
            signatures: Vec::new(),
            steps: Vec::new(),
            source,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.source, LaunchpadError::Validation(_))
    }
}
