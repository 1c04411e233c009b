// src/lib.rs

pub mod commands;
pub mod config;
pub mod errors;
pub mod launch;
pub mod models;
pub mod token_instruction_builders;
pub mod utils;
pub mod wallet;

pub use errors::{LaunchError, LaunchpadError, Result, ValidationError};
pub use launch::{ConfirmationPolicy, LaunchSession, PipelineOptions, TransactionPipeline};
pub use models::token::{LaunchInput, LaunchResult, TokenLaunchRequest};
pub use wallet::{AccountRegistry, ChainKind, KeyDerivationEngine, MnemonicManager};
