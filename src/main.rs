use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use env_logger::Env;
use log::info;

use launchpad_wallet::commands::{generate_mnemonic, launch_token, show_accounts, validate_mnemonic};
use launchpad_wallet::config::Config;
use launchpad_wallet::launch::ConfirmationPolicy;
use launchpad_wallet::models::token::LaunchInput;

#[derive(Parser, Debug)]
#[command(
    name = "launchpad",
    version,
    about = "Derive multi-chain wallet accounts and launch Token-2022 tokens on Solana",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate or check a recovery phrase
    Mnemonic {
        #[command(subcommand)]
        action: MnemonicAction,
    },
    /// Derive Solana and Ethereum accounts from a recovery phrase
    Accounts {
        /// Recovery phrase (quote it)
        #[arg(long, env = "LAUNCHPAD_MNEMONIC", hide_env_values = true)]
        mnemonic: String,
        /// Optional BIP39 passphrase
        #[arg(long, default_value = "", hide_default_value = true)]
        passphrase: String,
        /// Number of Solana accounts
        #[arg(long, default_value_t = 1)]
        solana: u32,
        /// Number of Ethereum accounts
        #[arg(long, default_value_t = 1)]
        ethereum: u32,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Create a token with metadata, its holding account and initial supply
    Launch {
        /// Token name
        #[arg(short, long)]
        name: String,
        /// Token symbol (max 10 characters)
        #[arg(short, long)]
        symbol: String,
        /// Metadata JSON URI (name, symbol and URI must fit in one
        /// transaction, about 1232 bytes in total)
        #[arg(short, long)]
        uri: String,
        /// Initial supply in whole tokens
        #[arg(long)]
        supply: String,
        /// Token decimals (0-9); defaults to the configured value
        #[arg(short, long)]
        decimals: Option<String>,
        /// every-step or first-step-only
        #[arg(long)]
        confirm_policy: Option<ConfirmationPolicy>,
    },
}

#[derive(Subcommand, Debug)]
enum MnemonicAction {
    /// Generate a new recovery phrase
    Generate {
        /// Number of words (12, 15, 18, 21 or 24)
        #[arg(short, long, default_value_t = 12)]
        words: usize,
    },
    /// Check a recovery phrase's wordlist and checksum
    Validate {
        /// Recovery phrase (quote it)
        phrase: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    info!("Starting launchpad");

    match cli.command {
        Commands::Mnemonic { action } => match action {
            MnemonicAction::Generate { words } => generate_mnemonic(words)?,
            MnemonicAction::Validate { phrase } => {
                if !validate_mnemonic(&phrase)? {
                    std::process::exit(1);
                }
            }
        },
        Commands::Accounts {
            mnemonic,
            passphrase,
            solana,
            ethereum,
            json,
        } => show_accounts(&mnemonic, &passphrase, solana, ethereum, json)?,
        Commands::Launch {
            name,
            symbol,
            uri,
            supply,
            decimals,
            confirm_policy,
        } => {
            let config = Config::load().context("Failed to load configuration")?;
            let input = LaunchInput {
                name,
                symbol,
                uri,
                initial_supply: supply,
                decimals: decimals.unwrap_or_else(|| config.default_decimals.to_string()),
            };
            launch_token(input, confirm_policy, &config).await?;
        }
    }

    Ok(())
}
