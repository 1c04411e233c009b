use crate::errors::{LaunchpadError, Result};
use crate::launch::pipeline::{ConfirmationPolicy, PipelineOptions};
use crate::models::settings::AppSettings;
use crate::utils::transaction::ConfirmOptions;
use dotenv::dotenv;
use log::{debug, info};
use solana_sdk::commitment_config::CommitmentConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Solana configuration
    pub solana_rpc_url: String,
    pub commitment: String,
    pub cluster: String,

    // Launch behaviour
    pub confirm_policy: ConfirmationPolicy,
    pub confirm_attempts: u32,
    pub confirm_interval_ms: u64,
    pub priority_fee_micro_lamports: u64,
    pub default_decimals: u8,

    // Wallet
    pub wallet_private_key: Option<String>,
    pub wallet_keypair_path: Option<String>,
}

impl Config {
    /// Settings file first, then `.env` / process environment on top.
    pub fn load() -> Result<Self> {
        dotenv().ok();
        info!("Loading configuration from settings file and environment variables.");

        let mut config = Config::from_settings(&AppSettings::load())?;
        config.apply_overrides(|key| env::var(key).ok())?;

        debug!(
            "Configuration loaded: rpc={} commitment={} policy={} attempts={} interval={}ms",
            config.solana_rpc_url,
            config.commitment,
            config.confirm_policy,
            config.confirm_attempts,
            config.confirm_interval_ms
        );
        Ok(config)
    }

    pub fn from_settings(settings: &AppSettings) -> Result<Self> {
        Ok(Config {
            solana_rpc_url: settings.solana_rpc_url.clone(),
            commitment: settings.commitment.clone(),
            cluster: settings.cluster.clone(),
            confirm_policy: ConfirmationPolicy::from_str(&settings.confirm_policy)?,
            confirm_attempts: settings.confirm_attempts,
            confirm_interval_ms: settings.confirm_interval_ms,
            priority_fee_micro_lamports: settings.priority_fee_micro_lamports,
            default_decimals: settings.default_decimals,
            wallet_private_key: non_empty(&settings.wallet_private_key),
            wallet_keypair_path: non_empty(&settings.wallet_keypair_path),
        })
    }

    /// Applies the `SOLANA_*` / `LAUNCHPAD_*` variables visible through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SOLANA_RPC_URL") {
            self.solana_rpc_url = url;
        }
        if let Some(commitment) = lookup("SOLANA_COMMITMENT") {
            self.commitment = commitment;
        }
        if let Some(policy) = lookup("LAUNCHPAD_CONFIRM_POLICY") {
            self.confirm_policy = policy.parse()?;
        }
        if let Some(attempts) = lookup("LAUNCHPAD_CONFIRM_ATTEMPTS") {
            self.confirm_attempts = parse_var("LAUNCHPAD_CONFIRM_ATTEMPTS", &attempts)?;
        }
        if let Some(interval) = lookup("LAUNCHPAD_CONFIRM_INTERVAL_MS") {
            self.confirm_interval_ms = parse_var("LAUNCHPAD_CONFIRM_INTERVAL_MS", &interval)?;
        }
        if let Some(fee) = lookup("LAUNCHPAD_PRIORITY_FEE_MICRO_LAMPORTS") {
            self.priority_fee_micro_lamports =
                parse_var("LAUNCHPAD_PRIORITY_FEE_MICRO_LAMPORTS", &fee)?;
        }
        if let Some(decimals) = lookup("LAUNCHPAD_DEFAULT_DECIMALS") {
            self.default_decimals = parse_var("LAUNCHPAD_DEFAULT_DECIMALS", &decimals)?;
        }
        if let Some(key) = lookup("LAUNCHPAD_WALLET_KEYPAIR") {
            self.wallet_private_key = non_empty(&key);
        }
        if let Some(path) = lookup("LAUNCHPAD_WALLET_KEYPAIR_PATH") {
            self.wallet_keypair_path = non_empty(&path);
        }
        Ok(())
    }

    pub fn get_commitment_config(&self) -> Result<CommitmentConfig> {
        match self.commitment.to_lowercase().as_str() {
            "processed" => Ok(CommitmentConfig::processed()),
            "confirmed" => Ok(CommitmentConfig::confirmed()),
            "finalized" => Ok(CommitmentConfig::finalized()),
            _ => Err(LaunchpadError::Config(format!("Invalid commitment level: {}", self.commitment))),
        }
    }

    pub fn confirm_options(&self) -> ConfirmOptions {
        ConfirmOptions {
            max_attempts: self.confirm_attempts,
            interval: Duration::from_millis(self.confirm_interval_ms),
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            confirmation_policy: self.confirm_policy,
            confirm: self.confirm_options(),
            priority_fee_micro_lamports: self.priority_fee_micro_lamports,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        // AppSettings defaults always parse.
        Config::from_settings(&AppSettings::default()).unwrap_or_else(|_| Config {
            solana_rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: "confirmed".to_string(),
            cluster: "mainnet-beta".to_string(),
            confirm_policy: ConfirmationPolicy::EveryStep,
            confirm_attempts: 30,
            confirm_interval_ms: 1000,
            priority_fee_micro_lamports: 0,
            default_decimals: 9,
            wallet_private_key: None,
            wallet_keypair_path: None,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| LaunchpadError::Config(format!("Invalid {} '{}': {}", name, value, e)))
}
