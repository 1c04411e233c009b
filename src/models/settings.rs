use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

const SETTINGS_FILENAME: &str = "launchpad_settings.json";
const SETTINGS_DIRNAME: &str = "launchpad";

/// `launchpad_settings.json` in the working directory if present, otherwise
/// the same file under the platform config dir.
pub fn get_settings_path() -> PathBuf {
    let local = PathBuf::from(SETTINGS_FILENAME);
    if local.exists() {
        return local;
    }
    match dirs::config_dir() {
        Some(dir) => dir.join(SETTINGS_DIRNAME).join(SETTINGS_FILENAME),
        None => local,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppSettings {
    // Solana configuration
    pub solana_rpc_url: String,
    pub commitment: String,
    #[serde(default = "default_cluster")]
    pub cluster: String,

    // Launch behaviour
    #[serde(default = "default_confirm_policy")]
    pub confirm_policy: String,
    #[serde(default = "default_confirm_attempts")]
    pub confirm_attempts: u32,
    #[serde(default = "default_confirm_interval_ms")]
    pub confirm_interval_ms: u64,
    #[serde(default)]
    pub priority_fee_micro_lamports: u64,
    pub default_decimals: u8,

    // Wallet
    #[serde(default)]
    pub wallet_private_key: String,
    #[serde(default)]
    pub wallet_keypair_path: String,
}

fn default_cluster() -> String {
    "mainnet-beta".to_string()
}

fn default_confirm_policy() -> String {
    "every-step".to_string()
}

fn default_confirm_attempts() -> u32 {
    30
}

fn default_confirm_interval_ms() -> u64 {
    1000
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            solana_rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: "confirmed".to_string(),
            cluster: default_cluster(),
            confirm_policy: default_confirm_policy(),
            confirm_attempts: default_confirm_attempts(),
            confirm_interval_ms: default_confirm_interval_ms(),
            priority_fee_micro_lamports: 0,
            default_decimals: 9,
            wallet_private_key: String::new(),
            wallet_keypair_path: String::new(),
        }
    }
}

impl AppSettings {
    /// Loads settings from the default location, or returns defaults if the
    /// file is missing or unreadable.
    pub fn load() -> Self {
        Self::load_from(&get_settings_path())
    }

    pub fn load_from(path: &Path) -> Self {
        info!("Attempting to load settings from: {}", path.display());
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => {
                info!("Settings file '{}' not found. Using default settings.", path.display());
                return AppSettings::default();
            }
        };
        match serde_json::from_str(&contents) {
            Ok(settings) => {
                info!("Successfully loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("Failed to parse settings file '{}': {}. Using default settings.", path.display(), e);
                AppSettings::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&get_settings_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        info!("Attempting to save settings to: {}", path.display());
        let json_string = serde_json::to_string_pretty(self)
            .context("Failed to serialize settings to JSON")?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory: {}", parent.display()))?;
        }
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create or open settings file for writing: {}", path.display()))?;
        file.write_all(json_string.as_bytes())
            .with_context(|| format!("Failed to write settings to file: {}", path.display()))?;

        info!("Successfully saved settings to {}", path.display());
        Ok(())
    }

    pub fn get_commitment_config(&self) -> Result<CommitmentConfig> {
        match self.commitment.to_lowercase().as_str() {
            "processed" => Ok(CommitmentConfig::processed()),
            "confirmed" => Ok(CommitmentConfig::confirmed()),
            "finalized" => Ok(CommitmentConfig::finalized()),
            _ => Err(anyhow!("Invalid commitment level: {}", self.commitment)),
        }
    }
}
