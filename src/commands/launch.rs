use std::sync::Arc;

use anyhow::{Context, Result};
use console::Style;
use log::{debug, info};
use solana_client::nonblocking::rpc_client::RpcClient;
use tokio::sync::mpsc::unbounded_channel;

use crate::commands::utils::describe_status;
use crate::config::Config;
use crate::launch::pipeline::{ConfirmationPolicy, TransactionPipeline};
use crate::launch::session::StepStatus;
use crate::models::token::LaunchInput;
use crate::utils::{explorer_address_url, explorer_tx_url};
use crate::utils::rpc::ChainRpc;
use crate::wallet::{load_wallet_keypair, KeypairWallet, WalletAdapter};

/// Launch a Token-2022 token with metadata and mint its initial supply to
/// the configured wallet.
pub async fn launch_token(
    input: LaunchInput,
    policy: Option<ConfirmationPolicy>,
    config: &Config,
) -> Result<()> {
    let success_style = Style::new().green().bold();
    let info_style = Style::new().cyan();
    let warn_style = Style::new().yellow();

    let mut options = config.pipeline_options();
    if let Some(policy) = policy {
        options.confirmation_policy = policy;
    }
    debug!("Pipeline options: {:?}", options);

    let rpc: Arc<dyn ChainRpc> = Arc::new(RpcClient::new_with_commitment(
        config.solana_rpc_url.clone(),
        config.get_commitment_config()?,
    ));
    let keypair = load_wallet_keypair(config).context("Failed to load wallet keypair")?;
    let wallet = Arc::new(KeypairWallet::new(keypair, rpc.clone()));
    wallet.connect();
    let wallet_adapter: Arc<dyn WalletAdapter> = wallet.clone();

    println!("\n{}", info_style.apply_to("🚀 Token launch").bold());
    println!("RPC: {}", config.solana_rpc_url);
    if let Some(owner) = wallet_adapter.public_key() {
        println!("Wallet Address: {}", owner);
    }
    println!("Confirmation policy: {}", options.confirmation_policy);

    let (status_tx, mut status_rx) = unbounded_channel();
    let cluster = config.cluster.clone();
    let printer = tokio::spawn(async move {
        while let Some(status) = status_rx.recv().await {
            if let Some(line) = describe_status(&status, &cluster) {
                println!("{}", line);
            }
        }
    });

    let pipeline = TransactionPipeline::new(rpc, wallet_adapter, options).with_status_sender(status_tx);
    let outcome = pipeline.execute(&input).await;
    // Closing the channel lets the printer drain and exit.
    drop(pipeline);
    let _ = printer.await;

    let result = match outcome {
        Ok(result) => result,
        Err(err) => {
            if let (Some(mint), Some(_)) = (err.mint, err.last_submitted_step) {
                println!(
                    "\n{} Mint {} may already exist on chain and will not be reused by a retry.",
                    warn_style.apply_to("⚠️"),
                    mint
                );
            }
            for receipt in &err.steps {
                println!("  {}", receipt);
            }
            return Err(err).context("Token launch failed");
        }
    };
    info!("Launch finished for mint {}", result.mint);

    println!("\n{}", success_style.apply_to("✅ Token launched!").bold());
    println!("Mint Address: {}", result.mint);
    println!("Holding Account: {}", result.holding_account);
    println!("Supply: {} ({} base units)", result.display_supply(), result.base_units);
    println!("Explorer: {}", explorer_address_url(&result.mint, &config.cluster));
    for receipt in &result.steps {
        match receipt.signature {
            Some(signature) if receipt.status != StepStatus::Confirmed => println!(
                "  {} {}",
                warn_style.apply_to(receipt.to_string()),
                explorer_tx_url(&signature, &config.cluster)
            ),
            _ => println!("  {}", receipt),
        }
    }
    if !result.is_fully_confirmed() {
        println!(
            "{}",
            warn_style.apply_to("⚠️ Some steps were submitted but not confirmed. Check them on the explorer before relying on the token.")
        );
    }
    Ok(())
}
