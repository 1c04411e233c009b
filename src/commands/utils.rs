use crate::models::LaunchStatus;
use crate::utils::explorer_tx_url;

/// One console line per pipeline event; `None` for events not worth printing.
pub fn describe_status(status: &LaunchStatus, cluster: &str) -> Option<String> {
    let line = match status {
        LaunchStatus::Starting => "🚀 Starting token launch...".to_string(),
        LaunchStatus::Validated { symbol, base_units } => {
            format!("✓ Parameters valid: {} ({} base units)", symbol, base_units)
        }
        LaunchStatus::MintGenerated(mint) => format!("🔑 Mint address: {}", mint),
        LaunchStatus::PreparingTx(step) => format!("🛠  Building {}...", step),
        LaunchStatus::Submitted(step, signature) => {
            format!("📤 {} submitted: {}", step, explorer_tx_url(signature, cluster))
        }
        LaunchStatus::Confirmed(step, _) => format!("✅ {} confirmed", step),
        LaunchStatus::Unconfirmed(step, _) => {
            format!("⚠️ {} submitted, not awaiting confirmation", step)
        }
        LaunchStatus::Log(message) => message.clone(),
        LaunchStatus::Completed { .. } => return None,
        LaunchStatus::Failure(message) => format!("❌ {}", message),
    };
    Some(line)
}
