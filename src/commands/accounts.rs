use anyhow::{Context, Result};
use console::Style;
use prettytable::{row, Table};

use crate::models::wallet::{Account, AccountExport, AccountRecord};
use crate::wallet::derivation::{ChainKind, KeyDerivationEngine};
use crate::wallet::mnemonic::MnemonicManager;
use crate::wallet::registry::AccountRegistry;

/// Derives `solana` Solana accounts and `ethereum` Ethereum accounts from the
/// phrase, in that order, through a fresh registry.
pub fn derive_accounts(
    phrase: &str,
    passphrase: &str,
    solana: u32,
    ethereum: u32,
) -> Result<Vec<Account>> {
    let mnemonic = MnemonicManager::new()
        .parse(phrase)
        .context("Failed to parse recovery phrase")?;
    let seed = mnemonic.to_seed(passphrase);

    let engine = KeyDerivationEngine::new();
    let registry = AccountRegistry::new();
    for (chain, count) in [(ChainKind::Solana, solana), (ChainKind::Ethereum, ethereum)] {
        for _ in 0..count {
            registry
                .derive_next(&engine, &seed, chain)
                .with_context(|| format!("Failed to derive {} account", chain))?;
        }
    }
    Ok(registry.accounts()?)
}

pub fn show_accounts(
    phrase: &str,
    passphrase: &str,
    solana: u32,
    ethereum: u32,
    json: bool,
) -> Result<()> {
    let accounts = derive_accounts(phrase, passphrase, solana, ethereum)?;

    if json {
        let export = AccountExport {
            accounts: accounts.iter().map(AccountRecord::from).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    let info_style = Style::new().cyan();
    println!("\n{}", info_style.apply_to("Derived Accounts:").bold());

    let mut table = Table::new();
    table.add_row(row!["Name", "Chain", "Path", "Address"]);
    for account in &accounts {
        table.add_row(row![
            account.display_name,
            account.chain.ticker(),
            account.derivation_path,
            account.address
        ]);
    }
    table.printstd();

    println!("\n{} {} account(s) derived", info_style.apply_to("ℹ️"), accounts.len());
    Ok(())
}
