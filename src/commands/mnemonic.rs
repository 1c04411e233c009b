use anyhow::{anyhow, Result};
use console::Style;

use crate::wallet::mnemonic::{bits_for_word_count, MnemonicManager};

/// Generate a fresh recovery phrase and print it once.
pub fn generate_mnemonic(words: usize) -> Result<()> {
    let info_style = Style::new().cyan();
    let warn_style = Style::new().yellow().bold();

    let bits = bits_for_word_count(words)
        .ok_or_else(|| anyhow!("Unsupported word count {} (use 12, 15, 18, 21 or 24)", words))?;
    let mnemonic = MnemonicManager::new().generate(bits)?;

    println!("\n{}", info_style.apply_to(format!("🔑 New {}-word recovery phrase:", words)).bold());
    for (i, word) in mnemonic.words().iter().enumerate() {
        println!("  {:>2}. {}", i + 1, word);
    }
    println!(
        "\n{}",
        warn_style.apply_to("⚠️ Write these words down and keep them offline. Anyone with them controls every derived account.")
    );
    Ok(())
}

/// Prints whether `phrase` passes the wordlist and checksum check.
pub fn validate_mnemonic(phrase: &str) -> Result<bool> {
    let valid = MnemonicManager::new().validate(phrase);
    if valid {
        println!("{} Recovery phrase is valid", Style::new().green().bold().apply_to("✓"));
    } else {
        println!("{} Recovery phrase is NOT valid", Style::new().red().bold().apply_to("✗"));
    }
    Ok(valid)
}
