mod common;

use std::collections::HashSet;
use std::sync::Arc;

use launchpad_wallet::launch::{ConfirmationPolicy, TransactionPipeline};
use launchpad_wallet::wallet::ethereum::is_valid_address;
use launchpad_wallet::wallet::{
    AccountRegistry, ChainKind, KeyDerivationEngine, KeypairWallet, MnemonicManager, Seed,
};
use solana_sdk::signer::Signer;

const PHRASE: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

fn seed(passphrase: &str) -> Seed {
    MnemonicManager::new().parse(PHRASE).unwrap().to_seed(passphrase)
}

#[test]
fn same_seed_same_index_gives_same_keys() {
    let engine = KeyDerivationEngine::new();
    for chain in ChainKind::ALL {
        let a = engine.derive_keypair(&seed(""), chain, 3).unwrap();
        let b = KeyDerivationEngine::new().derive_keypair(&seed(""), chain, 3).unwrap();
        assert_eq!(a.address(), b.address());
        assert_eq!(a.secret_bytes(), b.secret_bytes());
    }
}

#[test]
fn indices_and_passphrases_give_distinct_keys() {
    let engine = KeyDerivationEngine::new();
    for chain in ChainKind::ALL {
        let addresses: HashSet<String> = (0..8)
            .map(|i| engine.derive_keypair(&seed(""), chain, i).unwrap().address())
            .collect();
        assert_eq!(addresses.len(), 8, "{} addresses collided", chain);

        let plain = engine.derive_keypair(&seed(""), chain, 0).unwrap();
        let salted = engine.derive_keypair(&seed("TREZOR"), chain, 0).unwrap();
        assert_ne!(plain.address(), salted.address());
    }
}

#[test]
fn one_seed_serves_both_chains() {
    let engine = KeyDerivationEngine::new();
    let seed = seed("");

    let solana = engine.derive_keypair(&seed, ChainKind::Solana, 0).unwrap();
    let ethereum = engine.derive_keypair(&seed, ChainKind::Ethereum, 0).unwrap();

    assert_eq!(solana.address_bytes().len(), 32);
    assert_eq!(ethereum.address_bytes().len(), 20);
    assert_eq!(solana.path().to_string(), "m/44'/501'/0'/0'");
    assert_eq!(ethereum.path().to_string(), "m/44'/60'/0'/0'");

    let sol = solana.as_solana().unwrap();
    assert_eq!(sol.address(), sol.pubkey().to_string());
    assert!(is_valid_address(&ethereum.address()));
    assert!(ethereum.address().starts_with("0x"));
}

#[test]
fn registry_hands_out_monotonic_indices_per_chain() {
    let registry = AccountRegistry::new();
    let engine = KeyDerivationEngine::new();
    let seed = seed("");

    for _ in 0..3 {
        registry.derive_next(&engine, &seed, ChainKind::Solana).unwrap();
    }
    registry.derive_next(&engine, &seed, ChainKind::Ethereum).unwrap();

    let solana: Vec<u32> = registry
        .accounts_for(ChainKind::Solana)
        .unwrap()
        .iter()
        .map(|a| a.derivation_index)
        .collect();
    assert_eq!(solana, vec![0, 1, 2]);
    assert_eq!(registry.next_index(ChainKind::Ethereum).unwrap(), 1);

    let third = &registry.accounts_for(ChainKind::Solana).unwrap()[2];
    let direct = engine.derive_keypair(&seed, ChainKind::Solana, 2).unwrap();
    assert_eq!(third.address, direct.address());
}

#[tokio::test]
async fn derived_solana_account_can_drive_a_launch() {
    let derived = KeyDerivationEngine::new()
        .derive_keypair(&seed(""), ChainKind::Solana, 0)
        .unwrap();
    let keypair = derived.as_solana().unwrap().keypair().insecure_clone();
    let owner = keypair.pubkey();

    let rpc = common::MockRpc::new();
    let wallet = Arc::new(KeypairWallet::new(keypair, rpc.clone()));
    wallet.connect();
    let pipeline = TransactionPipeline::new(
        rpc.clone(),
        wallet,
        common::fast_options(ConfirmationPolicy::EveryStep),
    );

    let result = pipeline.execute(&common::demo_input()).await.unwrap();
    assert_eq!(result.owner, owner);
    assert!(rpc.submitted().iter().all(|tx| tx.message.account_keys[0] == owner));
}
