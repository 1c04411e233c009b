use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_instruction};
use spl_associated_token_account::{
    get_associated_token_address_with_program_id, instruction::create_associated_token_account,
};
use spl_token_2022::{
    extension::metadata_pointer,
    instruction::{initialize_mint, mint_to},
    ID as TOKEN_2022_PROGRAM_ID,
};
use log::debug;

use crate::errors::Result;

/// Parameters for the identity-account bundle of step 1.
#[derive(Debug, Clone)]
pub struct CreateMintParams<'a> {
    /// The wallet: pays, owns mint authority and metadata update authority.
    pub payer: &'a Pubkey,
    pub mint: &'a Pubkey,
    pub decimals: u8,
    pub name: &'a str,
    pub symbol: &'a str,
    pub uri: &'a str,
    /// Bytes allocated by the create-account instruction.
    pub space: usize,
    /// Rent for `space` plus the metadata the token program appends later.
    pub lamports: u64,
}

/// Step 1: create account, metadata pointer, mint, metadata. Order matters:
/// the pointer must be initialised before the mint, the metadata after it.
pub fn build_create_mint_instructions(params: &CreateMintParams<'_>) -> Result<Vec<Instruction>> {
    let CreateMintParams { payer, mint, decimals, name, symbol, uri, space, lamports } = *params;
    debug!(
        "Building create-mint bundle: mint={} space={} lamports={}",
        mint, space, lamports
    );

    Ok(vec![
        system_instruction::create_account(
            payer,
            mint,
            lamports,
            space as u64,
            &TOKEN_2022_PROGRAM_ID,
        ),
        metadata_pointer::instruction::initialize(
            &TOKEN_2022_PROGRAM_ID,
            mint,
            Some(*payer),
            Some(*mint),
        )?,
        initialize_mint(&TOKEN_2022_PROGRAM_ID, mint, payer, None, decimals)?,
        spl_token_metadata_interface::instruction::initialize(
            &TOKEN_2022_PROGRAM_ID,
            mint,
            payer,
            mint,
            payer,
            name.to_string(),
            symbol.to_string(),
            uri.to_string(),
        ),
    ])
}

/// Step 2: the owner's associated token account for `mint`.
pub fn build_create_holding_account_instructions(owner: &Pubkey, mint: &Pubkey) -> Vec<Instruction> {
    vec![create_associated_token_account(
        owner,
        owner,
        mint,
        &TOKEN_2022_PROGRAM_ID,
    )]
}

/// Step 3: mint `amount` base units into `holding`, authorised by `owner`.
pub fn build_mint_supply_instructions(
    owner: &Pubkey,
    mint: &Pubkey,
    holding: &Pubkey,
    amount: u64,
) -> Result<Vec<Instruction>> {
    Ok(vec![mint_to(
        &TOKEN_2022_PROGRAM_ID,
        mint,
        holding,
        owner,
        &[],
        amount,
    )?])
}

/// Deterministic holding account for (owner, mint) under Token-2022.
pub fn holding_account_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(owner, mint, &TOKEN_2022_PROGRAM_ID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::system_instruction::SystemInstruction;
    use spl_token_2022::instruction::TokenInstruction;

    fn params<'a>(payer: &'a Pubkey, mint: &'a Pubkey) -> CreateMintParams<'a> {
        CreateMintParams {
            payer,
            mint,
            decimals: 6,
            name: "Demo",
            symbol: "DMO",
            uri: "https://example.com/demo.json",
            space: 234,
            lamports: 3_000_000,
        }
    }

    #[test]
    fn create_mint_bundle_is_ordered_and_signed_by_payer_and_mint() {
        let payer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let ixs = build_create_mint_instructions(&params(&payer, &mint)).unwrap();

        assert_eq!(ixs.len(), 4);
        assert_eq!(ixs[0].program_id, solana_sdk::system_program::id());
        for ix in &ixs[1..] {
            assert_eq!(ix.program_id, TOKEN_2022_PROGRAM_ID);
        }

        match bincode::deserialize::<SystemInstruction>(&ixs[0].data).unwrap() {
            SystemInstruction::CreateAccount { lamports, space, owner } => {
                assert_eq!(lamports, 3_000_000);
                assert_eq!(space, 234);
                assert_eq!(owner, TOKEN_2022_PROGRAM_ID);
            }
            other => panic!("unexpected system instruction: {:?}", other),
        }

        let signers: Vec<Pubkey> = ixs[0]
            .accounts
            .iter()
            .filter(|meta| meta.is_signer)
            .map(|meta| meta.pubkey)
            .collect();
        assert_eq!(signers, vec![payer, mint]);

        match TokenInstruction::unpack(&ixs[2].data).unwrap() {
            TokenInstruction::InitializeMint { decimals, mint_authority, .. } => {
                assert_eq!(decimals, 6);
                assert_eq!(mint_authority, payer);
            }
            other => panic!("expected InitializeMint, got {:?}", other),
        }
    }

    #[test]
    fn holding_address_matches_program_derivation() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let (expected, _) = Pubkey::find_program_address(
            &[owner.as_ref(), TOKEN_2022_PROGRAM_ID.as_ref(), mint.as_ref()],
            &spl_associated_token_account::id(),
        );
        assert_eq!(holding_account_address(&owner, &mint), expected);

        let ixs = build_create_holding_account_instructions(&owner, &mint);
        assert_eq!(ixs.len(), 1);
        assert_eq!(ixs[0].program_id, spl_associated_token_account::id());
        assert_eq!(ixs[0].accounts[1].pubkey, expected);
    }

    #[test]
    fn mint_supply_carries_base_units() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let holding = holding_account_address(&owner, &mint);
        let ixs = build_mint_supply_instructions(&owner, &mint, &holding, 1_000_000_000).unwrap();

        assert_eq!(ixs.len(), 1);
        match TokenInstruction::unpack(&ixs[0].data).unwrap() {
            TokenInstruction::MintTo { amount } => assert_eq!(amount, 1_000_000_000),
            other => panic!("expected MintTo, got {:?}", other),
        }
        assert_eq!(ixs[0].accounts[0].pubkey, mint);
        assert_eq!(ixs[0].accounts[1].pubkey, holding);
        assert_eq!(ixs[0].accounts[2].pubkey, owner);
        assert!(ixs[0].accounts[2].is_signer);
    }
}
