//! Sequencing of the three launch transactions.
//!
//! Steps run strictly one after another. Each step is built by a pure
//! function in [`crate::token_instruction_builders`], then signed by the
//! wallet and submitted; whether the pipeline waits for confirmation before
//! the next step is decided by [`ConfirmationPolicy`]. A failure stops the
//! session where it is. Nothing already on chain is rolled back.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::{error, info, warn};
use solana_sdk::{
    instruction::Instruction, packet::PACKET_DATA_SIZE, pubkey::Pubkey, transaction::Transaction,
};
use tokio::sync::{mpsc::UnboundedSender, Mutex};

use crate::errors::{LaunchError, LaunchpadError, Result, ValidationError};
use crate::launch::metadata::{mint_space, PackedTokenMetadata};
use crate::launch::session::{LaunchSession, StepKind, TransactionStep};
use crate::launch::validator::LaunchRequestValidator;
use crate::models::token::{LaunchInput, LaunchResult, TokenLaunchRequest};
use crate::models::LaunchStatus;
use crate::token_instruction_builders::{
    build_create_holding_account_instructions, build_create_mint_instructions,
    build_mint_supply_instructions, holding_account_address, CreateMintParams,
};
use crate::utils::rpc::ChainRpc;
use crate::utils::transaction::{
    add_priority_fee, await_confirmation, ensure_fits_in_packet, serialized_size, ConfirmOptions,
};
use crate::wallet::adapter::WalletAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmationPolicy {
    /// Wait for every step to be confirmed before moving on.
    #[default]
    EveryStep,
    /// Only wait for step 1; later steps are reported as unconfirmed.
    FirstStepOnly,
}

impl ConfirmationPolicy {
    pub fn awaits(self, step: StepKind) -> bool {
        match self {
            ConfirmationPolicy::EveryStep => true,
            ConfirmationPolicy::FirstStepOnly => step.gates_later_steps(),
        }
    }
}

impl fmt::Display for ConfirmationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmationPolicy::EveryStep => f.write_str("every-step"),
            ConfirmationPolicy::FirstStepOnly => f.write_str("first-step-only"),
        }
    }
}

impl FromStr for ConfirmationPolicy {
    type Err = LaunchpadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "every-step" | "all" => Ok(ConfirmationPolicy::EveryStep),
            "first-step-only" | "first" => Ok(ConfirmationPolicy::FirstStepOnly),
            other => Err(LaunchpadError::Config(format!(
                "Unknown confirmation policy '{}' (expected every-step or first-step-only)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineOptions {
    pub confirmation_policy: ConfirmationPolicy,
    pub confirm: ConfirmOptions,
    /// Compute-unit price prepended to every step; 0 disables it.
    pub priority_fee_micro_lamports: u64,
}

pub struct TransactionPipeline {
    rpc: Arc<dyn ChainRpc>,
    wallet: Arc<dyn WalletAdapter>,
    validator: LaunchRequestValidator,
    options: PipelineOptions,
    status_sender: Option<UnboundedSender<LaunchStatus>>,
    // The wallet signs for one launch at a time.
    signing_lane: Mutex<()>,
}

impl TransactionPipeline {
    pub fn new(rpc: Arc<dyn ChainRpc>, wallet: Arc<dyn WalletAdapter>, options: PipelineOptions) -> Self {
        TransactionPipeline {
            rpc,
            wallet,
            validator: LaunchRequestValidator::new(),
            options,
            status_sender: None,
            signing_lane: Mutex::new(()),
        }
    }

    pub fn with_status_sender(mut self, sender: UnboundedSender<LaunchStatus>) -> Self {
        self.status_sender = Some(sender);
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    fn emit(&self, status: LaunchStatus) {
        if let Some(sender) = &self.status_sender {
            // A dropped receiver only means nobody is watching.
            let _ = sender.send(status);
        }
    }

    /// Checks the wallet, validates `input` and runs a fresh session.
    pub async fn execute(&self, input: &LaunchInput) -> std::result::Result<LaunchResult, LaunchError> {
        self.emit(LaunchStatus::Starting);
        let mut session = self.begin(input).map_err(|e| {
            self.emit(LaunchStatus::Failure(e.to_string()));
            LaunchError::before_session(e)
        })?;
        self.run(&mut session).await
    }

    /// Runs a request that was validated elsewhere in a fresh session.
    pub async fn execute_request(
        &self,
        request: TokenLaunchRequest,
    ) -> std::result::Result<LaunchResult, LaunchError> {
        let owner = self.connected_owner().map_err(LaunchError::before_session)?;
        self.check_create_mint_size(&request, &owner)
            .map_err(LaunchError::before_session)?;
        let mut session = LaunchSession::new(request, owner);
        self.run(&mut session).await
    }

    /// Precondition and validation checks, producing a new session in
    /// `Validating`. No network access happens here.
    pub fn begin(&self, input: &LaunchInput) -> Result<LaunchSession> {
        let owner = self.connected_owner()?;
        let request = self.validator.validate(input)?;
        self.check_create_mint_size(&request, &owner)?;
        self.emit(LaunchStatus::Validated {
            symbol: request.symbol().to_string(),
            base_units: request.base_units(),
        });
        Ok(LaunchSession::new(request, owner))
    }

    /// Builds step 1 against a placeholder mint so metadata that cannot fit
    /// in one transaction is refused before a mint exists or rent is fetched.
    fn check_create_mint_size(&self, request: &TokenLaunchRequest, owner: &Pubkey) -> Result<()> {
        let mut instructions = create_mint_instructions(request, owner, &Pubkey::default(), 0)?;
        add_priority_fee(&mut instructions, self.options.priority_fee_micro_lamports);
        let size = serialized_size(&Transaction::new_with_payer(&instructions, Some(owner)))?;
        if size > PACKET_DATA_SIZE {
            return Err(ValidationError::MetadataTooLarge {
                size,
                limit: PACKET_DATA_SIZE,
            }
            .into());
        }
        Ok(())
    }

    fn connected_owner(&self) -> Result<Pubkey> {
        if !self.wallet.is_connected() {
            return Err(LaunchpadError::WalletNotConnected);
        }
        self.wallet.public_key().ok_or(LaunchpadError::WalletNotConnected)
    }

    /// Drives `session` to `Completed` or `Failed`. The session is left in its
    /// final state for the caller to inspect.
    pub async fn run(&self, session: &mut LaunchSession) -> std::result::Result<LaunchResult, LaunchError> {
        let _lane = self.signing_lane.lock().await;

        match self.run_steps(session).await {
            Ok(result) => {
                info!(
                    "Launch {} completed: mint {} holding {}",
                    session.id(),
                    result.mint,
                    result.holding_account
                );
                self.emit(LaunchStatus::Completed {
                    mint: result.mint,
                    holding_account: result.holding_account,
                });
                Ok(result)
            }
            Err((failed_step, source)) => {
                error!(
                    "Launch {} failed{}: {}",
                    session.id(),
                    failed_step.map(|s| format!(" at {}", s)).unwrap_or_default(),
                    source
                );
                if let Err(e) = session.fail(failed_step) {
                    warn!("Could not mark launch {} failed: {}", session.id(), e);
                }
                self.emit(LaunchStatus::Failure(source.to_string()));
                Err(LaunchError {
                    failed_step,
                    last_submitted_step: session.last_submitted_step(),
                    mint: session.mint(),
                    signatures: session.signatures().to_vec(),
                    steps: session.receipts(),
                    source,
                })
            }
        }
    }

    async fn run_steps(
        &self,
        session: &mut LaunchSession,
    ) -> std::result::Result<LaunchResult, (Option<StepKind>, LaunchpadError)> {
        let mint = session.begin_building().map_err(|e| (None, e))?;
        let owner = session.owner();
        let holding = holding_account_address(&owner, &mint);
        info!("Launching {} with mint {}", session.request().symbol(), mint);
        self.emit(LaunchStatus::MintGenerated(mint));

        for kind in StepKind::ALL {
            self.run_step(session, kind, &mint, &holding)
                .await
                .map_err(|e| (Some(kind), e))?;
        }
        session.complete().map_err(|e| (None, e))?;

        Ok(LaunchResult {
            mint,
            holding_account: holding,
            owner,
            decimals: session.request().decimals(),
            base_units: session.request().base_units(),
            steps: session.receipts(),
            unconfirmed_steps: session.unconfirmed_steps(),
        })
    }

    async fn run_step(
        &self,
        session: &mut LaunchSession,
        kind: StepKind,
        mint: &Pubkey,
        holding: &Pubkey,
    ) -> Result<()> {
        self.emit(LaunchStatus::PreparingTx(kind));
        let owner = session.owner();

        let (mut instructions, signers) = match kind {
            StepKind::CreateMint => {
                let request = session.request();
                let metadata_len =
                    PackedTokenMetadata::new(&owner, mint, request.name(), request.symbol(), request.uri())
                        .tlv_len()?;
                let lamports = self.rpc.minimum_rent_exempt_balance(mint_space()? + metadata_len).await?;
                (create_mint_instructions(request, &owner, mint, lamports)?, vec![owner, *mint])
            }
            StepKind::CreateHoldingAccount => {
                (build_create_holding_account_instructions(&owner, mint), vec![owner])
            }
            StepKind::MintSupply => (
                build_mint_supply_instructions(&owner, mint, holding, session.request().base_units())?,
                vec![owner],
            ),
        };
        add_priority_fee(&mut instructions, self.options.priority_fee_micro_lamports);

        let blockhash = self.rpc.latest_blockhash().await?;
        let mut transaction = Transaction::new_with_payer(&instructions, Some(&owner));
        transaction.message.recent_blockhash = blockhash;
        if kind == StepKind::CreateMint {
            let mint_keypair = session.mint_keypair()?;
            transaction.try_partial_sign(&[mint_keypair], blockhash)?;
        }
        let size = ensure_fits_in_packet(&transaction)?;
        self.emit(LaunchStatus::Log(format!(
            "{} built: {} instruction(s), {} bytes",
            kind,
            instructions.len(),
            size
        )));
        session.push_step(TransactionStep::new(kind, signers, instructions))?;

        info!("Submitting {} ({} bytes)...", kind, size);
        let signature = self.wallet.sign_and_send(transaction).await?;
        session.mark_submitted(kind, signature)?;
        self.emit(LaunchStatus::Submitted(kind, signature));

        if self.options.confirmation_policy.awaits(kind) {
            await_confirmation(self.rpc.as_ref(), &signature, self.options.confirm).await?;
            session.mark_confirmed(kind)?;
            info!("{} confirmed: {}", kind, signature);
            self.emit(LaunchStatus::Confirmed(kind, signature));
        } else {
            warn!("{} submitted without waiting for confirmation: {}", kind, signature);
            self.emit(LaunchStatus::Unconfirmed(kind, signature));
        }
        Ok(())
    }
}

fn create_mint_instructions(
    request: &TokenLaunchRequest,
    owner: &Pubkey,
    mint: &Pubkey,
    lamports: u64,
) -> Result<Vec<Instruction>> {
    build_create_mint_instructions(&CreateMintParams {
        payer: owner,
        mint,
        decimals: request.decimals(),
        name: request.name(),
        symbol: request.symbol(),
        uri: request.uri(),
        space: mint_space()?,
        lamports,
    })
}
