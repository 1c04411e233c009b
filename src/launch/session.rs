//! One launch attempt: its ephemeral mint identity, its steps and the state
//! machine that orders them.

use std::fmt;

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
};
use uuid::Uuid;

use crate::errors::{LaunchpadError, Result};
use crate::models::token::{StepReceipt, TokenLaunchRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StepKind {
    CreateMint,
    CreateHoldingAccount,
    MintSupply,
}

impl StepKind {
    pub const ALL: [StepKind; 3] = [
        StepKind::CreateMint,
        StepKind::CreateHoldingAccount,
        StepKind::MintSupply,
    ];

    /// 1-based position in the launch.
    pub fn ordinal(self) -> u8 {
        match self {
            StepKind::CreateMint => 1,
            StepKind::CreateHoldingAccount => 2,
            StepKind::MintSupply => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StepKind::CreateMint => "create mint",
            StepKind::CreateHoldingAccount => "create holding account",
            StepKind::MintSupply => "mint supply",
        }
    }

    pub fn next(self) -> Option<StepKind> {
        match self {
            StepKind::CreateMint => Some(StepKind::CreateHoldingAccount),
            StepKind::CreateHoldingAccount => Some(StepKind::MintSupply),
            StepKind::MintSupply => None,
        }
    }

    /// Later steps reference this step's account, so it always has to be
    /// confirmed before the session moves on.
    pub fn gates_later_steps(self) -> bool {
        self == StepKind::CreateMint
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} ({})", self.ordinal(), self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Pending,
    Submitted,
    Confirmed,
    Failed,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Pending => "pending",
            StepStatus::Submitted => "submitted (unconfirmed)",
            StepStatus::Confirmed => "confirmed",
            StepStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Validating,
    Building,
    Submitted(StepKind),
    Confirmed(StepKind),
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }

    /// Past `Building` but not finished.
    pub fn is_in_progress(self) -> bool {
        matches!(self, SessionStatus::Submitted(_) | SessionStatus::Confirmed(_))
    }

    fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Validating, Building) => true,
            (Building, Submitted(StepKind::CreateMint)) => true,
            (Submitted(a), Confirmed(b)) => a == b,
            (Confirmed(a), Submitted(b)) => a.next() == Some(b),
            // Only steps that do not gate later ones may be left unconfirmed.
            (Submitted(a), Submitted(b)) => !a.gates_later_steps() && a.next() == Some(b),
            (Confirmed(StepKind::MintSupply), Completed) => true,
            (Submitted(StepKind::MintSupply), Completed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Validating => f.write_str("validating"),
            SessionStatus::Building => f.write_str("building"),
            SessionStatus::Submitted(step) => write!(f, "step {} submitted", step.ordinal()),
            SessionStatus::Confirmed(step) => write!(f, "step {} confirmed", step.ordinal()),
            SessionStatus::Completed => f.write_str("completed"),
            SessionStatus::Failed => f.write_str("failed"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransactionStep {
    pub kind: StepKind,
    pub required_signers: Vec<Pubkey>,
    pub instructions: Vec<Instruction>,
    pub status: StepStatus,
    pub signature: Option<Signature>,
}

impl TransactionStep {
    pub fn new(kind: StepKind, required_signers: Vec<Pubkey>, instructions: Vec<Instruction>) -> Self {
        TransactionStep {
            kind,
            required_signers,
            instructions,
            status: StepStatus::Pending,
            signature: None,
        }
    }

    pub fn receipt(&self) -> StepReceipt {
        StepReceipt {
            step: self.kind,
            status: self.status,
            signature: self.signature,
        }
    }
}

/// Lives for exactly one attempt. A retry is a new session, and therefore a
/// new mint keypair.
pub struct LaunchSession {
    id: Uuid,
    request: TokenLaunchRequest,
    owner: Pubkey,
    mint_keypair: Option<Keypair>,
    steps: Vec<TransactionStep>,
    signatures: Vec<(StepKind, Signature)>,
    last_submitted: Option<u8>,
    status: SessionStatus,
    created_at: DateTime<Utc>,
}

impl LaunchSession {
    pub fn new(request: TokenLaunchRequest, owner: Pubkey) -> Self {
        LaunchSession {
            id: Uuid::new_v4(),
            request,
            owner,
            mint_keypair: None,
            steps: Vec::new(),
            signatures: Vec::new(),
            last_submitted: None,
            status: SessionStatus::Validating,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request(&self) -> &TokenLaunchRequest {
        &self.request
    }

    pub fn owner(&self) -> Pubkey {
        self.owner
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn steps(&self) -> &[TransactionStep] {
        &self.steps
    }

    pub fn step(&self, kind: StepKind) -> Option<&TransactionStep> {
        self.steps.iter().find(|s| s.kind == kind)
    }

    pub fn signatures(&self) -> &[(StepKind, Signature)] {
        &self.signatures
    }

    pub fn receipts(&self) -> Vec<StepReceipt> {
        self.steps.iter().map(TransactionStep::receipt).collect()
    }

    /// Mint address, once `Building` has generated it.
    pub fn mint(&self) -> Option<Pubkey> {
        self.mint_keypair.as_ref().map(|k| k.pubkey())
    }

    pub fn mint_keypair(&self) -> Result<&Keypair> {
        self.mint_keypair.as_ref().ok_or_else(|| {
            LaunchpadError::Invariant("mint keypair requested before building".to_string())
        })
    }

    /// Ordinal of the last step whose transaction reached the network.
    /// A step rejected after submission still counts.
    pub fn last_submitted_step(&self) -> Option<u8> {
        self.last_submitted
    }

    pub fn unconfirmed_steps(&self) -> Vec<StepKind> {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Submitted)
            .map(|s| s.kind)
            .collect()
    }

    fn transition(&mut self, next: SessionStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(LaunchpadError::Invariant(format!(
                "illegal launch transition {} -> {}",
                self.status, next
            )));
        }
        debug!("Launch {}: {} -> {}", self.id, self.status, next);
        self.status = next;
        Ok(())
    }

    /// Enters `Building` and generates the mint identity for this attempt.
    pub fn begin_building(&mut self) -> Result<Pubkey> {
        self.transition(SessionStatus::Building)?;
        let keypair = Keypair::new();
        let mint = keypair.pubkey();
        self.mint_keypair = Some(keypair);
        Ok(mint)
    }

    /// Records a built step. Steps must be added in launch order.
    pub fn push_step(&mut self, step: TransactionStep) -> Result<()> {
        let expected = match self.steps.last() {
            None => Some(StepKind::CreateMint),
            Some(last) => last.kind.next(),
        };
        if expected != Some(step.kind) {
            return Err(LaunchpadError::Invariant(format!(
                "{} built out of order",
                step.kind
            )));
        }
        self.steps.push(step);
        Ok(())
    }

    fn step_mut(&mut self, kind: StepKind) -> Result<&mut TransactionStep> {
        self.steps
            .iter_mut()
            .find(|s| s.kind == kind)
            .ok_or_else(|| LaunchpadError::Invariant(format!("{} was never built", kind)))
    }

    pub fn mark_submitted(&mut self, kind: StepKind, signature: Signature) -> Result<()> {
        self.transition(SessionStatus::Submitted(kind))?;
        let step = self.step_mut(kind)?;
        step.status = StepStatus::Submitted;
        step.signature = Some(signature);
        self.signatures.push((kind, signature));
        self.last_submitted = Some(kind.ordinal());
        Ok(())
    }

    pub fn mark_confirmed(&mut self, kind: StepKind) -> Result<()> {
        self.transition(SessionStatus::Confirmed(kind))?;
        self.step_mut(kind)?.status = StepStatus::Confirmed;
        Ok(())
    }

    pub fn complete(&mut self) -> Result<()> {
        self.transition(SessionStatus::Completed)
    }

    /// Moves to `Failed`, marking `kind` failed unless it was already
    /// confirmed. Earlier steps keep their status.
    pub fn fail(&mut self, kind: Option<StepKind>) -> Result<()> {
        self.transition(SessionStatus::Failed)?;
        if let Some(kind) = kind {
            if let Some(step) = self.steps.iter_mut().find(|s| s.kind == kind) {
                if step.status != StepStatus::Confirmed {
                    step.status = StepStatus::Failed;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for LaunchSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchSession")
            .field("id", &self.id)
            .field("symbol", &self.request.symbol())
            .field("mint", &self.mint())
            .field("status", &self.status)
            .field("steps", &self.receipts())
            .finish()
    }
}
