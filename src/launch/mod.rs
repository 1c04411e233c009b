pub mod metadata;
pub mod pipeline;
pub mod session;
pub mod validator;

pub use pipeline::{ConfirmationPolicy, PipelineOptions, TransactionPipeline};
pub use session::{LaunchSession, SessionStatus, StepKind, StepStatus, TransactionStep};
pub use validator::LaunchRequestValidator;
