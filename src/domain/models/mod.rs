//! Domain models: game records, session decisions, agent events and config.

pub mod config;
pub mod game;
pub mod improvement;
pub mod session;
pub mod substrate;
pub mod verification;

pub use config::{
    AgentConfig, Config, LogFormat, LoggingConfig, RotationPolicy, SessionPolicyConfig,
    VerifierConfig,
};
pub use game::{validate_game_id, GameMetadata, HandlerDescriptor, METADATA_FILE_NAME};
pub use improvement::{GameSessionSummary, ImprovementResult, SessionInfo};
pub use session::{DecisionReason, SessionDecision, SessionDirective};
pub use substrate::{
    AgentEvent, AgentRequest, InvocationOutcome, ResultSubtype, TokenUsage,
    DEFAULT_ALLOWED_TOOLS,
};
pub use verification::VerificationOutcome;
