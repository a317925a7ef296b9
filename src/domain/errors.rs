//! Domain errors for the playforge improvement pipeline.

use thiserror::Error;

/// Domain-level errors that can occur while improving a game.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No working directory exists for the game id
    #[error("Game not found: {0}")]
    GameNotFound(String),

    /// The game id is not a safe directory name
    #[error("Invalid game id '{0}': only ASCII letters, digits, '-' and '_' are allowed")]
    InvalidGameId(String),

    /// Registration found an existing metadata record
    #[error("Game already exists: {0}")]
    GameAlreadyExists(String),

    /// `metadata.json` exists but could not be parsed
    #[error("Metadata for game {game_id} is unreadable: {reason}")]
    MetadataCorrupt {
        /// Game whose record is unreadable
        game_id: String,
        /// Parser error
        reason: String,
    },

    /// Another improvement holds the game
    #[error("An improvement is already in progress for game {0}")]
    ImprovementInProgress(String),

    /// The agent could not be started or failed before finishing
    #[error("Agent invocation failed: {0}")]
    AgentFailed(String),

    /// The post-edit checker could not be run
    #[error("Verifier could not run: {0}")]
    VerifierUnavailable(String),

    /// The game has no handler descriptor to register
    #[error("Game {0} does not declare a handler in its metadata")]
    HandlerNotDeclared(String),

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON encoding or decoding failure
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
