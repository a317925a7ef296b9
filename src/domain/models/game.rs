//! Per-game metadata record.
//!
//! One `metadata.json` lives in every game's working directory. It holds the
//! descriptive fields written at scaffolding time and the session bookkeeping
//! that the session policy reads and rewrites once per improvement request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// Name of the metadata file inside a game's working directory.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Explicit declaration of the room handler a game's server module exports.
///
/// Scaffolding writes this into metadata so the handler registry never has to
/// guess an export by naming convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerDescriptor {
    /// Room name the handler is registered under
    pub room_name: String,
    /// Server module (relative to the game directory) exporting the handler
    pub module: String,
}

impl HandlerDescriptor {
    /// Descriptor for `room_name` exported by `module`.
    pub fn new(room_name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            room_name: room_name.into(),
            module: module.into(),
        }
    }
}

/// Session bookkeeping and descriptive fields for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMetadata {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Free-text description given at scaffolding time
    #[serde(default)]
    pub description: String,

    /// When the game was scaffolded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Declared room handler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<HandlerDescriptor>,

    /// Resumable agent session; absent means nothing can be resumed
    #[serde(default)]
    pub session_token: Option<String>,

    /// True once any agent session has been established
    #[serde(default)]
    pub has_active_session: bool,

    /// Lifetime number of improvements applied
    #[serde(default)]
    pub improvement_count: u64,

    /// Completion time of the most recent improvement attempt
    #[serde(default)]
    pub last_improvement_at: Option<DateTime<Utc>>,

    /// Last observed reusable context size, in tokens
    #[serde(default)]
    pub context_size: u64,

    /// Cost in USD of the most recent invocation
    #[serde(default)]
    pub last_improvement_cost: f64,

    /// Improvements applied inside the current resumable session
    #[serde(default)]
    pub session_improvement_count: u64,

    /// Fields owned by other components, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GameMetadata {
    /// Create the record written at scaffolding time, with empty session fields.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            created_at: Some(Utc::now()),
            handler: None,
            session_token: None,
            has_active_session: false,
            improvement_count: 0,
            last_improvement_at: None,
            context_size: 0,
            last_improvement_cost: 0.0,
            session_improvement_count: 0,
            extra: serde_json::Map::new(),
        }
    }

    /// Attach a handler descriptor.
    pub fn with_handler(mut self, handler: HandlerDescriptor) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Parse a metadata document read from disk.
    pub fn from_json(game_id: &str, raw: &str) -> DomainResult<Self> {
        let metadata: Self =
            serde_json::from_str(raw).map_err(|e| DomainError::MetadataCorrupt {
                game_id: game_id.to_string(),
                reason: e.to_string(),
            })?;

        if !metadata.last_improvement_cost.is_finite() || metadata.last_improvement_cost < 0.0 {
            return Err(DomainError::MetadataCorrupt {
                game_id: game_id.to_string(),
                reason: format!(
                    "lastImprovementCost must be a non-negative number, got {}",
                    metadata.last_improvement_cost
                ),
            });
        }

        Ok(metadata)
    }

    /// Pretty-printed JSON with a trailing newline.
    pub fn to_json(&self) -> DomainResult<String> {
        let body = serde_json::to_string_pretty(self)?;
        Ok(format!("{body}\n"))
    }

    /// Whether a resumable session token is present.
    pub fn has_resumable_session(&self) -> bool {
        self.session_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Validate a game identifier before it is used as a directory name.
pub fn validate_game_id(game_id: &str) -> DomainResult<()> {
    let valid = !game_id.is_empty()
        && game_id.len() <= 128
        && game_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(DomainError::InvalidGameId(game_id.to_string()))
    }
}
