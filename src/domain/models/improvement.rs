//! Results and projections returned to callers of the improvement service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::game::{GameMetadata, HandlerDescriptor};
use super::session::SessionDecision;

/// Outcome of one improvement request as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovementResult {
    /// Whether the improvement was applied and recorded
    pub success: bool,
    /// Human-readable summary
    pub message: String,
}

impl ImprovementResult {
    /// Successful result with `message`.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Failed result with `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Session fields of one game, plus what the policy would decide right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Game id
    pub game_id: String,
    /// Whether a resumable token is stored
    pub has_session_token: bool,
    /// Whether the game ever had an agent session
    pub has_active_session: bool,
    /// Lifetime improvements
    pub improvement_count: u64,
    /// Improvements in the current session
    pub session_improvement_count: u64,
    /// When the last improvement finished
    pub last_improvement_at: Option<DateTime<Utc>>,
    /// Last observed reusable context, in tokens
    pub context_size: u64,
    /// Cost of the last improvement in USD
    pub last_improvement_cost: f64,
    /// Decision the next improvement would get at query time
    pub next_decision: SessionDecision,
}

impl SessionInfo {
    /// Project `metadata` together with the next decision.
    pub fn project(game_id: &str, metadata: &GameMetadata, next_decision: SessionDecision) -> Self {
        Self {
            game_id: game_id.to_string(),
            has_session_token: metadata.has_resumable_session(),
            has_active_session: metadata.has_active_session,
            improvement_count: metadata.improvement_count,
            session_improvement_count: metadata.session_improvement_count,
            last_improvement_at: metadata.last_improvement_at,
            context_size: metadata.context_size,
            last_improvement_cost: metadata.last_improvement_cost,
            next_decision,
        }
    }
}

/// One row of the "list with sessions" query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSessionSummary {
    /// Game id
    pub game_id: String,
    /// Display name
    pub name: String,
    /// Short description
    pub description: String,
    /// Declared handler, if any
    pub handler: Option<HandlerDescriptor>,
    /// Whether the game ever had an agent session
    pub has_active_session: bool,
    /// Lifetime improvements
    pub improvement_count: u64,
    /// Improvements in the current session
    pub session_improvement_count: u64,
    /// When the last improvement finished
    pub last_improvement_at: Option<DateTime<Utc>>,
    /// Cost of the last improvement in USD
    pub last_improvement_cost: f64,
}

impl GameSessionSummary {
    /// Summarize one game record.
    pub fn from_metadata(game_id: &str, metadata: &GameMetadata) -> Self {
        Self {
            game_id: game_id.to_string(),
            name: metadata.name.clone(),
            description: metadata.description.clone(),
            handler: metadata.handler.clone(),
            has_active_session: metadata.has_active_session,
            improvement_count: metadata.improvement_count,
            session_improvement_count: metadata.session_improvement_count,
            last_improvement_at: metadata.last_improvement_at,
            last_improvement_cost: metadata.last_improvement_cost,
        }
    }
}
