//! Session continuity decisions.
//!
//! A decision says whether the next agent invocation for a game resumes the
//! previous agent session or starts over, and carries the reason so that the
//! choice can be audited in logs and in `session show` output.

use serde::{Deserialize, Serialize};

/// Why the policy chose the directive it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// No improvement has completed yet, so there is no prior context
    FirstImprovement,
    /// No resumable session token is stored
    NoSessionToken,
    /// The upstream context cache is assumed expired
    SessionExpired,
    /// Too many improvements have been stacked on one session
    TooManyImprovements,
    /// The reusable context grew past the ceiling
    ContextTooLarge,
    /// The previous step was expensive enough to restart
    CostTooHigh,
    /// Every signal is within its limit
    WithinLimits,
}

impl DecisionReason {
    /// Human-readable reason text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstImprovement => "first improvement or no previous timestamp",
            Self::NoSessionToken => "no resumable session",
            Self::SessionExpired => "session expired",
            Self::TooManyImprovements => "session improvements exceed threshold",
            Self::ContextTooLarge => "context size exceeds threshold",
            Self::CostTooHigh => "last improvement cost exceeds threshold",
            Self::WithinLimits => "session within limits",
        }
    }

    /// Short machine-friendly code used in structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FirstImprovement => "first_improvement",
            Self::NoSessionToken => "no_session_token",
            Self::SessionExpired => "session_expired",
            Self::TooManyImprovements => "too_many_improvements",
            Self::ContextTooLarge => "context_too_large",
            Self::CostTooHigh => "cost_too_high",
            Self::WithinLimits => "within_limits",
        }
    }
}

impl std::fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with the agent session for the next invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "directive", rename_all = "snake_case")]
pub enum SessionDirective {
    /// Continue the stored agent session
    Resume {
        /// Token of the session to continue
        session_token: String,
    },
    /// Discard any stored session and start over
    Fresh,
}

impl SessionDirective {
    /// Lowercase directive name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resume { .. } => "resume",
            Self::Fresh => "fresh",
        }
    }

    /// Whether this starts a new session.
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh)
    }

    /// Token to hand to the agent, if resuming.
    pub fn resume_token(&self) -> Option<&str> {
        match self {
            Self::Resume { session_token } => Some(session_token),
            Self::Fresh => None,
        }
    }
}

/// Output of the pure decision step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDecision {
    /// Resume or start fresh
    pub directive: SessionDirective,
    /// Why the directive was chosen
    pub reason: DecisionReason,
}

impl SessionDecision {
    /// Resume `session_token` with every signal within limits.
    pub fn resume(session_token: impl Into<String>) -> Self {
        Self {
            directive: SessionDirective::Resume {
                session_token: session_token.into(),
            },
            reason: DecisionReason::WithinLimits,
        }
    }

    /// Start a fresh session for `reason`.
    pub fn fresh(reason: DecisionReason) -> Self {
        Self {
            directive: SessionDirective::Fresh,
            reason,
        }
    }
}
