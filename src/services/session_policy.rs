//! Session continuity policy.
//!
//! Decides whether an improvement resumes the game's previous agent session
//! or starts fresh, and computes the metadata record before and after the
//! agent runs. Everything here is pure: time is passed in, nothing is
//! persisted, and the same inputs always give the same outputs.

use chrono::{DateTime, Duration, Utc};

use crate::domain::models::{
    DecisionReason, GameMetadata, InvocationOutcome, SessionDecision, SessionDirective,
    SessionPolicyConfig,
};

/// Cost-aware session reuse rules.
#[derive(Debug, Clone, Default)]
pub struct SessionPolicy {
    config: SessionPolicyConfig,
}

impl SessionPolicy {
    /// Policy with the given thresholds.
    pub fn new(config: SessionPolicyConfig) -> Self {
        Self { config }
    }

    /// Decide between resuming and starting fresh.
    ///
    /// Any single crossed threshold forces a fresh session. Conditions are
    /// checked in a fixed order and the first one that holds is reported:
    ///
    /// 1. no completed improvement yet (no timestamp)
    /// 2. no session token
    /// 3. idle longer than `max_idle_minutes`
    /// 4. `session_improvement_count >= max_session_improvements`
    /// 5. `context_size > max_context_tokens`
    /// 6. `last_improvement_cost > max_improvement_cost_usd`
    ///
    /// A brand-new game has neither a timestamp nor a token; it is reported
    /// as a first improvement.
    pub fn decide(&self, metadata: &GameMetadata, now: DateTime<Utc>) -> SessionDecision {
        let Some(last_improvement_at) = metadata.last_improvement_at else {
            return SessionDecision::fresh(DecisionReason::FirstImprovement);
        };

        let Some(token) = metadata.session_token.as_deref().filter(|t| !t.is_empty()) else {
            return SessionDecision::fresh(DecisionReason::NoSessionToken);
        };

        // A window too large for chrono never expires
        let idle_limit = Duration::try_minutes(self.config.max_idle_minutes);
        if idle_limit.is_some_and(|limit| now - last_improvement_at > limit) {
            return SessionDecision::fresh(DecisionReason::SessionExpired);
        }

        if metadata.session_improvement_count >= self.config.max_session_improvements {
            return SessionDecision::fresh(DecisionReason::TooManyImprovements);
        }

        if metadata.context_size > self.config.max_context_tokens {
            return SessionDecision::fresh(DecisionReason::ContextTooLarge);
        }

        if metadata.last_improvement_cost > self.config.max_improvement_cost_usd {
            return SessionDecision::fresh(DecisionReason::CostTooHigh);
        }

        SessionDecision::resume(token)
    }

    /// Record to carry into the invocation.
    ///
    /// A fresh decision drops the stored token and restarts the in-session
    /// counter; a resume leaves the record as it was.
    pub fn prepare(&self, metadata: &GameMetadata, decision: &SessionDecision) -> GameMetadata {
        let mut prepared = metadata.clone();
        if decision.directive.is_fresh() {
            prepared.session_token = None;
            prepared.session_improvement_count = 0;
        }
        prepared
    }

    /// Fold a completed invocation into the record.
    ///
    /// `pre` is the record returned by [`prepare`](Self::prepare). Cost and
    /// context size are overwritten, never summed. When the run reported no
    /// cache-read signal the previous context size is kept as is.
    pub fn reconcile(
        &self,
        pre: &GameMetadata,
        decision: &SessionDecision,
        outcome: &InvocationOutcome,
        now: DateTime<Utc>,
    ) -> GameMetadata {
        let mut next = pre.clone();

        next.improvement_count = pre.improvement_count.saturating_add(1);
        next.has_active_session = true;
        next.last_improvement_at = Some(now);
        next.last_improvement_cost = outcome.cost_usd();

        match &decision.directive {
            SessionDirective::Fresh => {
                next.session_improvement_count = 1;
                next.session_token = outcome.session_id.clone();
            }
            SessionDirective::Resume { .. } => {
                next.session_improvement_count = pre.session_improvement_count.saturating_add(1);
            }
        }

        if let Some(cache_read) = outcome.last_cache_read_tokens {
            next.context_size = cache_read;
        }

        next
    }
}
