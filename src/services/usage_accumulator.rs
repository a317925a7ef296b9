//! Folds an agent's streamed events into an [`InvocationOutcome`].

use crate::domain::models::{AgentEvent, InvocationOutcome};

/// Running totals for one agent invocation.
#[derive(Debug, Default)]
pub struct UsageAccumulator {
    outcome: InvocationOutcome,
}

impl UsageAccumulator {
    /// Accumulator with nothing observed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one streamed event.
    ///
    /// Only assistant steps move the context-size signal: the usage on the
    /// final result event is a sum over every turn, not the size of the
    /// context a resumed session would carry.
    pub fn observe(&mut self, event: &AgentEvent) {
        if let Some(session_id) = event.session_id() {
            if self.outcome.session_id.as_deref() != Some(session_id) {
                tracing::debug!(session_id, event = event.kind(), "agent session id observed");
                self.outcome.session_id = Some(session_id.to_string());
            }
        }

        match event {
            AgentEvent::SystemInit { .. } => {}
            AgentEvent::AssistantStep { usage, .. } => {
                self.outcome.turns += 1;
                self.outcome.input_tokens += usage.input_tokens;
                self.outcome.output_tokens += usage.output_tokens;
                if let Some(cache_read) = usage.cache_read_input_tokens {
                    self.outcome.last_cache_read_tokens = Some(cache_read);
                }
            }
            AgentEvent::Result {
                subtype,
                total_cost_usd,
                ..
            } => {
                self.outcome.total_cost_usd = Some(*total_cost_usd);
                self.outcome.subtype = Some(subtype.clone());
            }
        }
    }

    /// The outcome of the finished stream.
    pub fn finish(self) -> InvocationOutcome {
        self.outcome
    }
}
