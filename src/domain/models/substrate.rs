//! Agent substrate domain models.
//!
//! A substrate is the coding agent backend that edits a game's sources. The
//! primary substrate is the Claude Code CLI; tests use a scripted mock.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tools the agent may use while improving a game.
pub const DEFAULT_ALLOWED_TOOLS: &[&str] = &["Read", "MultiEdit", "Bash"];

/// Token usage reported on an agent event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Uncached input tokens
    pub input_tokens: u64,
    /// Generated tokens
    pub output_tokens: u64,
    /// Tokens written to the prompt cache, when reported
    #[serde(default)]
    pub cache_creation_input_tokens: Option<u64>,
    /// Tokens served from the prompt cache, when reported
    #[serde(default)]
    pub cache_read_input_tokens: Option<u64>,
}

impl TokenUsage {
    /// Usage with no cache figures.
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            cache_creation_input_tokens: None,
            cache_read_input_tokens: None,
        }
    }
}

/// How the agent's run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSubtype {
    /// The agent finished normally
    Success,
    /// The iteration cap was hit; still a completed run
    ErrorMaxTurns,
    /// The agent aborted with an error
    ErrorDuringExecution,
    /// Any subtype this version does not know
    Other(String),
}

impl ResultSubtype {
    /// Map a stream-json subtype string.
    pub fn parse(s: &str) -> Self {
        match s {
            "success" => Self::Success,
            "error_max_turns" => Self::ErrorMaxTurns,
            "error_during_execution" => Self::ErrorDuringExecution,
            other => Self::Other(other.to_string()),
        }
    }

    /// Stream-json spelling of the subtype.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::ErrorMaxTurns => "error_max_turns",
            Self::ErrorDuringExecution => "error_during_execution",
            Self::Other(s) => s,
        }
    }
}

/// One progress event streamed back from the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentEvent {
    /// The agent announced its session
    SystemInit {
        /// Session the agent started or resumed
        session_id: Option<String>,
    },
    /// One assistant turn finished
    AssistantStep {
        /// Usage for this turn
        usage: TokenUsage,
        /// Session the turn belongs to
        session_id: Option<String>,
    },
    /// Final outcome of the run
    Result {
        /// How the run ended
        subtype: ResultSubtype,
        /// Cost of the whole run in USD
        total_cost_usd: f64,
        /// Aggregate usage for the run
        usage: TokenUsage,
        /// Session the run belongs to
        session_id: Option<String>,
    },
}

impl AgentEvent {
    /// Session identifier carried by this event, if any.
    pub fn session_id(&self) -> Option<&str> {
        let id = match self {
            Self::SystemInit { session_id }
            | Self::AssistantStep { session_id, .. }
            | Self::Result { session_id, .. } => session_id.as_deref(),
        };
        id.filter(|s| !s.is_empty())
    }

    /// Event kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SystemInit { .. } => "system_init",
            Self::AssistantStep { .. } => "assistant_step",
            Self::Result { .. } => "result",
        }
    }
}

/// Request to invoke the agent against a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRequest {
    /// Free-text improvement instruction
    pub instruction: String,
    /// Game working directory the agent is scoped to
    pub working_dir: PathBuf,
    /// Upper bound on agent iterations
    pub max_turns: u32,
    /// Tool allowlist
    pub allowed_tools: Vec<String>,
    /// Session to resume, if the policy chose to resume
    pub resume_token: Option<String>,
    /// Model override
    pub model: Option<String>,
}

impl AgentRequest {
    /// Request with default turns and tools.
    pub fn new(instruction: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            instruction: instruction.into(),
            working_dir: working_dir.into(),
            max_turns: 25,
            allowed_tools: DEFAULT_ALLOWED_TOOLS.iter().map(|t| (*t).to_string()).collect(),
            resume_token: None,
            model: None,
        }
    }

    /// Set the iteration cap.
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Replace the tool allowlist.
    pub fn with_allowed_tools(mut self, tools: Vec<String>) -> Self {
        self.allowed_tools = tools;
        self
    }

    /// Resume `token` when set.
    pub fn with_resume(mut self, token: Option<String>) -> Self {
        self.resume_token = token;
        self
    }

    /// Override the model when set.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }
}

/// Everything learned from one completed agent run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationOutcome {
    /// Session id the agent reported, if any
    pub session_id: Option<String>,
    /// Cache-read size from the last assistant step that reported one
    pub last_cache_read_tokens: Option<u64>,
    /// Total cost reported by the result event
    pub total_cost_usd: Option<f64>,
    /// Summed assistant-step input tokens
    pub input_tokens: u64,
    /// Summed assistant-step output tokens
    pub output_tokens: u64,
    /// Assistant steps observed
    pub turns: u32,
    /// Result subtype, if a result event arrived
    pub subtype: Option<ResultSubtype>,
}

impl InvocationOutcome {
    /// Cost to record for this run; zero when the agent never reported one.
    pub fn cost_usd(&self) -> f64 {
        self.total_cost_usd.unwrap_or(0.0)
    }

    /// Whether the agent stopped because it hit the turn cap.
    pub fn hit_max_turns(&self) -> bool {
        matches!(self.subtype, Some(ResultSubtype::ErrorMaxTurns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder() {
        let request = AgentRequest::new("add a scoreboard", "/tmp/games/tag")
            .with_max_turns(10)
            .with_resume(Some("abc".into()));

        assert_eq!(request.max_turns, 10);
        assert_eq!(request.resume_token.as_deref(), Some("abc"));
        assert_eq!(request.allowed_tools, vec!["Read", "MultiEdit", "Bash"]);
    }

    #[test]
    fn event_session_id_ignores_empty() {
        let event = AgentEvent::SystemInit {
            session_id: Some(String::new()),
        };
        assert_eq!(event.session_id(), None);

        let event = AgentEvent::AssistantStep {
            usage: TokenUsage::default(),
            session_id: Some("s-1".into()),
        };
        assert_eq!(event.session_id(), Some("s-1"));
        assert_eq!(event.kind(), "assistant_step");
    }

    #[test]
    fn subtype_parse() {
        assert_eq!(ResultSubtype::parse("success"), ResultSubtype::Success);
        assert_eq!(ResultSubtype::parse("error_max_turns"), ResultSubtype::ErrorMaxTurns);
        assert_eq!(
            ResultSubtype::parse("mystery"),
            ResultSubtype::Other("mystery".into())
        );
    }

    #[test]
    fn outcome_cost_defaults_to_zero() {
        let outcome = InvocationOutcome::default();
        assert!(outcome.cost_usd().abs() < f64::EPSILON);
        assert!(!outcome.hit_max_turns());
    }
}
