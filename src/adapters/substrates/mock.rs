//! Mock substrate for testing.
//!
//! Plays back scripted event sequences instead of running an agent, and
//! records every request it receives.

use async_trait::async_trait;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AgentEvent, AgentRequest, ResultSubtype, TokenUsage};
use crate::domain::ports::{AgentEventStream, AgentSubstrate};

/// Scripted behaviour for one invocation.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Events streamed back in order
    pub events: Vec<AgentEvent>,
    /// Fail before streaming anything
    pub fail_on_invoke: Option<String>,
    /// Fail after streaming all `events`
    pub fail_mid_stream: Option<String>,
    /// Time the invocation takes before the stream is returned
    pub delay: Option<Duration>,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self::completed("mock-session", 0.01, Some(1_000))
    }
}

impl MockResponse {
    /// A normal run: init, one assistant step, then a successful result.
    pub fn completed(session_id: &str, cost_usd: f64, cache_read_tokens: Option<u64>) -> Self {
        let mut usage = TokenUsage::new(100, 50);
        usage.cache_read_input_tokens = cache_read_tokens;
        Self::from_events(vec![
            AgentEvent::SystemInit {
                session_id: Some(session_id.to_string()),
            },
            AgentEvent::AssistantStep {
                usage,
                session_id: Some(session_id.to_string()),
            },
            AgentEvent::Result {
                subtype: ResultSubtype::Success,
                total_cost_usd: cost_usd,
                usage: TokenUsage::new(100, 50),
                session_id: Some(session_id.to_string()),
            },
        ])
    }

    /// Stream exactly `events` and finish.
    pub fn from_events(events: Vec<AgentEvent>) -> Self {
        Self {
            events,
            fail_on_invoke: None,
            fail_mid_stream: None,
            delay: None,
        }
    }

    /// The agent cannot be started at all.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            events: vec![],
            fail_on_invoke: Some(error.into()),
            fail_mid_stream: None,
            delay: None,
        }
    }

    /// Stream `events`, then report an error instead of finishing.
    pub fn interrupted(events: Vec<AgentEvent>, error: impl Into<String>) -> Self {
        Self {
            events,
            fail_on_invoke: None,
            fail_mid_stream: Some(error.into()),
            delay: None,
        }
    }

    /// Make the invocation take `delay` before streaming.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Mock substrate for testing.
#[derive(Clone, Default)]
pub struct MockSubstrate {
    queued: Arc<Mutex<VecDeque<MockResponse>>>,
    default_response: MockResponse,
    requests: Arc<Mutex<Vec<AgentRequest>>>,
}

impl MockSubstrate {
    /// Substrate answering every invocation with [`MockResponse::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Substrate answering unqueued invocations with `response`.
    pub fn with_default_response(response: MockResponse) -> Self {
        Self {
            default_response: response,
            ..Self::default()
        }
    }

    /// Queue a response for the next invocation; queued responses are used
    /// in order before falling back to the default.
    pub async fn push_response(&self, response: MockResponse) {
        self.queued.lock().await.push_back(response);
    }

    /// Every request received so far.
    pub async fn requests(&self) -> Vec<AgentRequest> {
        self.requests.lock().await.clone()
    }

    /// The most recent request, if any.
    pub async fn last_request(&self) -> Option<AgentRequest> {
        self.requests.lock().await.last().cloned()
    }

    /// Number of invocations so far, failed ones included.
    pub async fn invocation_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl AgentSubstrate for MockSubstrate {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn invoke(&self, request: AgentRequest) -> DomainResult<AgentEventStream> {
        self.requests.lock().await.push(request);
        let response = self
            .queued
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone());

        if let Some(delay) = response.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = response.fail_on_invoke {
            return Err(DomainError::AgentFailed(message));
        }

        let mut items: Vec<DomainResult<AgentEvent>> =
            response.events.into_iter().map(Ok).collect();
        if let Some(message) = response.fail_mid_stream {
            items.push(Err(DomainError::AgentFailed(message)));
        }

        Ok(futures::stream::iter(items).boxed())
    }
}
