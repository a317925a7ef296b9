//! Substrate port - interface for coding agent backends.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AgentEvent, AgentRequest};

/// Lazily produced, ordered agent events.
///
/// An `Err` item means the invocation failed mid-stream; nothing after it
/// should be trusted.
pub type AgentEventStream = BoxStream<'static, DomainResult<AgentEvent>>;

/// Trait for coding agent implementations.
///
/// A substrate edits files inside `request.working_dir` and reports its
/// progress as a stream of [`AgentEvent`]s.
#[async_trait]
pub trait AgentSubstrate: Send + Sync {
    /// Get the substrate type name.
    fn name(&self) -> &'static str;

    /// Start an invocation and return its event stream.
    ///
    /// Returning `Err` means the agent could not be started at all.
    async fn invoke(&self, request: AgentRequest) -> DomainResult<AgentEventStream>;
}
