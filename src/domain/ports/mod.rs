//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that adapters implement:
//! - MetadataStore: durable per-game session record
//! - AgentSubstrate: coding agent invocation with streamed progress
//! - PostEditVerifier: type check over edited sources

pub mod metadata_store;
pub mod substrate;
pub mod verifier;

pub use metadata_store::MetadataStore;
pub use substrate::{AgentEventStream, AgentSubstrate};
pub use verifier::PostEditVerifier;
