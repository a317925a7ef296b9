//! Playforge - agent-driven game improvement
//!
//! Playforge lets a coding agent iteratively modify small multiplayer browser
//! games. For every improvement request it decides whether to resume the
//! game's previous agent session or start a fresh one, based on idle time,
//! session length, context size and the cost of the last step, and keeps that
//! bookkeeping in each game's `metadata.json`.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Service Layer** (`services`): session policy and request orchestration
//! - **Adapters** (`adapters`): filesystem store, Claude Code CLI, TypeScript checker
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use playforge::cli::app::build_service;
//! use playforge::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let service = build_service(&config).await?;
//!     let result = service.improve("tag", "make the chaser faster").await;
//!     println!("{}", result.message);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    Config, GameMetadata, ImprovementResult, SessionDecision, SessionDirective,
    SessionPolicyConfig,
};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ImprovementService, SessionPolicy};
