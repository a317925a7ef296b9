//! Metadata store port.
//!
//! Defines the contract for the durable per-game record that the session
//! policy reads before and writes after each improvement.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::errors::DomainResult;
use crate::domain::models::GameMetadata;

/// Repository trait for per-game metadata.
///
/// Implementations must make `save` all-or-nothing: a reader either sees the
/// previous record or the complete new one, never a partial write.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Load the record for a game.
    ///
    /// # Errors
    /// - `GameNotFound` if the game has no working directory or metadata file
    /// - `MetadataCorrupt` if the file cannot be parsed
    async fn load(&self, game_id: &str) -> DomainResult<GameMetadata>;

    /// Replace the record for an existing game.
    async fn save(&self, game_id: &str, metadata: &GameMetadata) -> DomainResult<()>;

    /// Create the record for a new game.
    ///
    /// # Errors
    /// Returns `GameAlreadyExists` if the game already has metadata.
    async fn create(&self, game_id: &str, metadata: &GameMetadata) -> DomainResult<()>;

    /// List every game that has readable metadata, sorted by id.
    ///
    /// Unreadable records are skipped with a warning.
    async fn list(&self) -> DomainResult<Vec<(String, GameMetadata)>>;

    /// Working directory of a game.
    fn working_dir(&self, game_id: &str) -> DomainResult<PathBuf>;
}
