//! Common test utilities for integration tests
//!
//! Provides a temporary games directory wired to a scripted substrate and a
//! fixed verifier, so the improvement flow can run end to end without the
//! claude CLI or a TypeScript toolchain.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use playforge::adapters::filesystem::FsMetadataStore;
use playforge::adapters::substrates::MockSubstrate;
use playforge::adapters::verifiers::FixedVerifier;
use playforge::domain::models::{
    AgentConfig, GameMetadata, HandlerDescriptor, SessionPolicyConfig, VerificationOutcome,
    METADATA_FILE_NAME,
};
use playforge::domain::ports::MetadataStore;
use playforge::services::{GameRegistry, ImprovementService};

/// Everything an improvement test needs, rooted in a temporary directory.
pub struct Harness {
    pub dir: TempDir,
    pub store: Arc<FsMetadataStore>,
    pub substrate: MockSubstrate,
    pub verifier: FixedVerifier,
    pub registry: GameRegistry,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_verifier(FixedVerifier::new(VerificationOutcome::Clean))
    }

    pub fn with_verifier(verifier: FixedVerifier) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = Arc::new(FsMetadataStore::new(dir.path()));
        Self {
            dir,
            store,
            substrate: MockSubstrate::new(),
            verifier,
            registry: GameRegistry::new(),
        }
    }

    pub fn service(&self) -> ImprovementService {
        ImprovementService::new(
            self.store.clone(),
            Arc::new(self.substrate.clone()),
            Some(Arc::new(self.verifier.clone())),
            self.registry.clone(),
            SessionPolicyConfig::default(),
            AgentConfig::default(),
        )
    }

    /// Create a game with a declared handler and the given record.
    pub async fn seed(&self, game_id: &str, metadata: GameMetadata) {
        self.store
            .create(game_id, &metadata)
            .await
            .expect("Failed to seed game");
    }

    pub async fn seed_new(&self, game_id: &str) {
        self.seed(game_id, new_game(game_id)).await;
    }

    pub async fn load(&self, game_id: &str) -> GameMetadata {
        self.store.load(game_id).await.expect("Failed to load game")
    }

    pub fn game_dir(&self, game_id: &str) -> PathBuf {
        self.dir.path().join(game_id)
    }

    /// Raw bytes of a game's metadata file.
    pub fn raw_metadata(&self, game_id: &str) -> Vec<u8> {
        std::fs::read(self.game_dir(game_id).join(METADATA_FILE_NAME))
            .expect("Failed to read metadata file")
    }
}

/// Freshly scaffolded record with a declared handler.
pub fn new_game(game_id: &str) -> GameMetadata {
    GameMetadata::new(game_id, "integration test game")
        .with_handler(HandlerDescriptor::new(format!("{game_id}_room"), "server.ts"))
}

/// Setup test logging
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
