//! Wiring from configuration to services.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::adapters::filesystem::FsMetadataStore;
use crate::adapters::substrates::{ClaudeCodeConfig, ClaudeCodeSubstrate};
use crate::adapters::verifiers::TypeScriptVerifier;
use crate::domain::models::Config;
use crate::domain::ports::{MetadataStore, PostEditVerifier};
use crate::services::{GameRegistry, ImprovementService};

/// Build the improvement service described by `config`.
///
/// The handler registry is populated from every game currently on disk.
pub async fn build_service(config: &Config) -> Result<ImprovementService> {
    let store: Arc<dyn MetadataStore> = Arc::new(FsMetadataStore::new(&config.games_dir));
    let substrate = Arc::new(ClaudeCodeSubstrate::new(ClaudeCodeConfig::from(&config.agent)));
    let verifier: Option<Arc<dyn PostEditVerifier>> = config
        .verifier
        .enabled
        .then(|| Arc::new(TypeScriptVerifier::from_config(&config.verifier)) as Arc<dyn PostEditVerifier>);

    let registry = GameRegistry::populate(store.as_ref())
        .await
        .context("Failed to load game handlers")?;
    tracing::debug!(handlers = registry.len().await, "handler registry populated");

    Ok(ImprovementService::new(
        store,
        substrate,
        verifier,
        registry,
        config.session_policy.clone(),
        config.agent.clone(),
    ))
}
