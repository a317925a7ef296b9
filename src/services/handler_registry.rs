//! Table of active game handlers.
//!
//! Maps a game id to the room handler its metadata declares. The registry is
//! built explicitly, populated from the metadata store at startup and updated
//! whenever an improvement rewrites a game, and handed to whoever needs it
//! rather than living in a global.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{GameMetadata, HandlerDescriptor};
use crate::domain::ports::MetadataStore;

/// Game id to declared room handler; clones share one table.
#[derive(Debug, Clone, Default)]
pub struct GameRegistry {
    handlers: Arc<RwLock<BTreeMap<String, HandlerDescriptor>>>,
}

impl GameRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from every game in the store that declares a handler.
    ///
    /// Games without a declaration are skipped with a warning.
    pub async fn populate(store: &dyn MetadataStore) -> DomainResult<Self> {
        let registry = Self::new();
        for (game_id, metadata) in store.list().await? {
            if let Err(e) = registry.refresh(&game_id, &metadata).await {
                warn!(game_id = %game_id, error = %e, "game not registered");
            }
        }
        Ok(registry)
    }

    /// Register or replace the handler for one game from its metadata.
    pub async fn refresh(&self, game_id: &str, metadata: &GameMetadata) -> DomainResult<()> {
        let handler = metadata
            .handler
            .clone()
            .ok_or_else(|| DomainError::HandlerNotDeclared(game_id.to_string()))?;

        debug!(game_id, room = %handler.room_name, module = %handler.module, "handler registered");
        self.handlers.write().await.insert(game_id.to_string(), handler);
        Ok(())
    }

    /// Handler registered for `game_id`, if any.
    pub async fn get(&self, game_id: &str) -> Option<HandlerDescriptor> {
        self.handlers.read().await.get(game_id).cloned()
    }

    /// Number of registered handlers.
    pub async fn len(&self) -> usize {
        self.handlers.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refresh_requires_declaration() {
        let registry = GameRegistry::new();
        let err = registry
            .refresh("tag", &GameMetadata::new("Tag", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::HandlerNotDeclared(id) if id == "tag"));
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn refresh_replaces_existing_entry() {
        let registry = GameRegistry::new();
        let first = GameMetadata::new("Tag", "").with_handler(HandlerDescriptor::new("tag", "server.ts"));
        let second =
            GameMetadata::new("Tag", "").with_handler(HandlerDescriptor::new("tag_v2", "server.ts"));

        registry.refresh("tag", &first).await.unwrap();
        registry.refresh("tag", &second).await.unwrap();

        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.get("tag").await.unwrap().room_name, "tag_v2");
    }
}
