//! File-backed metadata store.
//!
//! Each game lives in `<games_dir>/<game_id>/` and its session record in
//! `metadata.json` inside that directory.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{validate_game_id, GameMetadata, METADATA_FILE_NAME};
use crate::domain::ports::MetadataStore;

/// Metadata store rooted at a games directory.
#[derive(Debug, Clone)]
pub struct FsMetadataStore {
    games_dir: PathBuf,
}

impl FsMetadataStore {
    /// Store rooted at `games_dir`.
    pub fn new(games_dir: impl Into<PathBuf>) -> Self {
        Self {
            games_dir: games_dir.into(),
        }
    }

    /// Root directory holding one directory per game.
    pub fn games_dir(&self) -> &Path {
        &self.games_dir
    }

    fn metadata_path(&self, game_id: &str) -> DomainResult<PathBuf> {
        Ok(self.working_dir(game_id)?.join(METADATA_FILE_NAME))
    }

    /// Write via a sibling temp file and rename, so readers never observe a
    /// half-written record.
    async fn write_atomic(path: &Path, contents: &str) -> DomainResult<()> {
        let dir = path.parent().unwrap_or(Path::new("."));
        let tmp_path = dir.join(format!(".{METADATA_FILE_NAME}.{}.tmp", Uuid::new_v4()));

        if let Err(e) = fs::write(&tmp_path, contents).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(DomainError::Io(format!(
                "failed to write {}: {e}",
                tmp_path.display()
            )));
        }

        if let Err(e) = fs::rename(&tmp_path, path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(DomainError::Io(format!(
                "failed to replace {}: {e}",
                path.display()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl MetadataStore for FsMetadataStore {
    async fn load(&self, game_id: &str) -> DomainResult<GameMetadata> {
        let path = self.metadata_path(game_id)?;
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DomainError::GameNotFound(game_id.to_string()));
            }
            Err(e) => {
                return Err(DomainError::Io(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        GameMetadata::from_json(game_id, &raw)
    }

    async fn save(&self, game_id: &str, metadata: &GameMetadata) -> DomainResult<()> {
        let dir = self.working_dir(game_id)?;
        if !fs::try_exists(&dir).await.unwrap_or(false) {
            return Err(DomainError::GameNotFound(game_id.to_string()));
        }
        let path = dir.join(METADATA_FILE_NAME);
        Self::write_atomic(&path, &metadata.to_json()?).await?;
        debug!(game_id, path = %path.display(), "metadata saved");
        Ok(())
    }

    async fn create(&self, game_id: &str, metadata: &GameMetadata) -> DomainResult<()> {
        let dir = self.working_dir(game_id)?;
        let path = dir.join(METADATA_FILE_NAME);
        if fs::try_exists(&path).await.unwrap_or(false) {
            return Err(DomainError::GameAlreadyExists(game_id.to_string()));
        }
        fs::create_dir_all(&dir).await?;
        Self::write_atomic(&path, &metadata.to_json()?).await?;
        debug!(game_id, path = %path.display(), "metadata created");
        Ok(())
    }

    async fn list(&self) -> DomainResult<Vec<(String, GameMetadata)>> {
        let mut entries = match fs::read_dir(&self.games_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut games = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let Some(game_id) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if validate_game_id(&game_id).is_err() {
                continue;
            }
            match self.load(&game_id).await {
                Ok(metadata) => games.push((game_id, metadata)),
                // Directories without metadata are not games
                Err(DomainError::GameNotFound(_)) => {}
                Err(e) => warn!(game_id = %game_id, error = %e, "skipping unreadable game"),
            }
        }

        games.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(games)
    }

    fn working_dir(&self, game_id: &str) -> DomainResult<PathBuf> {
        validate_game_id(game_id)?;
        Ok(self.games_dir.join(game_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FsMetadataStore) {
        let dir = TempDir::new().unwrap();
        let store = FsMetadataStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_create_then_load() {
        let (_dir, store) = store();
        let metadata = GameMetadata::new("Tag", "Chase each other");
        store.create("tag", &metadata).await.unwrap();

        let loaded = store.load("tag").await.unwrap();
        assert_eq!(loaded.name, "Tag");
        assert_eq!(loaded.improvement_count, 0);
    }

    #[tokio::test]
    async fn test_create_twice_fails() {
        let (_dir, store) = store();
        let metadata = GameMetadata::new("Tag", "");
        store.create("tag", &metadata).await.unwrap();
        let err = store.create("tag", &metadata).await.unwrap_err();
        assert!(matches!(err, DomainError::GameAlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_load_missing_game() {
        let (_dir, store) = store();
        let err = store.load("ghost").await.unwrap_err();
        assert!(matches!(err, DomainError::GameNotFound(id) if id == "ghost"));
    }

    #[tokio::test]
    async fn test_load_rejects_traversal() {
        let (_dir, store) = store();
        let err = store.load("../etc").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidGameId(_)));
    }

    #[tokio::test]
    async fn test_load_corrupt_file() {
        let (dir, store) = store();
        std::fs::create_dir_all(dir.path().join("tag")).unwrap();
        std::fs::write(dir.path().join("tag").join(METADATA_FILE_NAME), "{ nope").unwrap();

        let err = store.load("tag").await.unwrap_err();
        assert!(matches!(err, DomainError::MetadataCorrupt { .. }));
    }

    #[tokio::test]
    async fn test_save_replaces_and_leaves_no_temp_files() {
        let (dir, store) = store();
        let mut metadata = GameMetadata::new("Tag", "");
        store.create("tag", &metadata).await.unwrap();

        metadata.improvement_count = 3;
        metadata.session_token = Some("sess".into());
        store.save("tag", &metadata).await.unwrap();

        let loaded = store.load("tag").await.unwrap();
        assert_eq!(loaded.improvement_count, 3);
        assert_eq!(loaded.session_token.as_deref(), Some("sess"));

        let names: Vec<_> = std::fs::read_dir(dir.path().join("tag"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec![METADATA_FILE_NAME.to_string()]);
    }

    #[tokio::test]
    async fn test_save_requires_existing_game() {
        let (_dir, store) = store();
        let err = store
            .save("ghost", &GameMetadata::new("Ghost", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::GameNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_sorted_and_skips_bad_entries() {
        let (dir, store) = store();
        store.create("zeta", &GameMetadata::new("Zeta", "")).await.unwrap();
        store.create("alpha", &GameMetadata::new("Alpha", "")).await.unwrap();
        std::fs::create_dir_all(dir.path().join("empty")).unwrap();
        std::fs::create_dir_all(dir.path().join("broken")).unwrap();
        std::fs::write(dir.path().join("broken").join(METADATA_FILE_NAME), "[]").unwrap();
        std::fs::write(dir.path().join("stray.txt"), "x").unwrap();

        let ids: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_list_missing_root_is_empty() {
        let store = FsMetadataStore::new("/nonexistent/playforge/games");
        assert!(store.list().await.unwrap().is_empty());
    }
}
