//! Per-game mutual exclusion for improvement requests.
//!
//! The metadata read-modify-write in one improvement is not atomic across
//! its suspension points, so two overlapping requests for the same game
//! would race on `metadata.json`. A game is held for the lifetime of a
//! [`GameLockGuard`]; a second request for a held game is rejected rather
//! than queued.
//!
//! Holding a game takes two steps. The in-process set rejects overlap
//! between tasks sharing one [`GameLocks`] without touching the disk. An
//! exclusive `flock` on [`LOCK_FILE_NAME`] in the game directory then
//! rejects overlap with every other holder, including other `playforge`
//! processes. The lock file is left in place; only the `flock` matters.

use fs2::FileExt;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};

/// Lock file created inside each game directory.
pub const LOCK_FILE_NAME: &str = ".improve.lock";

/// Set of game ids with an improvement in flight.
#[derive(Debug, Clone, Default)]
pub struct GameLocks {
    held: Arc<Mutex<HashSet<String>>>,
}

impl GameLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    fn held(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set is only ever inserted into or removed from, so a panic while
        // holding the lock cannot leave it inconsistent.
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim a game whose files live in `game_dir`.
    ///
    /// # Errors
    /// `ImprovementInProgress` if this table or any other process holds the
    /// game, `GameNotFound` if `game_dir` does not exist.
    pub fn try_acquire(&self, game_id: &str, game_dir: &Path) -> DomainResult<GameLockGuard> {
        if !self.held().insert(game_id.to_string()) {
            return Err(DomainError::ImprovementInProgress(game_id.to_string()));
        }
        let release = HeldEntry {
            game_id: game_id.to_string(),
            held: Arc::clone(&self.held),
        };

        let file = lock_game_dir(game_id, game_dir)?;
        debug!(game_id, "game lock acquired");

        Ok(GameLockGuard {
            _file: file,
            entry: release,
        })
    }

    /// Whether this table currently holds `game_id`.
    pub fn is_held(&self, game_id: &str) -> bool {
        self.held().contains(game_id)
    }
}

fn lock_game_dir(game_id: &str, game_dir: &Path) -> DomainResult<File> {
    let path = game_dir.join(LOCK_FILE_NAME);
    let file = match OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(&path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(DomainError::GameNotFound(game_id.to_string()));
        }
        Err(e) => {
            return Err(DomainError::Io(format!(
                "failed to open {}: {e}",
                path.display()
            )));
        }
    };

    match file.try_lock_exclusive() {
        Ok(()) => {}
        Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
            return Err(DomainError::ImprovementInProgress(game_id.to_string()));
        }
        Err(e) => {
            return Err(DomainError::Io(format!(
                "failed to lock {}: {e}",
                path.display()
            )));
        }
    }

    // Owner pid, for diagnostics only
    let mut file = file;
    if file.set_len(0).is_ok() {
        let _ = write!(file, "{}", std::process::id());
    }
    Ok(file)
}

/// Removes a game id from the in-process set when dropped.
#[derive(Debug)]
struct HeldEntry {
    game_id: String,
    held: Arc<Mutex<HashSet<String>>>,
}

impl Drop for HeldEntry {
    fn drop(&mut self) {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.game_id);
    }
}

/// Releases its game when dropped.
#[derive(Debug)]
pub struct GameLockGuard {
    // Closing the file releases the flock
    _file: File,
    entry: HeldEntry,
}

impl GameLockGuard {
    /// The game this guard holds.
    pub fn game_id(&self) -> &str {
        &self.entry.game_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn game_dir() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn second_acquire_is_rejected_until_release() {
        let dir = game_dir();
        let locks = GameLocks::new();
        let guard = locks.try_acquire("tag", dir.path()).unwrap();
        assert!(locks.is_held("tag"));

        let err = locks.try_acquire("tag", dir.path()).unwrap_err();
        assert!(matches!(err, DomainError::ImprovementInProgress(id) if id == "tag"));

        drop(guard);
        assert!(!locks.is_held("tag"));
        assert!(locks.try_acquire("tag", dir.path()).is_ok());
    }

    #[test]
    fn different_games_are_independent() {
        let tag = game_dir();
        let racer = game_dir();
        let locks = GameLocks::new();
        let _a = locks.try_acquire("tag", tag.path()).unwrap();
        let b = locks.try_acquire("racer", racer.path()).unwrap();
        assert_eq!(b.game_id(), "racer");
    }

    #[test]
    fn clones_share_state() {
        let dir = game_dir();
        let locks = GameLocks::new();
        let other = locks.clone();
        let _guard = locks.try_acquire("tag", dir.path()).unwrap();
        assert!(other.try_acquire("tag", dir.path()).is_err());
    }

    #[test]
    fn separate_tables_contend_on_the_lock_file() {
        let dir = game_dir();
        let first = GameLocks::new();
        let second = GameLocks::new();

        let guard = first.try_acquire("tag", dir.path()).unwrap();
        let err = second.try_acquire("tag", dir.path()).unwrap_err();
        assert!(matches!(err, DomainError::ImprovementInProgress(_)));
        // A failed file lock does not leave the id claimed
        assert!(!second.is_held("tag"));

        drop(guard);
        assert!(second.try_acquire("tag", dir.path()).is_ok());
    }

    #[test]
    fn lock_file_records_owner_pid() {
        let dir = game_dir();
        let _guard = GameLocks::new().try_acquire("tag", dir.path()).unwrap();
        let contents = std::fs::read_to_string(dir.path().join(LOCK_FILE_NAME)).unwrap();
        assert_eq!(contents, std::process::id().to_string());
    }

    #[test]
    fn missing_game_dir_is_not_found() {
        let dir = game_dir();
        let locks = GameLocks::new();
        let err = locks
            .try_acquire("ghost", &dir.path().join("ghost"))
            .unwrap_err();
        assert!(matches!(err, DomainError::GameNotFound(id) if id == "ghost"));
        assert!(!locks.is_held("ghost"));
    }
}
