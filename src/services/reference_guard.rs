//! Read-only protection for reference files inside a game directory.
//!
//! Reference files are owned by the template, not the game. The agent runs
//! with write access to the whole game directory, so permissions are
//! re-applied before every invocation in case a previous run changed them.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::domain::errors::DomainResult;

/// Re-applies read-only permission bits on configured paths.
#[derive(Debug, Clone)]
pub struct ReferenceGuard {
    relative_paths: Vec<String>,
}

impl ReferenceGuard {
    /// Guard for paths relative to each game directory.
    pub fn new(relative_paths: Vec<String>) -> Self {
        Self { relative_paths }
    }

    /// Protect every configured path under `working_dir`.
    ///
    /// Failures are logged and skipped; the count of files made read-only is
    /// returned.
    pub async fn protect(&self, working_dir: &Path) -> usize {
        let mut protected = 0;
        for relative in &self.relative_paths {
            let root = working_dir.join(relative);
            match protect_tree(&root).await {
                Ok(count) => protected += count,
                Err(e) => warn!(
                    path = %root.display(),
                    error = %e,
                    "could not re-apply read-only protection"
                ),
            }
        }
        debug!(working_dir = %working_dir.display(), files = protected, "reference files protected");
        protected
    }
}

/// Make every regular file under `root` read-only.
async fn protect_tree(root: &Path) -> DomainResult<usize> {
    let mut count = 0;
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(path) = pending.pop() {
        let meta = fs::symlink_metadata(&path).await?;
        if meta.is_dir() {
            let mut entries = fs::read_dir(&path).await?;
            while let Some(entry) = entries.next_entry().await? {
                pending.push(entry.path());
            }
        } else if meta.is_file() {
            let mut perms = meta.permissions();
            if make_read_only(&mut perms) {
                fs::set_permissions(&path, perms).await?;
            }
            count += 1;
        }
    }

    Ok(count)
}

/// Clear write bits; returns whether anything changed.
#[cfg(unix)]
fn make_read_only(perms: &mut std::fs::Permissions) -> bool {
    use std::os::unix::fs::PermissionsExt;
    let mode = perms.mode();
    let read_only = mode & !0o222;
    perms.set_mode(read_only);
    read_only != mode
}

#[cfg(not(unix))]
fn make_read_only(perms: &mut std::fs::Permissions) -> bool {
    let changed = !perms.readonly();
    perms.set_readonly(true);
    changed
}
