//! Verifier that returns a preset outcome, for tests and dry runs.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::VerificationOutcome;
use crate::domain::ports::PostEditVerifier;

/// Verifier returning the same outcome on every call.
#[derive(Clone)]
pub struct FixedVerifier {
    outcome: Result<VerificationOutcome, String>,
    checked: Arc<Mutex<Vec<PathBuf>>>,
}

impl FixedVerifier {
    /// Verifier that always reports `outcome`.
    pub fn new(outcome: VerificationOutcome) -> Self {
        Self {
            outcome: Ok(outcome),
            checked: Arc::default(),
        }
    }

    /// A verifier whose checker cannot be started.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            outcome: Err(reason.into()),
            checked: Arc::default(),
        }
    }

    /// Directories verified so far.
    pub async fn checked(&self) -> Vec<PathBuf> {
        self.checked.lock().await.clone()
    }
}

#[async_trait]
impl PostEditVerifier for FixedVerifier {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn verify(&self, working_dir: &Path) -> DomainResult<VerificationOutcome> {
        self.checked.lock().await.push(working_dir.to_path_buf());
        self.outcome
            .clone()
            .map_err(DomainError::VerifierUnavailable)
    }
}
