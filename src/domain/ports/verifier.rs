//! Post-edit verifier port.

use async_trait::async_trait;
use std::path::Path;

use crate::domain::errors::DomainResult;
use crate::domain::models::VerificationOutcome;

/// Static check run over a game's sources after the agent finishes.
#[async_trait]
pub trait PostEditVerifier: Send + Sync {
    /// Checker name, for logs.
    fn name(&self) -> &str;

    /// Check the sources in `working_dir`.
    ///
    /// Returns `Err(VerifierUnavailable)` only when the checker itself could
    /// not be run; type errors are an `Ok(VerificationOutcome::Errors)`.
    async fn verify(&self, working_dir: &Path) -> DomainResult<VerificationOutcome>;
}
