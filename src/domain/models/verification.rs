//! Post-edit verification results.

use serde::{Deserialize, Serialize};

/// Result of type checking a game's sources after the agent edited them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// No output at all
    Clean,
    /// The checker passed but printed diagnostics
    Warnings {
        /// Checker output
        output: String,
    },
    /// The checker failed
    Errors {
        /// Reported error count
        error_count: u32,
        /// Checker output
        output: String,
    },
    /// Verification is switched off in configuration
    Skipped,
}
