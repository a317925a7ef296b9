//! TypeScript post-edit verifier.
//!
//! Runs the TypeScript compiler in check-only strict mode over the game's
//! server and client sources (by default `npx tsc --noEmit --strict ...
//! server.ts client.ts`) inside the game directory.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{VerificationOutcome, VerifierConfig};
use crate::domain::ports::PostEditVerifier;

/// Verifier that type checks the edited sources.
pub struct TypeScriptVerifier {
    /// The program to execute (e.g. `"npx"`, `"tsc"`).
    program: String,
    /// Arguments placed before the file list.
    args: Vec<String>,
    /// Files to check, relative to the game directory.
    files: Vec<String>,
}

impl TypeScriptVerifier {
    /// Run `program` with `args` followed by `files`.
    pub fn new(program: impl Into<String>, args: Vec<String>, files: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            files,
        }
    }

    /// Verifier described by the `verifier` config section.
    pub fn from_config(config: &VerifierConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone(), config.files.clone())
    }

    /// Count error lines in compiler output.
    ///
    /// tsc writes diagnostics to stdout, so both streams are scanned.
    fn parse_errors(stdout: &str, stderr: &str) -> (u32, Vec<String>) {
        let errors: Vec<String> = stdout
            .lines()
            .chain(stderr.lines())
            .map(str::trim)
            .filter(|line| line.starts_with("error") || line.contains(": error "))
            .map(str::to_string)
            .collect();

        // "Found 3 errors in 2 files." when tsc prints a summary
        let summary = stdout.lines().rev().find_map(|line| {
            line.trim()
                .strip_prefix("Found ")
                .and_then(|rest| rest.split_whitespace().next())
                .and_then(|count| count.parse::<u32>().ok())
        });

        let count = summary.unwrap_or_else(|| u32::try_from(errors.len()).unwrap_or(u32::MAX));
        (count, errors)
    }

    /// Join both output streams, one per line, for the response excerpt.
    fn combine_output(stdout: &str, stderr: &str) -> String {
        [stdout.trim(), stderr.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl PostEditVerifier for TypeScriptVerifier {
    fn name(&self) -> &str {
        "typescript"
    }

    async fn verify(&self, working_dir: &Path) -> DomainResult<VerificationOutcome> {
        tracing::debug!(
            verifier = self.name(),
            working_dir = %working_dir.display(),
            files = ?self.files,
            "running type check"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .args(&self.files)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                DomainError::VerifierUnavailable(format!("failed to run {}: {e}", self.program))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = Self::combine_output(&stdout, &stderr);

        if output.status.success() {
            return Ok(if combined.is_empty() {
                VerificationOutcome::Clean
            } else {
                VerificationOutcome::Warnings { output: combined }
            });
        }

        let (error_count, _) = Self::parse_errors(&stdout, &stderr);
        tracing::info!(
            verifier = self.name(),
            error_count,
            exit_code = ?output.status.code(),
            "type check failed"
        );
        Ok(VerificationOutcome::Errors {
            // A non-zero exit is at least one error even if none parsed.
            error_count: error_count.max(1),
            output: combined,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_empty() {
        let (count, errors) = TypeScriptVerifier::parse_errors("", "");
        assert_eq!(count, 0);
        assert!(errors.is_empty());
    }

    #[test]
    fn parse_errors_typescript_style() {
        let stdout = "server.ts(5,3): error TS2322: Type 'string' is not assignable to type 'number'.\n\
                      client.ts(10,1): error TS2304: Cannot find name 'foo'.";
        let (count, errors) = TypeScriptVerifier::parse_errors(stdout, "");
        assert_eq!(count, 2);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn parse_errors_prefers_summary() {
        let stdout = "server.ts(5,3): error TS2322: bad\n\nFound 4 errors in 2 files.";
        let (count, _) = TypeScriptVerifier::parse_errors(stdout, "");
        assert_eq!(count, 4);
    }

    #[test]
    fn combine_output_keeps_streams_on_separate_lines() {
        assert_eq!(
            TypeScriptVerifier::combine_output("server.ts(1,1): error TS1005: x", "npm warn old"),
            "server.ts(1,1): error TS1005: x\nnpm warn old"
        );
        assert_eq!(TypeScriptVerifier::combine_output("\n", "only stderr\n"), "only stderr");
        assert_eq!(TypeScriptVerifier::combine_output("", ""), "");
    }

    #[test]
    fn from_config_uses_defaults() {
        let verifier = TypeScriptVerifier::from_config(&VerifierConfig::default());
        assert_eq!(verifier.program, "npx");
        assert_eq!(verifier.files, vec!["server.ts", "client.ts"]);
        assert!(verifier.args.contains(&"--strict".to_string()));
    }

    #[tokio::test]
    async fn missing_program_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let verifier = TypeScriptVerifier::new("/nonexistent/tsc", vec![], vec![]);
        let err = verifier.verify(dir.path()).await.unwrap_err();
        assert!(matches!(err, DomainError::VerifierUnavailable(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn classifies_exit_status_and_output() {
        let dir = tempfile::tempdir().unwrap();

        let clean = TypeScriptVerifier::new("true", vec![], vec![]);
        assert_eq!(clean.verify(dir.path()).await.unwrap(), VerificationOutcome::Clean);

        let noisy = TypeScriptVerifier::new("echo", vec!["note: unused".into()], vec![]);
        assert!(matches!(
            noisy.verify(dir.path()).await.unwrap(),
            VerificationOutcome::Warnings { .. }
        ));

        let failing = TypeScriptVerifier::new(
            "sh",
            vec!["-c".into(), "echo 'server.ts(1,1): error TS1005: x'; exit 2".into()],
            vec![],
        );
        let outcome = failing.verify(dir.path()).await.unwrap();
        assert_eq!(
            outcome,
            VerificationOutcome::Errors {
                error_count: 1,
                output: "server.ts(1,1): error TS1005: x".into()
            }
        );

        // Unterminated stdout must not run into stderr
        let both_streams = TypeScriptVerifier::new(
            "sh",
            vec![
                "-c".into(),
                "printf 'client.ts(2,4): error TS2304: y'; printf 'npm warn cache' >&2; exit 2".into(),
            ],
            vec![],
        );
        let VerificationOutcome::Errors { output, .. } = both_streams.verify(dir.path()).await.unwrap()
        else {
            panic!("expected errors");
        };
        assert_eq!(output, "client.ts(2,4): error TS2304: y\nnpm warn cache");
    }
}
