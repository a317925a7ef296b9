//! Implementation of the `playforge improve` command.

use anyhow::Result;
use clap::Args;

use crate::cli::app::build_service;
use crate::cli::output::progress::{create_spinner, ProgressBarExt};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, ImprovementResult};

/// Arguments for `playforge improve`.
#[derive(Args, Debug)]
pub struct ImproveArgs {
    /// Game identifier
    pub game_id: String,

    /// What to change, in plain language
    pub instruction: String,
}

/// Result of `playforge improve`.
#[derive(Debug, serde::Serialize)]
pub struct ImproveOutput {
    /// Game that was improved
    pub game_id: String,
    /// Success flag and message
    #[serde(flatten)]
    pub result: ImprovementResult,
}

impl CommandOutput for ImproveOutput {
    fn to_human(&self) -> String {
        self.result.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Run one improvement and report it.
///
/// Returns whether the improvement succeeded so `main` can set the exit code.
pub async fn execute(args: ImproveArgs, config: &Config, json_mode: bool) -> Result<bool> {
    let service = build_service(config).await?;

    let spinner = (!json_mode).then(|| create_spinner(format!("Improving {}", args.game_id)));
    let result = service.improve(&args.game_id, &args.instruction).await;

    if let Some(spinner) = spinner {
        if result.success {
            spinner.finish_success(format!("{} updated", args.game_id));
        } else {
            spinner.finish_error(format!("{} not updated", args.game_id));
        }
    }

    let success = result.success;
    output(
        &ImproveOutput {
            game_id: args.game_id,
            result,
        },
        json_mode,
    );
    Ok(success)
}
