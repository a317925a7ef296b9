//! Session inspection commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::app::build_service;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, SessionInfo};

/// Arguments for `playforge session`.
#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Session subcommand to run
    #[command(subcommand)]
    pub command: SessionCommands,
}

/// Subcommands of `playforge session`.
#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Show session state and what the next improvement would do
    Show {
        /// Game identifier
        game_id: String,
    },
}

/// Result of `session show`.
#[derive(Debug, serde::Serialize)]
pub struct SessionOutput {
    /// Session projection for the game
    #[serde(flatten)]
    pub info: SessionInfo,
}

impl CommandOutput for SessionOutput {
    fn to_human(&self) -> String {
        let info = &self.info;
        let next = &info.next_decision;
        vec![
            format!("Game:                  {}", info.game_id),
            format!(
                "Resumable session:     {}",
                if info.has_session_token { "yes" } else { "no" }
            ),
            format!(
                "Ever had a session:    {}",
                if info.has_active_session { "yes" } else { "no" }
            ),
            format!("Improvements:          {}", info.improvement_count),
            format!("In current session:    {}", info.session_improvement_count),
            format!(
                "Last improvement:      {}",
                info.last_improvement_at
                    .map_or_else(|| "never".to_string(), |t| t.to_rfc3339())
            ),
            format!("Context size:          {} tokens", info.context_size),
            format!("Last cost:             ${:.4}", info.last_improvement_cost),
            format!(
                "Next improvement:      {} ({})",
                next.directive.as_str(),
                next.reason
            ),
        ]
        .join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Run a `session` subcommand.
pub async fn execute(args: SessionArgs, config: &Config, json_mode: bool) -> Result<()> {
    let service = build_service(config).await?;

    match args.command {
        SessionCommands::Show { game_id } => {
            let info = service
                .session_info(&game_id)
                .await
                .with_context(|| format!("Failed to read session for '{game_id}'"))?;
            output(&SessionOutput { info }, json_mode);
        }
    }

    Ok(())
}
