//! Game CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::app::build_service;
use crate::cli::output::table::TableFormatter;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, GameMetadata, GameSessionSummary, HandlerDescriptor};

/// Arguments for `playforge games`.
#[derive(Args, Debug)]
pub struct GamesArgs {
    /// Games subcommand to run
    #[command(subcommand)]
    pub command: GamesCommands,
}

/// Subcommands of `playforge games`.
#[derive(Subcommand, Debug)]
pub enum GamesCommands {
    /// Create the metadata record for a scaffolded game
    Register {
        /// Game identifier (directory name under games_dir)
        game_id: String,
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Short description
        #[arg(short, long, default_value = "")]
        description: String,
        /// Room name of the game's server handler
        #[arg(long, requires = "module")]
        room: Option<String>,
        /// Module exporting the handler, relative to the game directory
        #[arg(long, requires = "room")]
        module: Option<String>,
    },
    /// List games with their session state
    List,
}

/// Result of `games register`.
#[derive(Debug, serde::Serialize)]
pub struct RegisterOutput {
    /// Registered game id
    pub game_id: String,
    /// Display name
    pub name: String,
    /// Declared handler, if any
    pub handler: Option<HandlerDescriptor>,
}

impl CommandOutput for RegisterOutput {
    fn to_human(&self) -> String {
        match self.handler {
            Some(ref h) => format!(
                "Registered game '{}' ({}) with handler {} from {}",
                self.game_id, self.name, h.room_name, h.module
            ),
            None => format!("Registered game '{}' ({})", self.game_id, self.name),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Result of `games list`.
#[derive(Debug, serde::Serialize)]
pub struct GameListOutput {
    /// One row per readable game
    pub games: Vec<GameSessionSummary>,
    /// Number of rows
    pub total: usize,
}

impl CommandOutput for GameListOutput {
    fn to_human(&self) -> String {
        if self.games.is_empty() {
            return "No games found.".to_string();
        }
        format!(
            "Found {} game(s):\n{}",
            self.total,
            TableFormatter::new().format_games(&self.games)
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Run a `games` subcommand.
pub async fn execute(args: GamesArgs, config: &Config, json_mode: bool) -> Result<()> {
    let service = build_service(config).await?;

    match args.command {
        GamesCommands::Register {
            game_id,
            name,
            description,
            room,
            module,
        } => {
            let mut metadata = GameMetadata::new(&name, description);
            if let (Some(room), Some(module)) = (room, module) {
                metadata = metadata.with_handler(HandlerDescriptor::new(room, module));
            }
            service
                .register_game(&game_id, &metadata)
                .await
                .with_context(|| format!("Failed to register game '{game_id}'"))?;

            output(
                &RegisterOutput {
                    game_id,
                    name,
                    handler: metadata.handler,
                },
                json_mode,
            );
        }
        GamesCommands::List => {
            let games = service
                .list_with_sessions()
                .await
                .context("Failed to list games")?;
            let total = games.len();
            output(&GameListOutput { games, total }, json_mode);
        }
    }

    Ok(())
}
