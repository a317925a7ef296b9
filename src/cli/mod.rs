//! Command-line interface for playforge.

pub mod app;
pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use commands::games::GamesArgs;
use commands::improve::ImproveArgs;
use commands::init::InitArgs;
use commands::session::SessionArgs;

/// Top-level command line.
#[derive(Parser, Debug)]
#[command(name = "playforge")]
#[command(about = "Iteratively improve multiplayer browser games with a coding agent")]
#[command(version)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize playforge configuration in the current directory
    Init(InitArgs),

    /// Register and list games
    Games(GamesArgs),

    /// Inspect agent session state for a game
    Session(SessionArgs),

    /// Apply an improvement instruction to a game
    Improve(ImproveArgs),
}

/// Print an error and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );
    } else {
        eprintln!("Error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
    }
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_improve_with_global_json() {
        let cli = Cli::try_parse_from(["playforge", "improve", "tag", "add a timer", "--json"])
            .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Improve(args) => {
                assert_eq!(args.game_id, "tag");
                assert_eq!(args.instruction, "add a timer");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
