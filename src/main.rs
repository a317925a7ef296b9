//! Playforge CLI entry point.

use clap::Parser;

use playforge::cli::{commands, handle_error, Cli, Commands};
use playforge::infrastructure::logging::LoggerImpl;
use playforge::ConfigLoader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    // init runs before any configuration exists
    if let Commands::Init(args) = cli.command {
        if let Err(err) = commands::init::execute(args, json).await {
            handle_error(err, json);
        }
        return;
    }

    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(err) => handle_error(err, json),
    };
    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, json),
    };

    let result = match cli.command {
        Commands::Init(_) => Ok(true),
        Commands::Games(args) => commands::games::execute(args, &config, json).await.map(|()| true),
        Commands::Session(args) => commands::session::execute(args, &config, json).await.map(|()| true),
        Commands::Improve(args) => commands::improve::execute(args, &config, json).await,
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => handle_error(err, json),
    }
}
