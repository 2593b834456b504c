//! Armory CLI entrypoint.

use clap::Parser;

mod commands;
mod config;
mod handlers;
mod logging;

use commands::{Commands, ConfigCommands};
use config::ServerConfig;

#[derive(Parser)]
#[command(name = "armory")]
#[command(author, version, about = "Armory catalog gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config_path = match &cli.command {
        Commands::Serve { config, .. } => config.clone(),
        _ => None,
    };
    let config = ServerConfig::load(config_path.as_deref())?;
    logging::init(config.log_format);

    match cli.command {
        Commands::Serve { bind, .. } => handlers::serve(config, bind).await?,
        Commands::Search {
            query,
            lang,
            fields,
            limit,
        } => handlers::search(&config, &query, &lang, fields.as_deref(), limit).await?,
        Commands::Languages => handlers::languages(),
        Commands::Config { command } => match command {
            ConfigCommands::Show => handlers::show_config(&config)?,
            ConfigCommands::Set { key, value } => handlers::set_config(&key, &value)?,
        },
    }

    Ok(())
}
