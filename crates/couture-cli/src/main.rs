use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use couture_core::outfit::OutfitKind;

mod commands;

#[derive(Parser)]
#[command(name = "couture")]
#[command(about = "Couture AI - outfit suggestions and virtual try-on", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get outfit suggestions for a photo, optionally rendering a try-on
    Style(commands::style::StyleArgs),

    /// List the season and occasion presets
    Presets,

    /// Manage saved try-on images
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List saved images
    List,
    /// Remove a saved image by list number or reference prefix
    Remove { selector: String },
    /// Remove every saved image
    Clear,
}

pub(crate) fn parse_kind(value: &str) -> std::result::Result<OutfitKind, String> {
    value
        .parse()
        .map_err(|_| format!("unknown outfit category '{value}' (Formal, Casual, Stylish)"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    commands::logging::init(cli.log_json)?;

    let config = commands::load_config(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Style(args) => commands::style::run(&config, args).await?,
        Commands::Presets => commands::presets::run(&config),
        Commands::Favorites { action } => match action {
            FavoritesAction::List => commands::favorites::list(&config).await?,
            FavoritesAction::Remove { selector } => {
                commands::favorites::remove(&config, &selector).await?
            }
            FavoritesAction::Clear => commands::favorites::clear(&config).await?,
        },
    }

    Ok(())
}
