//! Riffloop CLI - A/B Loop Practice Tool
//!
//! Command-line interface for saved practice sections.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use riffloop::cli::{commands, Cli, Commands};
use riffloop::config::PracticeConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Riffloop v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => PracticeConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PracticeConfig::default(),
    };
    if let Some(dir) = cli.documents_dir {
        config = config.with_documents_dir(dir);
    }

    match cli.command {
        Some(cmd) => handle_command(&config, cmd),
        None => {
            println!("Riffloop v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(config: &PracticeConfig, cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Tracks => commands::list_tracks(config)?,
        Commands::Sections { track } => commands::show_sections(config, &track)?,
        Commands::AddSection { track, a, b } => commands::add_section(config, &track, a, b)?,
        Commands::Memo { track, index, text } => commands::set_memo(config, &track, index, &text)?,
        Commands::Attach { track, index, uri } => {
            commands::attach_recording(config, &track, index, &uri)?
        }
        Commands::ImportTake { track, index, wav } => {
            commands::import_take(config, &track, index, &wav)?
        }
        Commands::Info { path } => commands::show_info(&path)?,
        Commands::Practice {
            path,
            a,
            b,
            rate,
            seconds,
        } => commands::practice(config, &path, a, b, rate, seconds)
            .with_context(|| format!("practicing {}", path.display()))?,
        Commands::WriteConfig { path } => commands::write_config(config, &path)?,
    }
    Ok(())
}
