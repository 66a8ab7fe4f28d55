//! Remnant CLI - a private, PIN-locked archive of relationship reflections
//!
//! This is the command-line interface for Remnant. Every archive command
//! verifies the PIN into a fresh session before touching content.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod commands;
mod config;
mod errors;
mod helpers;
mod ui;

use app::AppContext;
use cli::{Cli, Commands, MediaCommands, ProfileCommands};
use commands::*;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);

    match &cli.command {
        Commands::Init => handle_init(&ctx),
        Commands::Verify => handle_verify(&ctx),
        Commands::Profile(command) => match command {
            ProfileCommands::Add(args) => handle_profile_add(&ctx, args),
            ProfileCommands::List(args) => handle_profile_list(&ctx, args),
            ProfileCommands::Show(args) => handle_profile_show(&ctx, args),
            ProfileCommands::Delete(args) => handle_profile_delete(&ctx, args),
        },
        Commands::Reflect(args) => handle_reflect(&ctx, args),
        Commands::Analyze(args) => handle_analyze(&ctx, args),
        Commands::Media(command) => match command {
            MediaCommands::Add(args) => handle_media_add(&ctx, args),
            MediaCommands::List(args) => handle_media_list(&ctx, args),
            MediaCommands::Export(args) => handle_media_export(&ctx, args),
            MediaCommands::Delete(args) => handle_media_delete(&ctx, args),
        },
        Commands::Seal(args) => handle_seal(&ctx, args),
        Commands::Open(args) => handle_open(&ctx, args),
        Commands::Completions(args) => handle_completions(args.shell),
    }
}
