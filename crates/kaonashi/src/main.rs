// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kaonashi - breach-exposure and malware-reputation lookups over chat.
//!
//! This is the binary entry point for the Kaonashi bot.

mod check;
mod serve;

use std::path::PathBuf;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

/// Kaonashi - breach-exposure and malware-reputation lookups over chat.
#[derive(Parser, Debug)]
#[command(name = "kaonashi", version, about, long_about = None)]
struct Cli {
    /// Settings file to load instead of the standard search path.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Start the bot (the default).
    Serve,
    /// Validate settings and the credential payload, then exit.
    CheckConfig {
        /// Also verify the bot token against Telegram.
        #[arg(long)]
        online: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => kaonashi_config::load_and_validate_path(path),
        None => kaonashi_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            kaonashi_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::CheckConfig { online } => {
            if !check::run_check(&config, online).await {
                std::process::exit(1);
            }
        }
    }
}
