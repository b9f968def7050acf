// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ideabox - Telegram idea intake with AI enrichment.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ideabox_config::{ConfigError, IdeaboxConfig};

/// Ideabox - collect feature ideas from Telegram and analyze them with AI.
#[derive(Parser, Debug)]
#[command(name = "ideabox", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bot and the moderation API (default).
    Serve,
    /// Validate the configuration and print a summary.
    CheckConfig,
}

fn load(path: Option<&PathBuf>) -> Result<IdeaboxConfig, Vec<ConfigError>> {
    match path {
        Some(path) if !path.exists() => Err(vec![ConfigError::Other(format!(
            "config file {} does not exist",
            path.display()
        ))]),
        Some(path) => ideabox_config::load_and_validate_path(path),
        None => ideabox_config::load_and_validate(),
    }
}

fn print_summary(config: &IdeaboxConfig) {
    println!("ideabox: configuration is valid");
    println!("  database:     {}", config.storage.database_path);
    println!("  model:        {}", config.anthropic.default_model);
    println!(
        "  telegram:     {}",
        if config.telegram.bot_token.is_some() {
            "enabled"
        } else {
            "disabled (no bot_token)"
        }
    );
    println!(
        "  gateway:      {}",
        if config.gateway.enabled {
            format!("{}:{}", config.gateway.host, config.gateway.port)
        } else {
            "disabled".to_string()
        }
    );
    println!(
        "  rate limits:  {} per user / {} global per hour",
        config.rate_limit.per_user, config.rate_limit.global
    );
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            ideabox_config::render_errors(&errors);
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
        Commands::CheckConfig => print_summary(&config),
    }
}
