// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parlor - customer-service chat gateway.
//!
//! Binary entry point: parses the CLI, loads and validates configuration,
//! and dispatches to the selected command.

use clap::{Parser, Subcommand};

mod collaborators;
mod serve;
mod shutdown;

/// Parlor - customer-service chat gateway.
#[derive(Parser, Debug)]
#[command(name = "parlor", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook server and message pipeline.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match parlor_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            parlor_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("parlor serve failed: {e}");
                std::process::exit(1);
            }
        }
        None => {
            println!("parlor: use --help for available commands");
        }
    }
}
