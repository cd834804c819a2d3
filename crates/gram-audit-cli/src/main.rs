//! Grammar Audit CLI
//!
//! Command-line interface for auditing transformer coverage of grammar
//! rules and generating stubs for the uncovered ones.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use commands::CheckOptions;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Check {
            inputs,
            skip_found,
            quiet,
            file,
            strict,
            json,
        }) => commands::run_check(
            &inputs,
            &CheckOptions {
                skip_found,
                quiet,
                file,
                strict,
                json,
            },
        ),
        Some(Commands::Stubs {
            inputs,
            file,
            output,
        }) => commands::run_stubs(&inputs, file.as_deref(), output.as_deref()),
        None => {
            // No command provided - show help hint
            println!("{} Grammar Audit CLI", "gram-audit".green().bold());
            println!();
            println!("Run {} for available commands.", "gram-audit --help".cyan());
            Ok(())
        }
    }
}
