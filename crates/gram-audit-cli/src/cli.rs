//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Grammar Audit - Check transformer coverage of grammar rules
#[derive(Parser, Debug)]
#[command(name = "gram-audit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Input path options shared by every command
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Path to an audit.toml config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory containing *.gram grammar files
    #[arg(short, long)]
    pub grammar_dir: Option<PathBuf>,

    /// Registry source file with the registration calls
    #[arg(short, long)]
    pub registry: Option<PathBuf>,

    /// Directory containing the transformer implementation files
    #[arg(short, long)]
    pub impl_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Check rule coverage and report inconsistencies
    ///
    /// Classifies every grammar rule, then reports orphan implementations,
    /// orphan enum bindings, orphan registrations, stale registrations,
    /// and rules that are registered as both enum and transformer.
    ///
    /// Examples:
    ///   gram-audit check                   # Full report
    ///   gram-audit check --quiet           # Issues only
    ///   gram-audit check --file copy       # Single statement family
    ///   gram-audit check --strict          # Exit 1 on missing rules (CI)
    Check {
        #[command(flatten)]
        inputs: InputArgs,

        /// Skip output of covered ([ FOUND ] and [ ENUM ]) rules
        #[arg(short, long)]
        skip_found: bool,

        /// Only print summary and issues
        #[arg(short, long)]
        quiet: bool,

        /// Restrict output to rules from one grammar file stem
        #[arg(short, long, value_name = "STEM")]
        file: Option<String>,

        /// Exit with code 1 when any rule is missing
        #[arg(long)]
        strict: bool,

        /// Output the report as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Generate declaration, registration, and implementation stubs
    ///
    /// Emits ready-to-paste fragments for every rule without coverage,
    /// grouped per rule and labeled with the target file. Rules whose
    /// derived transform file does not exist are listed as skipped.
    Stubs {
        #[command(flatten)]
        inputs: InputArgs,

        /// Restrict generation to rules from one grammar file stem
        #[arg(short, long, value_name = "STEM")]
        file: Option<String>,

        /// Write the generated stubs to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
