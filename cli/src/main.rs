#![deny(missing_docs)]

//! # JSON:API OpenAPI CLI
//!
//! Command Line Interface for the JSON:API OpenAPI generator.
//!
//! Supported Commands:
//! - `generate`: Model file -> OpenAPI document (JSON or YAML).

use crate::error::CliResult;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod error;
mod generate;

#[derive(Parser, Debug)]
#[clap(author, version, about = "JSON:API OpenAPI generator")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[clap(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an OpenAPI document from a model file.
    Generate(generate::GenerateArgs),
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Generate(args) => generate::execute(args)?,
    }

    Ok(())
}
