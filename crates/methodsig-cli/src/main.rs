//! Methodsig command-line tool
//!
//! Loads signature manifests (TOML or JSON) and declares them against the
//! reference runtime, so signatures can be checked, listed and exercised
//! without writing a host program.

mod commands;

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "methodsig")]
#[command(about = "Check and exercise method signature manifests", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Declare every method in a manifest and report failures
    Check {
        /// Manifest file (.toml or .json)
        manifest: PathBuf,
        /// Class to declare on (defaults to the manifest's `class`)
        #[arg(short, long)]
        class: Option<String>,
    },

    /// Print the signature of every method in a manifest
    Describe {
        /// Manifest file (.toml or .json)
        manifest: PathBuf,
        /// Class to declare on (defaults to the manifest's `class`)
        #[arg(short, long)]
        class: Option<String>,
    },

    /// Verify raw arguments against one method and print them normalized
    Verify {
        /// Manifest file (.toml or .json)
        manifest: PathBuf,
        /// Method name
        method: String,
        /// Raw arguments as a JSON array (e.g. '["who", "world"]')
        args: Option<String>,
        /// Class to declare on (defaults to the manifest's `class`)
        #[arg(short, long)]
        class: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Check { manifest, class } => commands::check::execute(&manifest, class.as_deref()),
        Commands::Describe { manifest, class } => {
            commands::describe::execute(&manifest, class.as_deref())
        }
        Commands::Verify {
            manifest,
            method,
            args,
            class,
        } => commands::verify::execute(&manifest, class.as_deref(), &method, args.as_deref()),
    }
}
