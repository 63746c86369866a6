//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Dimlake star-schema ETL CLI
#[derive(Parser, Debug)]
#[command(name = "dimlake")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Job configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Input root (local path or s3:// URL), overrides the config file
    #[arg(short, long, global = true)]
    pub input: Option<String>,

    /// Output root (local path or s3:// URL), overrides the config file
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline: catalog stage, then event stage
    Run,

    /// Validate the configuration and storage roots without writing
    Validate,
}
