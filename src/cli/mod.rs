//! CLI module
//!
//! Command-line interface for the lake job.
//!
//! # Commands
//!
//! - `run` - Execute the full pipeline (both stages)
//! - `validate` - Load and check the configuration, then stop

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
