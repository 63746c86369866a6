// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # dimlake
//!
//! A batch ETL job that reads semi-structured JSON event logs and catalog
//! records from object storage, reshapes them into a dimensional (star)
//! schema, and writes the result back as partitioned Parquet.
//!
//! ## Pipeline
//!
//! Two stages run sequentially, each fully materializing its output before
//! the next begins:
//!
//! 1. **Catalog Transform** — catalog records → `table_songs/` (partitioned
//!    by year, artist_id) and `table_artists/`.
//! 2. **Event Transform** — playback events → `table_users/`,
//!    `table_times/` (partitioned by year, month) and the `table_songplays/`
//!    fact table (partitioned by year, month), joining events back to the
//!    catalog by artist name.
//!
//! Every output path is fully overwritten on each run, so reruns are
//! idempotent.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dimlake::config::JobConfig;
//! use dimlake::engine::ObjectStoreEngine;
//! use dimlake::transform::{CatalogTransform, EventTransform};
//!
//! #[tokio::main]
//! async fn main() -> dimlake::Result<()> {
//!     let config = JobConfig::from_file("dimlake.yaml")?;
//!     let engine = ObjectStoreEngine::from_config(&config)?;
//!
//!     CatalogTransform::new(&engine).run().await?;
//!     EventTransform::new(&engine).run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       QueryEngine                          │
//! │   load(glob) → Relation    write(rel, path, partitions)    │
//! └────────────────────────────────────────────────────────────┘
//!                              │
//! ┌───────────┬────────────┬───┴────────┬────────────┬─────────┐
//! │  Storage  │  Relation  │  Transform │   Output   │  Time   │
//! ├───────────┼────────────┼────────────┼────────────┼─────────┤
//! │ S3        │ select     │ songs      │ Arrow      │ epoch → │
//! │ Local FS  │ distinct   │ artists    │ Parquet    │ instant │
//! │ Glob list │ filter     │ users/time │ Hive parts │ UTC     │
//! │ JSONL     │ inner join │ songplays  │ Overwrite  │         │
//! └───────────┴────────────┴────────────┴────────────┴─────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the job
pub mod error;

/// Job configuration and storage credentials
pub mod config;

/// Object storage access (S3, local filesystem), glob listing, JSON lines
pub mod storage;

/// Schema-on-read record sets and relational operations
pub mod relation;

/// Query engine capability interface and implementations
pub mod engine;

/// Arrow conversion and partitioned Parquet output
pub mod output;

/// Epoch-millisecond timestamp derivation
pub mod time;

/// The five table derivations and the two pipeline stages
pub mod transform;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
