//! Query engine capability interface
//!
//! The derivations in [`crate::transform`] are written against the small
//! `{load, write}` surface of [`QueryEngine`], not against storage
//! directly, so the same derivation code runs over object storage in
//! production and over [`MemoryEngine`] in tests.

mod memory;
mod types;

pub use memory::MemoryEngine;
pub use types::{WriteMode, WriteReport};

use crate::config::JobConfig;
use crate::error::{Error, Result};
use crate::output::{batch_to_parquet_bytes, json_to_arrow, partition_rows, ParquetWriterConfig};
use crate::relation::Relation;
use crate::storage::Storage;
use async_trait::async_trait;
use tracing::{debug, info};

/// The capability interface the transforms run against
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Load every record matching a glob under the input root
    async fn load(&self, glob: &str) -> Result<Relation>;

    /// Persist a relation under the output root
    ///
    /// `partition_by` columns move into Hive-style `col=value/` directories
    /// and out of the file contents. [`WriteMode::Overwrite`] clears the
    /// destination path before staging the replacement.
    async fn write(
        &self,
        relation: &Relation,
        path: &str,
        partition_by: &[&str],
        mode: WriteMode,
    ) -> Result<WriteReport>;
}

/// Engine backed by object storage, producing partitioned Parquet
pub struct ObjectStoreEngine {
    input: Storage,
    output: Storage,
    parquet: ParquetWriterConfig,
}

impl ObjectStoreEngine {
    /// Create an engine from explicit storage handles
    pub fn new(input: Storage, output: Storage) -> Self {
        Self {
            input,
            output,
            parquet: ParquetWriterConfig::default(),
        }
    }

    /// Bootstrap the engine from job configuration
    ///
    /// Opens both roots; failure to reach either is fatal to the job.
    pub fn from_config(config: &JobConfig) -> Result<Self> {
        if config.needs_credentials() && config.credentials.is_none() {
            return Err(Error::missing_field("credentials"));
        }
        let input = Storage::open(&config.input_root, config)?;
        let output = Storage::open(&config.output_root, config)?;
        info!(
            input_scheme = input.scheme(),
            output_scheme = output.scheme(),
            "execution context ready"
        );
        Ok(Self::new(input, output))
    }

    /// Override the Parquet writer configuration
    #[must_use]
    pub fn with_parquet_config(mut self, parquet: ParquetWriterConfig) -> Self {
        self.parquet = parquet;
        self
    }
}

#[async_trait]
impl QueryEngine for ObjectStoreEngine {
    async fn load(&self, glob: &str) -> Result<Relation> {
        let paths = self.input.list_glob(glob).await?;
        if paths.is_empty() {
            return Err(Error::NoInputFiles {
                glob: glob.to_string(),
            });
        }

        let mut rows = Vec::new();
        for path in &paths {
            let records = self.input.read_json_lines(path).await?;
            debug!(path = %path, records = records.len(), "loaded input file");
            rows.extend(records);
        }
        info!(glob = %glob, files = paths.len(), rows = rows.len(), "loaded relation");
        Relation::from_rows(rows)
    }

    async fn write(
        &self,
        relation: &Relation,
        path: &str,
        partition_by: &[&str],
        mode: WriteMode,
    ) -> Result<WriteReport> {
        match mode {
            WriteMode::Overwrite => {
                let removed = self.output.delete_prefix(path).await?;
                if removed > 0 {
                    debug!(path = %path, objects = removed, "cleared previous output");
                }
            }
        }

        let mut rows_written = 0;
        let mut files_written = 0;
        for group in partition_rows(relation.rows(), partition_by) {
            if group.rows.is_empty() {
                continue;
            }
            let batch = json_to_arrow(&group.rows, None)?;
            let bytes = batch_to_parquet_bytes(&batch, &self.parquet)?;

            let file_path = if group.path.is_empty() {
                format!("{}/part-00000.parquet", path.trim_end_matches('/'))
            } else {
                format!(
                    "{}/{}/part-00000.parquet",
                    path.trim_end_matches('/'),
                    group.path
                )
            };
            self.output.put(&file_path, bytes).await?;

            rows_written += group.rows.len();
            files_written += 1;
        }

        info!(path = %path, rows = rows_written, files = files_written, "wrote table");
        Ok(WriteReport::new(path, rows_written, files_written))
    }
}
