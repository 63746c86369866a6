//! In-memory engine fake
//!
//! Serves pre-registered relations for globs and records every write, so
//! derivation code can be exercised without storage or Parquet encoding.

use super::{QueryEngine, WriteMode, WriteReport};
use crate::error::{Error, Result};
use crate::output::{partition_rows, PartitionedRows};
use crate::relation::Relation;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// A write captured by the fake
#[derive(Debug, Clone)]
pub struct CapturedWrite {
    /// Partition columns the caller asked for
    pub partition_by: Vec<String>,
    /// Rows grouped the way the real engine would lay them out
    pub groups: Vec<PartitionedRows>,
    /// Total rows across groups
    pub rows: usize,
}

/// In-memory [`QueryEngine`] for tests
#[derive(Default)]
pub struct MemoryEngine {
    inputs: HashMap<String, Relation>,
    writes: Mutex<HashMap<String, CapturedWrite>>,
}

impl MemoryEngine {
    /// Create an empty fake
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the relation a glob resolves to
    #[must_use]
    pub fn with_input(mut self, glob: impl Into<String>, relation: Relation) -> Self {
        self.inputs.insert(glob.into(), relation);
        self
    }

    /// Fetch the write captured for a destination path, if any
    pub fn written(&self, path: &str) -> Option<CapturedWrite> {
        self.writes.lock().unwrap().get(path).cloned()
    }

    /// All rows written to a path, across partitions
    pub fn written_rows(&self, path: &str) -> Vec<serde_json::Value> {
        self.written(path)
            .map(|w| w.groups.into_iter().flat_map(|g| g.rows).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl QueryEngine for MemoryEngine {
    async fn load(&self, glob: &str) -> Result<Relation> {
        self.inputs
            .get(glob)
            .cloned()
            .ok_or_else(|| Error::NoInputFiles {
                glob: glob.to_string(),
            })
    }

    async fn write(
        &self,
        relation: &Relation,
        path: &str,
        partition_by: &[&str],
        mode: WriteMode,
    ) -> Result<WriteReport> {
        let WriteMode::Overwrite = mode;
        let groups: Vec<PartitionedRows> = partition_rows(relation.rows(), partition_by)
            .into_iter()
            .filter(|g| !g.rows.is_empty())
            .collect();
        let rows = relation.len();
        let files = groups.len();

        // Overwrite semantics: a second write to the same path replaces the
        // first capture entirely.
        self.writes.lock().unwrap().insert(
            path.to_string(),
            CapturedWrite {
                partition_by: partition_by.iter().map(ToString::to_string).collect(),
                groups,
                rows,
            },
        );
        Ok(WriteReport::new(path, rows, files))
    }
}
