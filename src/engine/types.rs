//! Engine types
//!
//! Write mode and per-table write reports.

/// How a write treats existing output at the destination path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Replace all prior content at the destination path
    ///
    /// The only mode the job uses; it is what makes reruns idempotent.
    #[default]
    Overwrite,
}

/// Summary of one table write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    /// Destination path relative to the output root
    pub path: String,
    /// Rows written across all partitions
    pub rows: usize,
    /// Parquet files written
    pub files: usize,
}

impl WriteReport {
    /// Create a new report
    pub fn new(path: impl Into<String>, rows: usize, files: usize) -> Self {
        Self {
            path: path.into(),
            rows,
            files,
        }
    }
}
