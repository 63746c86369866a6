//! Output module
//!
//! Handles Arrow RecordBatch creation and partitioned Parquet encoding.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Inferring Arrow schemas from JSON rows
//! - Converting JSON rows to Arrow RecordBatches
//! - Encoding RecordBatches as Parquet
//! - Grouping rows into Hive-style partitions

mod partition;
mod schema;
mod writer;

pub use partition::{partition_rows, PartitionedRows, HIVE_DEFAULT_PARTITION};
pub use schema::{infer_schema, json_to_arrow};
pub use writer::{batch_to_parquet_bytes, ParquetWriterConfig};

#[cfg(test)]
mod tests;
