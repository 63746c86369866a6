//! Parquet encoding
//!
//! Encodes Arrow RecordBatches as Parquet in memory; the engine stages the
//! resulting bytes into object storage.

use crate::error::{Error, Result};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

/// Configuration for Parquet encoding
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024, // 1M rows
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Use no compression
    #[must_use]
    pub fn uncompressed(mut self) -> Self {
        self.compression = Compression::UNCOMPRESSED;
        self
    }

    /// Use ZSTD compression
    #[must_use]
    pub fn zstd(mut self) -> Self {
        self.compression = Compression::ZSTD(parquet::basic::ZstdLevel::default());
        self
    }

    /// Get row group size
    #[must_use]
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    /// Build writer properties
    fn build_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build()
    }
}

/// Encode a RecordBatch as Parquet bytes
pub fn batch_to_parquet_bytes(batch: &RecordBatch, config: &ParquetWriterConfig) -> Result<Bytes> {
    let mut buf = Vec::new();
    let props = config.build_properties();

    let mut writer =
        ArrowWriter::try_new(&mut buf, batch.schema(), Some(props)).map_err(|e| {
            Error::WriteFailed {
                path: String::new(),
                message: format!("failed to create Parquet writer: {e}"),
            }
        })?;

    writer.write(batch).map_err(|e| Error::WriteFailed {
        path: String::new(),
        message: format!("failed to write batch: {e}"),
    })?;

    writer.close().map_err(|e| Error::WriteFailed {
        path: String::new(),
        message: format!("failed to close Parquet writer: {e}"),
    })?;

    Ok(Bytes::from(buf))
}
