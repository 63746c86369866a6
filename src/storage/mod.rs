//! Object storage access
//!
//! Wraps an [`object_store::ObjectStore`] behind a small surface: glob
//! listing, JSON-lines reading, and prefix overwrite. Roots may be
//! `s3://bucket/prefix` or plain local paths, so the job runs against a
//! data lake in production and a tempdir in tests.

mod glob;

pub use glob::glob_to_regex;

use crate::config::JobConfig;
use crate::error::{Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use serde_json::Value;
use std::sync::Arc;

/// A rooted object storage handle
///
/// All paths passed to methods are relative to the root the handle was
/// opened with.
#[derive(Debug, Clone)]
pub struct Storage {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Base path prefix within the bucket (empty for local roots)
    prefix: String,
    /// Original URL scheme for logging
    scheme: String,
}

impl Storage {
    /// Open a storage root
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` - AWS S3 (credentials from `config`)
    /// - `/local/path/` or `./path/` - Local filesystem
    pub fn open(root: &str, config: &JobConfig) -> Result<Self> {
        if root.starts_with("s3://") {
            Self::open_s3(root, config)
        } else {
            Self::open_local(root)
        }
    }

    /// Open an S3 root, injecting credentials explicitly
    fn open_s3(root: &str, config: &JobConfig) -> Result<Self> {
        let without_scheme = root
            .strip_prefix("s3://")
            .ok_or_else(|| Error::invalid_path(root, "expected s3:// URL"))?;

        let (bucket, prefix) = match without_scheme.find('/') {
            Some(idx) => (
                &without_scheme[..idx],
                without_scheme[idx + 1..]
                    .trim_end_matches('/')
                    .to_string(),
            ),
            None => (without_scheme, String::new()),
        };

        if bucket.is_empty() {
            return Err(Error::invalid_path(root, "missing bucket name"));
        }

        let mut builder = AmazonS3Builder::new().with_bucket_name(bucket);

        // Credentials come from the config object, never from mutating the
        // process environment.
        if let Some(creds) = &config.credentials {
            builder = builder
                .with_access_key_id(&creds.access_key_id)
                .with_secret_access_key(&creds.secret_access_key);
        }
        if let Some(region) = &config.region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }

        let store = builder
            .build()
            .map_err(|e| Error::storage(root, format!("failed to create S3 client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "s3".to_string(),
        })
    }

    /// Open a local filesystem root
    fn open_local(path: &str) -> Result<Self> {
        let path = path.strip_prefix("file://").unwrap_or(path);

        std::fs::create_dir_all(path)
            .map_err(|e| Error::storage(path, format!("failed to create directory: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::storage(path, format!("failed to open local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            scheme: "file".to_string(),
        })
    }

    /// Get the scheme (s3, file)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Check if this is a cloud root (not local)
    pub fn is_cloud(&self) -> bool {
        self.scheme != "file"
    }

    /// Resolve a path relative to the root
    fn resolve(&self, path: &str) -> ObjectPath {
        let path = path.trim_matches('/');
        if self.prefix.is_empty() {
            ObjectPath::from(path)
        } else {
            ObjectPath::from(format!("{}/{path}", self.prefix))
        }
    }

    /// List all objects matching a glob pattern relative to the root
    ///
    /// `*` matches within a single path segment, so
    /// `song_data/*/*/*/*.json` requires exactly four levels of nesting.
    /// Returns paths relative to the root, sorted for deterministic reads.
    pub async fn list_glob(&self, glob: &str) -> Result<Vec<String>> {
        let pattern = glob_to_regex(glob)?;

        // Listing is bounded by the longest literal prefix of the glob.
        let literal_prefix = glob
            .split('*')
            .next()
            .unwrap_or("")
            .rsplit_once('/')
            .map_or("", |(head, _)| head);
        let list_prefix = if literal_prefix.is_empty() {
            None
        } else {
            Some(self.resolve(literal_prefix))
        };

        let mut matches: Vec<String> = self
            .store
            .list(list_prefix.as_ref())
            .try_filter_map(|meta| {
                let relative = self.strip_prefix(meta.location.as_ref());
                let keep = pattern.is_match(&relative).then_some(relative);
                futures::future::ready(Ok(keep))
            })
            .try_collect()
            .await
            .map_err(|e| Error::storage(glob, format!("listing failed: {e}")))?;

        matches.sort();
        Ok(matches)
    }

    /// Strip the root prefix off an absolute object path
    fn strip_prefix(&self, location: &str) -> String {
        if self.prefix.is_empty() {
            location.to_string()
        } else {
            location
                .strip_prefix(&format!("{}/", self.prefix))
                .unwrap_or(location)
                .to_string()
        }
    }

    /// Read an object's bytes
    pub async fn get(&self, path: &str) -> Result<Bytes> {
        let location = self.resolve(path);
        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| Error::storage(path, format!("read failed: {e}")))?;
        result
            .bytes()
            .await
            .map_err(|e| Error::storage(path, format!("read failed: {e}")))
    }

    /// Read a JSON-lines object into a vector of records
    ///
    /// One JSON object per line; blank lines are skipped. A line that is
    /// not valid JSON fails the whole read with the path and line number.
    pub async fn read_json_lines(&self, path: &str) -> Result<Vec<Value>> {
        let bytes = self.get(path).await?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| Error::schema_invalid(path, format!("not valid UTF-8: {e}")))?;

        let mut records = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line).map_err(|e| {
                Error::schema_invalid(path, format!("line {}: {e}", idx + 1))
            })?;
            records.push(value);
        }
        Ok(records)
    }

    /// Write bytes to an object
    pub async fn put(&self, path: &str, data: Bytes) -> Result<()> {
        let location = self.resolve(path);
        self.store
            .put(&location, data.into())
            .await
            .map_err(|e| Error::write_failed(path, e.to_string()))?;
        Ok(())
    }

    /// Delete every object under a prefix
    ///
    /// This is the first half of overwrite semantics: a table directory is
    /// cleared before its replacement is staged in.
    pub async fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let location = self.resolve(prefix);
        let paths: Vec<ObjectPath> = self
            .store
            .list(Some(&location))
            .map_ok(|meta| meta.location)
            .try_collect()
            .await
            .map_err(|e| Error::storage(prefix, format!("listing failed: {e}")))?;

        let count = paths.len();
        for path in paths {
            self.store
                .delete(&path)
                .await
                .map_err(|e| Error::write_failed(path.to_string(), e.to_string()))?;
        }
        Ok(count)
    }
}
