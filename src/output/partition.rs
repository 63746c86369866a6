//! Hive-style partition grouping
//!
//! A partitioned write splits a table into one directory per distinct
//! combination of partition column values, named `col=value/`, which is the
//! partition-discovery layout downstream scanners expect. Partition columns
//! move into the path and are removed from the file contents.

use serde_json::Value;
use std::collections::BTreeMap;

/// Directory name used when a partition column value is null or missing
pub const HIVE_DEFAULT_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// One partition: its relative directory path and the rows that land in it
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionedRows {
    /// Relative path like `year=2018/artist_id=AR1`, empty when the table
    /// is unpartitioned
    pub path: String,
    /// Rows with the partition columns removed
    pub rows: Vec<Value>,
}

/// Group rows into Hive-style partitions
///
/// With no partition columns this returns a single group with an empty
/// path and the rows untouched. Groups come out sorted by path so the
/// write order is deterministic.
pub fn partition_rows(rows: &[Value], columns: &[&str]) -> Vec<PartitionedRows> {
    if columns.is_empty() {
        return vec![PartitionedRows {
            path: String::new(),
            rows: rows.to_vec(),
        }];
    }

    let mut groups: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for row in rows {
        let path = partition_path(row, columns);
        let mut stripped = row.clone();
        if let Some(obj) = stripped.as_object_mut() {
            for column in columns {
                obj.remove(*column);
            }
        }
        groups.entry(path).or_default().push(stripped);
    }

    groups
        .into_iter()
        .map(|(path, rows)| PartitionedRows { path, rows })
        .collect()
}

/// Build the `col=value/...` path for one row
fn partition_path(row: &Value, columns: &[&str]) -> String {
    let segments: Vec<String> = columns
        .iter()
        .map(|column| {
            let rendered = match row.get(*column) {
                None | Some(Value::Null) => HIVE_DEFAULT_PARTITION.to_string(),
                Some(Value::String(s)) => sanitize(s),
                Some(other) => sanitize(&other.to_string()),
            };
            format!("{column}={rendered}")
        })
        .collect();
    segments.join("/")
}

/// Keep partition values filesystem-safe
fn sanitize(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| if c == '/' || c.is_control() { '_' } else { c })
        .collect();
    if cleaned.is_empty() {
        HIVE_DEFAULT_PARTITION.to_string()
    } else {
        cleaned
    }
}
