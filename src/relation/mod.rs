//! Schema-on-read record sets
//!
//! A [`Relation`] is an ordered set of JSON object rows with the handful of
//! relational operations the table derivations are written in: projection
//! with rename, predicate filter, full-row distinct, and an inner hash
//! join. Keeping these pure (no I/O) lets every derivation be unit tested
//! without a store.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// An in-memory tabular record set
///
/// Rows are JSON objects; columns exist per row (schema-on-read). Missing
/// and explicit-null columns are treated alike by the operations below.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relation {
    rows: Vec<Value>,
}

impl Relation {
    /// Create an empty relation
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a relation from rows
    ///
    /// Every row must be a JSON object.
    pub fn from_rows(rows: Vec<Value>) -> Result<Self> {
        for (idx, row) in rows.iter().enumerate() {
            if !row.is_object() {
                return Err(Error::schema_invalid(
                    format!("row {idx}"),
                    "expected a JSON object",
                ));
            }
        }
        Ok(Self { rows })
    }

    /// Borrow the rows
    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    /// Consume the relation, yielding its rows
    pub fn into_rows(self) -> Vec<Value> {
        self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the relation has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep rows where `column` equals the given string value
    pub fn filter_eq(&self, column: &str, value: &str) -> Self {
        self.filter(|row| row.get(column).and_then(Value::as_str) == Some(value))
    }

    /// Keep rows matching a predicate
    pub fn filter(&self, predicate: impl Fn(&Value) -> bool) -> Self {
        Self {
            rows: self.rows.iter().filter(|r| predicate(r)).cloned().collect(),
        }
    }

    /// Keep rows where `column` is present and non-null
    pub fn where_not_null(&self, column: &str) -> Self {
        self.filter(|row| matches!(row.get(column), Some(v) if !v.is_null()))
    }

    /// Project columns, renaming on the way
    ///
    /// Each `(source, target)` pair copies `source` into the output row as
    /// `target`. A source missing from a row becomes an explicit null, so
    /// every output row carries the same columns.
    pub fn select(&self, columns: &[(&str, &str)]) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut out = Map::new();
                for (source, target) in columns {
                    let value = row.get(*source).cloned().unwrap_or(Value::Null);
                    out.insert((*target).to_string(), value);
                }
                Value::Object(out)
            })
            .collect();
        Self { rows }
    }

    /// Remove duplicate rows, keeping first occurrence order
    ///
    /// Distinctness is over the full row tuple, matching engine-default
    /// `SELECT DISTINCT` semantics. Two rows differing in any column both
    /// survive.
    pub fn distinct(&self) -> Self {
        let mut seen = HashSet::new();
        let rows = self
            .rows
            .iter()
            .filter(|row| seen.insert(row.to_string()))
            .cloned()
            .collect();
        Self { rows }
    }

    /// Inner join on string equality of two key columns
    ///
    /// Emits one merged row per matching (left, right) pair; rows without a
    /// match on either side are dropped, never null-padded. Rows whose key
    /// is null or missing never match. On column name collision the left
    /// row's value wins.
    pub fn inner_join(&self, right: &Relation, left_key: &str, right_key: &str) -> Self {
        let mut by_key: HashMap<&str, Vec<&Value>> = HashMap::new();
        for row in &right.rows {
            if let Some(key) = row.get(right_key).and_then(Value::as_str) {
                by_key.entry(key).or_default().push(row);
            }
        }

        let mut rows = Vec::new();
        for left_row in &self.rows {
            let Some(key) = left_row.get(left_key).and_then(Value::as_str) else {
                continue;
            };
            let Some(matches) = by_key.get(key) else {
                continue;
            };
            for right_row in matches {
                rows.push(merge_rows(left_row, right_row));
            }
        }
        Self { rows }
    }

    /// Derive a new relation by mapping each row
    pub fn map_rows(&self, f: impl Fn(&Value) -> Value) -> Self {
        Self {
            rows: self.rows.iter().map(f).collect(),
        }
    }
}

/// Merge two object rows, left winning on collision
fn merge_rows(left: &Value, right: &Value) -> Value {
    let mut out = right
        .as_object()
        .cloned()
        .unwrap_or_default();
    if let Some(left_map) = left.as_object() {
        for (key, value) in left_map {
            out.insert(key.clone(), value.clone());
        }
    }
    Value::Object(out)
}
