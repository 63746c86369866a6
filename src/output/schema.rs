//! Arrow schema inference and JSON to Arrow conversion
//!
//! The derived tables are flat rows of scalars, so only the scalar Arrow
//! types are supported; anything else falls back to its string rendering.

use crate::error::{Error, Result};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, NullArray, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Infer an Arrow schema from a set of JSON rows
///
/// Analyzes all rows to determine column types, promoting mixed
/// integer/float columns to Float64 and falling back to Utf8 on conflict.
/// Columns come out in name order so the schema is stable across runs.
pub fn infer_schema(rows: &[Value]) -> Result<Schema> {
    if rows.is_empty() {
        return Ok(Schema::empty());
    }

    let mut field_types: BTreeMap<String, DataType> = BTreeMap::new();

    for row in rows {
        if let Value::Object(obj) = row {
            for (key, value) in obj {
                let inferred = infer_type(value);
                field_types
                    .entry(key.clone())
                    .and_modify(|existing| {
                        *existing = merge_types(existing, &inferred);
                    })
                    .or_insert(inferred);
            }
        }
    }

    let fields: Vec<Field> = field_types
        .into_iter()
        .map(|(name, dtype)| {
            // A column that never held a value stays Null after merging;
            // Parquet needs a concrete type, so render it as nullable text.
            let dtype = if dtype == DataType::Null {
                DataType::Utf8
            } else {
                dtype
            };
            Field::new(name, dtype, true) // All fields nullable
        })
        .collect();

    Ok(Schema::new(fields))
}

/// Convert JSON rows to an Arrow RecordBatch
///
/// Uses the provided schema or infers one from the data.
pub fn json_to_arrow(rows: &[Value], schema: Option<&Schema>) -> Result<RecordBatch> {
    let inferred = infer_schema(rows)?;
    let schema = schema.unwrap_or(&inferred);

    if rows.is_empty() {
        return Ok(RecordBatch::new_empty(Arc::new(schema.clone())));
    }

    let mut columns: Vec<ArrayRef> = Vec::new();

    for field in schema.fields() {
        let values: Vec<Option<&Value>> = rows
            .iter()
            .map(|row| {
                if let Value::Object(obj) = row {
                    obj.get(field.name())
                } else {
                    None
                }
            })
            .collect();

        let array = build_array(&values, field.data_type());
        columns.push(array);
    }

    RecordBatch::try_new(Arc::new(schema.clone()), columns).map_err(|e| Error::WriteFailed {
        path: String::new(),
        message: format!("failed to create RecordBatch: {e}"),
    })
}

/// Infer Arrow DataType from a JSON value
fn infer_type(value: &Value) -> DataType {
    match value {
        Value::Null => DataType::Null,
        Value::Bool(_) => DataType::Boolean,
        Value::Number(n) => {
            if n.is_i64() {
                DataType::Int64
            } else {
                DataType::Float64
            }
        }
        // Arrays and objects do not occur in derived tables; render as text.
        Value::String(_) | Value::Array(_) | Value::Object(_) => DataType::Utf8,
    }
}

/// Merge two data types into a compatible type
fn merge_types(type1: &DataType, type2: &DataType) -> DataType {
    match (type1, type2) {
        // Same types
        (a, b) if a == b => a.clone(),

        // Null can merge with anything
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),

        // Numbers can merge (prefer Float64 for mixed)
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }

        // Different types -> fall back to String (most flexible)
        _ => DataType::Utf8,
    }
}

/// Build an Arrow array from JSON values
fn build_array(values: &[Option<&Value>], data_type: &DataType) -> ArrayRef {
    match data_type {
        DataType::Null => Arc::new(NullArray::new(values.len())),

        DataType::Boolean => {
            let arr: BooleanArray = values.iter().map(|v| v.and_then(Value::as_bool)).collect();
            Arc::new(arr)
        }

        DataType::Int64 => {
            let arr: Int64Array = values.iter().map(|v| v.and_then(Value::as_i64)).collect();
            Arc::new(arr)
        }

        DataType::Float64 => {
            #[allow(clippy::cast_precision_loss)]
            let arr: Float64Array = values
                .iter()
                .map(|v| v.and_then(|v| v.as_f64().or_else(|| v.as_i64().map(|i| i as f64))))
                .collect();
            Arc::new(arr)
        }

        _ => {
            let arr: StringArray = values
                .iter()
                .map(|v| {
                    v.and_then(|v| match v {
                        Value::Null => None,
                        Value::String(s) => Some(s.clone()),
                        _ => Some(v.to_string()),
                    })
                })
                .collect();
            Arc::new(arr)
        }
    }
}
