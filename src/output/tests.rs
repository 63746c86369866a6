//! Tests for output module

use super::*;
use arrow::array::Array;
use arrow::datatypes::DataType;
use serde_json::json;

// ============================================================================
// Schema Inference Tests
// ============================================================================

#[test]
fn test_infer_schema_empty() {
    let rows: Vec<serde_json::Value> = vec![];
    let schema = infer_schema(&rows).unwrap();
    assert!(schema.fields().is_empty());
}

#[test]
fn test_infer_schema_song_row() {
    let rows = vec![json!({
        "song_id": "SOSONG1",
        "title": "Song A",
        "year": 2000,
        "duration": 210.5,
    })];

    let schema = infer_schema(&rows).unwrap();
    assert_eq!(schema.fields().len(), 4);
    assert_eq!(
        schema.field_with_name("song_id").unwrap().data_type(),
        &DataType::Utf8
    );
    assert_eq!(
        schema.field_with_name("year").unwrap().data_type(),
        &DataType::Int64
    );
    assert_eq!(
        schema.field_with_name("duration").unwrap().data_type(),
        &DataType::Float64
    );
}

#[test]
fn test_infer_schema_with_nulls() {
    let rows = vec![
        json!({"artist_id": "AR1", "latitude": null}),
        json!({"artist_id": "AR2", "latitude": 40.7}),
    ];

    let schema = infer_schema(&rows).unwrap();
    let field = schema.field_with_name("latitude").unwrap();
    assert_eq!(field.data_type(), &DataType::Float64);
}

#[test]
fn test_infer_schema_mixed_numbers() {
    let rows = vec![json!({"duration": 42}), json!({"duration": 3.14})];

    let schema = infer_schema(&rows).unwrap();
    let field = schema.field_with_name("duration").unwrap();
    // Mixed int/float should become Float64
    assert_eq!(field.data_type(), &DataType::Float64);
}

#[test]
fn test_infer_schema_stable_column_order() {
    let rows = vec![json!({"b": 1, "a": 2, "c": 3})];
    let schema = infer_schema(&rows).unwrap();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

// ============================================================================
// JSON to Arrow Tests
// ============================================================================

#[test]
fn test_json_to_arrow_simple() {
    let rows = vec![
        json!({"user_id": "10", "level": "free"}),
        json!({"user_id": "11", "level": "paid"}),
    ];

    let batch = json_to_arrow(&rows, None).unwrap();
    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.num_columns(), 2);
}

#[test]
fn test_json_to_arrow_empty() {
    let rows: Vec<serde_json::Value> = vec![];
    let batch = json_to_arrow(&rows, None).unwrap();
    assert_eq!(batch.num_rows(), 0);
}

#[test]
fn test_json_to_arrow_with_missing_columns() {
    let rows = vec![
        json!({"artist_id": "AR1", "location": "NY"}),
        json!({"artist_id": "AR2"}),
    ];

    let batch = json_to_arrow(&rows, None).unwrap();
    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.num_columns(), 2);
    assert!(batch.column(1).is_null(1));
}

#[test]
fn test_json_to_arrow_provided_schema() {
    let rows = vec![json!({"user_id": "10", "level": "free", "extra": "ignored"})];

    let schema = infer_schema(&[json!({"user_id": "", "level": ""})]).unwrap();
    let batch = json_to_arrow(&rows, Some(&schema)).unwrap();

    assert_eq!(batch.num_columns(), 2);
}

// ============================================================================
// Parquet Encoding Tests
// ============================================================================

#[test]
fn test_batch_to_parquet_bytes() {
    let rows = vec![
        json!({"song_id": "SOA", "duration": 210.5}),
        json!({"song_id": "SOB", "duration": 180.0}),
    ];
    let batch = json_to_arrow(&rows, None).unwrap();

    let bytes = batch_to_parquet_bytes(&batch, &ParquetWriterConfig::default()).unwrap();
    // Parquet magic at both ends.
    assert_eq!(&bytes[..4], b"PAR1");
    assert_eq!(&bytes[bytes.len() - 4..], b"PAR1");
}

#[test]
fn test_parquet_writer_config_builder() {
    let config = ParquetWriterConfig::new()
        .with_row_group_size(1000)
        .uncompressed();
    assert_eq!(config.row_group_size(), 1000);
}

// ============================================================================
// Partition Grouping Tests
// ============================================================================

#[test]
fn test_partition_rows_unpartitioned() {
    let rows = vec![json!({"artist_id": "AR1"}), json!({"artist_id": "AR2"})];
    let groups = partition_rows(&rows, &[]);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].path, "");
    assert_eq!(groups[0].rows.len(), 2);
}

#[test]
fn test_partition_rows_two_columns() {
    let rows = vec![
        json!({"song_id": "SOA", "year": 2000, "artist_id": "AR1"}),
        json!({"song_id": "SOB", "year": 2000, "artist_id": "AR1"}),
        json!({"song_id": "SOC", "year": 2001, "artist_id": "AR2"}),
    ];

    let groups = partition_rows(&rows, &["year", "artist_id"]);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].path, "year=2000/artist_id=AR1");
    assert_eq!(groups[0].rows.len(), 2);
    assert_eq!(groups[1].path, "year=2001/artist_id=AR2");

    // Partition columns move into the path and out of the rows.
    assert_eq!(groups[0].rows[0], json!({"song_id": "SOA"}));
}

#[test]
fn test_partition_rows_null_value() {
    let rows = vec![json!({"song_id": "SOA", "year": null, "artist_id": "AR1"})];
    let groups = partition_rows(&rows, &["year", "artist_id"]);
    assert_eq!(
        groups[0].path,
        format!("year={HIVE_DEFAULT_PARTITION}/artist_id=AR1")
    );
}

#[test]
fn test_partition_rows_missing_column() {
    let rows = vec![json!({"song_id": "SOA"})];
    let groups = partition_rows(&rows, &["year"]);
    assert_eq!(groups[0].path, format!("year={HIVE_DEFAULT_PARTITION}"));
}

#[test]
fn test_partition_value_sanitized() {
    let rows = vec![json!({"artist_id": "AR/1", "x": 1})];
    let groups = partition_rows(&rows, &["artist_id"]);
    assert_eq!(groups[0].path, "artist_id=AR_1");
}

#[test]
fn test_partition_groups_sorted() {
    let rows = vec![
        json!({"month": 12, "x": 1}),
        json!({"month": 1, "x": 2}),
        json!({"month": 11, "x": 3}),
    ];
    let groups = partition_rows(&rows, &["month"]);
    let paths: Vec<&str> = groups.iter().map(|g| g.path.as_str()).collect();
    // Lexicographic by rendered value.
    assert_eq!(paths, vec!["month=1", "month=11", "month=12"]);
}
