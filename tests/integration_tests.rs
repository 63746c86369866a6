//! Integration tests over a local filesystem root
//!
//! Seed JSON-lines inputs into a temp directory, run both pipeline stages,
//! and inspect the partitioned Parquet layout they leave behind.

use arrow::array::{Array, StringArray};
use bytes::Bytes;
use dimlake::config::JobConfig;
use dimlake::engine::{ObjectStoreEngine, QueryEngine};
use dimlake::storage::Storage;
use dimlake::transform::{
    CatalogTransform, EventTransform, TABLE_ARTISTS, TABLE_SONGPLAYS, TABLE_SONGS, TABLE_TIMES,
    TABLE_USERS,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::json;
use tempfile::tempdir;

const KNOWN_MS: i64 = 1_541_990_258_796; // 2018-11-12 02:37:38 UTC

struct Fixture {
    _dir: tempfile::TempDir,
    engine: ObjectStoreEngine,
    input: Storage,
    output: Storage,
}

fn fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let input_root = dir.path().join("in").display().to_string();
    let output_root = dir.path().join("out").display().to_string();
    let config = JobConfig::from_roots(input_root.clone(), output_root.clone());

    let input = Storage::open(&input_root, &config).unwrap();
    let output = Storage::open(&output_root, &config).unwrap();
    let engine = ObjectStoreEngine::new(input.clone(), output.clone());
    Fixture {
        _dir: dir,
        engine,
        input,
        output,
    }
}

async fn seed(storage: &Storage, path: &str, lines: &[serde_json::Value]) {
    let body = lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    storage.put(path, Bytes::from(body)).await.unwrap();
}

async fn seed_inputs(f: &Fixture) {
    // Catalog records live four directories deep, one record per file.
    seed(
        &f.input,
        "song_data/A/B/C/TRSONG1.json",
        &[json!({
            "song_id": "SOSONG1",
            "title": "Song A",
            "artist_id": "ARIST1",
            "artist_name": "The Band",
            "artist_location": "New York, NY",
            "artist_latitude": 40.7,
            "artist_longitude": -74.0,
            "year": 2000,
            "duration": 210.5,
        })],
    )
    .await;
    seed(
        &f.input,
        "song_data/A/B/D/TRSONG2.json",
        &[json!({
            "song_id": "SOSONG2",
            "title": "Song B",
            "artist_id": "ARIST2",
            "artist_name": "Other Act",
            "artist_location": null,
            "artist_latitude": null,
            "artist_longitude": null,
            "year": 0,
            "duration": 99.0,
        })],
    )
    .await;

    seed(
        &f.input,
        "log_data/2018-11-12-events.json",
        &[
            json!({
                "page": "NextSong",
                "artist": "The Band",
                "ts": KNOWN_MS,
                "userId": "10",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "gender": "F",
                "level": "free",
                "sessionId": 1,
                "location": "X",
                "userAgent": "Y",
            }),
            json!({
                "page": "Home",
                "artist": "The Band",
                "ts": KNOWN_MS + 60_000,
                "userId": "10",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "gender": "F",
                "level": "free",
                "sessionId": 1,
                "location": "X",
                "userAgent": "Y",
            }),
            json!({
                "page": "NextSong",
                "artist": "Unknown Garage Act",
                "ts": KNOWN_MS + 120_000,
                "userId": "20",
                "firstName": "Bob",
                "lastName": "Builder",
                "gender": "M",
                "level": "paid",
                "sessionId": 2,
                "location": "Z",
                "userAgent": "W",
            }),
        ],
    )
    .await;
}

async fn run_pipeline(f: &Fixture) {
    CatalogTransform::new(&f.engine).run().await.unwrap();
    EventTransform::new(&f.engine).run().await.unwrap();
}

fn read_column(bytes: Bytes, column: &str) -> Vec<String> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)
        .unwrap()
        .build()
        .unwrap();
    let mut values = Vec::new();
    for batch in reader {
        let batch = batch.unwrap();
        let idx = batch.schema().index_of(column).unwrap();
        let col = batch
            .column(idx)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap()
            .clone();
        for i in 0..col.len() {
            values.push(col.value(i).to_string());
        }
    }
    values
}

#[tokio::test]
async fn test_full_pipeline_layout() {
    let f = fixture();
    seed_inputs(&f).await;
    run_pipeline(&f).await;

    // Songs: one partition per (year, artist_id).
    assert!(f
        .output
        .get("table_songs/year=2000/artist_id=ARIST1/part-00000.parquet")
        .await
        .is_ok());
    assert!(f
        .output
        .get("table_songs/year=0/artist_id=ARIST2/part-00000.parquet")
        .await
        .is_ok());

    // Artists and users: unpartitioned single file.
    assert!(f
        .output
        .get("table_artists/part-00000.parquet")
        .await
        .is_ok());
    assert!(f.output.get("table_users/part-00000.parquet").await.is_ok());

    // Time and songplays: partitioned by (year, month). All events fall in
    // November 2018.
    assert!(f
        .output
        .get("table_times/year=2018/month=11/part-00000.parquet")
        .await
        .is_ok());
    assert!(f
        .output
        .get("table_songplays/year=2018/month=11/part-00000.parquet")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_songplays_contents() {
    let f = fixture();
    seed_inputs(&f).await;
    run_pipeline(&f).await;

    let bytes = f
        .output
        .get("table_songplays/year=2018/month=11/part-00000.parquet")
        .await
        .unwrap();

    // Only the event whose artist text matches a catalog record survives
    // the join.
    let song_ids = read_column(bytes.clone(), "song_id");
    assert_eq!(song_ids, vec!["SOSONG1"]);

    let start_times = read_column(bytes, "start_time");
    assert_eq!(start_times, vec!["2018-11-12 02:37:38"]);
}

#[tokio::test]
async fn test_users_contents() {
    let f = fixture();
    seed_inputs(&f).await;
    run_pipeline(&f).await;

    let bytes = f.output.get("table_users/part-00000.parquet").await.unwrap();
    let mut user_ids = read_column(bytes, "user_id");
    user_ids.sort();
    assert_eq!(user_ids, vec!["10", "20"]);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let f = fixture();
    seed_inputs(&f).await;
    run_pipeline(&f).await;

    // Plant a stale file where the second run must remove it.
    f.output
        .put("table_songs/year=1999/artist_id=GONE/part-00000.parquet", Bytes::from("x"))
        .await
        .unwrap();

    run_pipeline(&f).await;

    assert!(f
        .output
        .get("table_songs/year=1999/artist_id=GONE/part-00000.parquet")
        .await
        .is_err());
    let bytes = f
        .output
        .get("table_songs/year=2000/artist_id=ARIST1/part-00000.parquet")
        .await
        .unwrap();
    assert_eq!(&bytes[..4], b"PAR1");
}

#[tokio::test]
async fn test_missing_inputs_fail_loudly() {
    let f = fixture();
    // No seeded files at all: the catalog stage must fail, not write empty
    // tables.
    let err = CatalogTransform::new(&f.engine).run().await.unwrap_err();
    assert!(err.to_string().contains("song_data"));
}
