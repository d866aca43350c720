//! Dry run of the whole produce pipeline: discovery, schema loading, row
//! transformation, and the bounded worker pool, without a Kafka broker.

use std::path::Path;

use quote_core::{QuoteCodec, QuoteSchema};
use quotefeed_csv_source::{discover_csv_files, QuotePublisher};
use tempfile::TempDir;

const QUOTE_SCHEMA: &str = r#"{
    "type": "record",
    "name": "HistoricalQuote",
    "namespace": "quotefeed",
    "fields": [
        {"name": "symbol", "type": "string"},
        {"name": "date", "type": "string"},
        {"name": "close_last", "type": "string"},
        {"name": "volume", "type": "long"},
        {"name": "open", "type": "string"},
        {"name": "high", "type": "string"},
        {"name": "low", "type": "string"}
    ]
}"#;

const HEADER: &str = "Date,Close/Last,Volume,Open,High,Low";

fn write_csv(dir: &Path, name: &str, rows: &[&str]) {
    let mut contents = format!("{HEADER}\n");
    for row in rows {
        contents.push_str(row);
        contents.push('\n');
    }
    std::fs::write(dir.join(name), contents).unwrap();
}

fn good_row() -> &'static str {
    "01/03/2024,$184.25,\"58,414,460\",$184.22,$185.88,$183.43"
}

#[tokio::test]
async fn directory_of_files_is_fully_processed() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("quote.avsc"), QUOTE_SCHEMA).unwrap();
    write_csv(dir.path(), "AAPL.csv", &[good_row(), good_row(), good_row()]);
    write_csv(dir.path(), "MSFT.csv", &[good_row(), good_row()]);

    let files = discover_csv_files(dir.path()).await.unwrap();
    assert_eq!(files.len(), 2);

    let schema = QuoteSchema::load(dir.path()).unwrap();
    let publisher = QuotePublisher::new(QuoteCodec::avro(schema), None).with_max_workers(2);
    let summary = publisher.publish_files(files).await.unwrap();

    assert_eq!(summary.files_total, 2);
    assert_eq!(summary.files_completed, 2);
    assert_eq!(summary.files_failed, 0);
    assert_eq!(summary.rows_processed, 5);
    assert_eq!(summary.deliveries_failed, 0);
}

#[tokio::test]
async fn single_file_input_is_processed_alone() {
    let dir = TempDir::new().unwrap();
    write_csv(dir.path(), "HistoricalData_TSLA.csv", &[good_row()]);

    let file = dir.path().join("HistoricalData_TSLA.csv");
    let files = discover_csv_files(&file).await.unwrap();
    assert_eq!(files, vec![file]);

    let publisher = QuotePublisher::new(QuoteCodec::json(), None);
    let summary = publisher.publish_files(files).await.unwrap();
    assert_eq!(summary.files_completed, 1);
    assert_eq!(summary.rows_processed, 1);
}

#[tokio::test]
async fn bad_file_fails_alone_and_run_still_succeeds() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("quote.avsc"), QUOTE_SCHEMA).unwrap();
    write_csv(dir.path(), "AAPL.csv", &[good_row(), good_row()]);
    write_csv(
        dir.path(),
        "MSFT.csv",
        &[
            good_row(),
            "01/04/2024,$367.94,not-a-number,$370.67,$371.58,$367.35",
            good_row(),
        ],
    );

    let files = discover_csv_files(dir.path()).await.unwrap();
    let schema = QuoteSchema::load(dir.path()).unwrap();
    let publisher = QuotePublisher::new(QuoteCodec::avro(schema), None);
    let summary = publisher.publish_files(files).await.unwrap();

    assert_eq!(summary.files_completed, 1);
    assert_eq!(summary.files_failed, 1);
    assert_eq!(summary.rows_processed, 3);
}
