use serde::{Deserialize, Serialize};

/// One row of a historical quote CSV export, exactly as it appears in the
/// file. Header columns are `Date,Close/Last,Volume,Open,High,Low`; every
/// cell arrives as raw text.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Close/Last")]
    pub close_last: String,
    #[serde(rename = "Volume")]
    pub volume: String,
    #[serde(rename = "Open")]
    pub open: String,
    #[serde(rename = "High")]
    pub high: String,
    #[serde(rename = "Low")]
    pub low: String,
}

/// The canonical quote record published to Kafka.
///
/// `volume` is normalized to an integer with grouping separators removed.
/// Price fields keep their original textual representation from the source
/// file (no float round-tripping). Field names match the Avro schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub symbol: String,
    pub date: String,
    pub close_last: String,
    pub volume: i64,
    pub open: String,
    pub high: String,
    pub low: String,
}
