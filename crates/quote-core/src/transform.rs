//! Row-to-record transformation.

use std::path::Path;

use crate::error::{Error, Result};
use crate::record::{QuoteRecord, SourceRow};

/// Derive the instrument symbol from a CSV file name.
///
/// The extension is stripped first. If the stem contains underscores the part
/// after the last one wins, so `HistoricalData_AAPL.csv` yields `AAPL` while
/// a bare `TSLA.csv` yields `TSLA`.
pub fn symbol_from_filename(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if let Some((_, symbol)) = stem.rsplit_once('_') {
        return symbol.to_string();
    }
    stem
}

/// Parse a `Volume` cell into a share count.
///
/// Exchange exports group thousands with commas (`"1,234,567"`); the
/// separators are removed before parsing. Negative counts are rejected.
pub fn parse_volume(text: &str) -> Result<i64> {
    let invalid = || Error::InvalidNumericField {
        field: "Volume",
        value: text.to_string(),
    };
    let volume: i64 = text.replace(',', "").trim().parse().map_err(|_| invalid())?;
    if volume < 0 {
        return Err(invalid());
    }
    Ok(volume)
}

/// Build the canonical record for one source row. Every field except
/// `volume` is carried over unchanged.
pub fn transform(row: SourceRow, symbol: &str) -> Result<QuoteRecord> {
    Ok(QuoteRecord {
        symbol: symbol.to_string(),
        date: row.date,
        close_last: row.close_last,
        volume: parse_volume(&row.volume)?,
        open: row.open,
        high: row.high,
        low: row.low,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> SourceRow {
        SourceRow {
            date: "01/03/2024".to_string(),
            close_last: "$184.25".to_string(),
            volume: "58,414,460".to_string(),
            open: "$184.22".to_string(),
            high: "$185.88".to_string(),
            low: "$183.43".to_string(),
        }
    }

    #[test]
    fn symbol_from_prefixed_filename() {
        let symbol = symbol_from_filename(Path::new("data/HistoricalData_AAPL.csv"));
        assert_eq!(symbol, "AAPL");
    }

    #[test]
    fn symbol_from_bare_filename() {
        let symbol = symbol_from_filename(Path::new("TSLA.csv"));
        assert_eq!(symbol, "TSLA");
    }

    #[test]
    fn symbol_uses_last_underscore() {
        let symbol = symbol_from_filename(Path::new("nasdaq_export_MSFT.csv"));
        assert_eq!(symbol, "MSFT");
    }

    #[test]
    fn parse_volume_strips_grouping_separators() {
        assert_eq!(parse_volume("1,234,567").unwrap(), 1_234_567);
        assert_eq!(parse_volume("58414460").unwrap(), 58_414_460);
        assert_eq!(parse_volume("0").unwrap(), 0);
    }

    #[test]
    fn parse_volume_rejects_garbage() {
        assert!(parse_volume("").is_err());
        assert!(parse_volume("N/A").is_err());
        assert!(parse_volume("12.5").is_err());
    }

    #[test]
    fn parse_volume_rejects_negative_counts() {
        let err = parse_volume("-1,000").unwrap_err();
        assert!(matches!(err, Error::InvalidNumericField { field: "Volume", .. }));
    }

    #[test]
    fn transform_preserves_price_text() {
        let record = transform(sample_row(), "AAPL").unwrap();
        assert_eq!(record.symbol, "AAPL");
        assert_eq!(record.date, "01/03/2024");
        assert_eq!(record.close_last, "$184.25");
        assert_eq!(record.volume, 58_414_460);
        assert_eq!(record.open, "$184.22");
        assert_eq!(record.high, "$185.88");
        assert_eq!(record.low, "$183.43");
    }

    #[test]
    fn transform_surfaces_bad_volume() {
        let mut row = sample_row();
        row.volume = "n/a".to_string();
        assert!(transform(row, "AAPL").is_err());
    }
}
