//! Input file discovery.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Resolve `path` to the list of CSV files to publish.
///
/// A single `.csv` file yields just itself. A directory yields every `.csv`
/// file directly inside it, sorted by name; nested directories are not
/// walked. Anything else (missing path, wrong extension) is rejected.
pub async fn discover_csv_files(path: &Path) -> Result<Vec<PathBuf>> {
    let Ok(metadata) = tokio::fs::metadata(path).await else {
        return Err(Error::InvalidInputPath(path.to_path_buf()));
    };

    if metadata.is_file() {
        if is_csv(path) {
            return Ok(vec![path.to_path_buf()]);
        }
        return Err(Error::InvalidInputPath(path.to_path_buf()));
    }

    if metadata.is_dir() {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let entry_path = entry.path();
            let file_type = entry.file_type().await?;
            if file_type.is_file() && is_csv(&entry_path) {
                files.push(entry_path);
            }
        }
        files.sort();
        if files.is_empty() {
            return Err(Error::NoCsvFiles(path.to_path_buf()));
        }
        debug!(
            "Discovered {} CSV file(s) in {}",
            files.len(),
            path.display()
        );
        return Ok(files);
    }

    Err(Error::InvalidInputPath(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn single_csv_file_yields_itself() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("HistoricalData_AAPL.csv");
        std::fs::write(&file, "Date,Close/Last,Volume,Open,High,Low\n").unwrap();

        let files = discover_csv_files(&file).await.unwrap();
        assert_eq!(files, vec![file]);
    }

    #[tokio::test]
    async fn extension_check_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("TSLA.CSV");
        std::fs::write(&file, "Date,Close/Last,Volume,Open,High,Low\n").unwrap();

        let files = discover_csv_files(&file).await.unwrap();
        assert_eq!(files, vec![file]);
    }

    #[tokio::test]
    async fn non_csv_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "hello").unwrap();

        let err = discover_csv_files(&file).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInputPath(_)));
    }

    #[tokio::test]
    async fn missing_path_is_rejected() {
        let err = discover_csv_files(Path::new("/nonexistent/quotes"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInputPath(_)));
    }

    #[tokio::test]
    async fn directory_yields_sorted_csv_files() {
        let dir = TempDir::new().unwrap();
        for name in ["b_MSFT.csv", "a_AAPL.csv", "readme.md"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/c_TSLA.csv"), "x").unwrap();

        let files = discover_csv_files(dir.path()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a_AAPL.csv", "b_MSFT.csv"]);
    }

    #[tokio::test]
    async fn empty_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("schema.avsc"), "{}").unwrap();

        let err = discover_csv_files(dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::NoCsvFiles(_)));
    }
}
