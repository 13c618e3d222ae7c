//! CSV worksheet store: one file per worksheet, header row first.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::JournalStore;
use crate::models::JournalRow;

/// Journal worksheet kept as `<dir>/<worksheet>.csv`.
#[derive(Debug, Clone)]
pub struct CsvWorksheet {
    path: PathBuf,
}

impl CsvWorksheet {
    pub fn new(dir: impl AsRef<Path>, worksheet: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.csv", worksheet)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_blocking(path: &Path) -> Result<Vec<JournalRow>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        reader
            .deserialize::<JournalRow>()
            .enumerate()
            .map(|(i, record)| {
                record.with_context(|| format!("Malformed row {} in {}", i + 1, path.display()))
            })
            .collect()
    }

    fn write_blocking(path: &Path, rows: &[JournalRow]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write next to the target, then swap it in
        let tmp = path.with_extension("csv.tmp");
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&tmp)
                .with_context(|| format!("Failed to create {}", tmp.display()))?;

            writer.write_record(JournalRow::HEADERS)?;
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }

        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl JournalStore for CsvWorksheet {
    async fn read(&self) -> Result<Vec<JournalRow>> {
        let path = self.path.clone();
        let rows = tokio::task::spawn_blocking(move || Self::read_blocking(&path))
            .await
            .context("Worksheet read task failed")??;

        debug!(rows = rows.len(), path = %self.path.display(), "Read worksheet");
        Ok(rows)
    }

    async fn overwrite(&self, rows: &[JournalRow]) -> Result<()> {
        let path = self.path.clone();
        let rows = rows.to_vec();
        tokio::task::spawn_blocking(move || Self::write_blocking(&path, &rows))
            .await
            .context("Worksheet write task failed")??;

        Ok(())
    }

    fn describe(&self) -> String {
        format!("worksheet file {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::testing::{sample_row, sized_row};
    use crate::journal::{save_row, DEFAULT_WORKSHEET};

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = CsvWorksheet::new(dir.path(), DEFAULT_WORKSHEET);

        assert!(sheet.read().await.unwrap().is_empty());
        assert!(sheet.path().ends_with("Sheet1.csv"));
    }

    #[tokio::test]
    async fn test_append_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = CsvWorksheet::new(dir.path(), DEFAULT_WORKSHEET);

        save_row(&sheet, sample_row("TCS")).await.unwrap();
        let new_row = sample_row("HDFCBANK");
        save_row(&sheet, new_row.clone()).await.unwrap();

        let rows = sheet.read().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], sample_row("TCS"));
        assert_eq!(rows[1], new_row);
    }

    #[tokio::test]
    async fn test_full_precision_values_read_back_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = CsvWorksheet::new(dir.path(), DEFAULT_WORKSHEET);
        let row = sized_row("SBIN");
        assert_eq!(row.shares, 333);
        assert!(row.trailing_sl1.scale() > 15);

        save_row(&sheet, row.clone()).await.unwrap();

        let rows = sheet.read().await.unwrap();
        assert_eq!(rows, vec![row.clone()]);
        assert_eq!(rows[0].trailing_sl1.to_string(), row.trailing_sl1.to_string());
    }

    #[tokio::test]
    async fn test_header_row_in_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = CsvWorksheet::new(dir.path(), "Trades");

        sheet.overwrite(&[sample_row("TCS")]).await.unwrap();

        let contents = fs::read_to_string(sheet.path()).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next().unwrap(), JournalRow::HEADERS.join(","));
        let first = lines.next().unwrap();
        assert!(first.starts_with("trader@example.com,2024-06-14,100000,TCS,"));
        assert!(first.ends_with(",UP,UP,DOWN,UP"));
    }

    #[tokio::test]
    async fn test_empty_overwrite_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = CsvWorksheet::new(dir.path(), DEFAULT_WORKSHEET);

        sheet.overwrite(&[]).await.unwrap();

        let contents = fs::read_to_string(sheet.path()).unwrap();
        assert_eq!(contents.trim_end(), JournalRow::HEADERS.join(","));
        assert!(sheet.read().await.unwrap().is_empty());
    }
}
