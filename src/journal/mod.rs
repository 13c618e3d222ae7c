//! Journal persistence: whole-table worksheet stores.
//!
//! A store exposes a worksheet as a table that is read whole and written
//! back whole. Saving a trade is read, append one row, overwrite.

mod worksheet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::models::JournalRow;

pub use worksheet::CsvWorksheet;

/// Default worksheet name.
pub const DEFAULT_WORKSHEET: &str = "Sheet1";

/// A worksheet-backed journal table.
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Read every row of the worksheet, in stored order.
    async fn read(&self) -> Result<Vec<JournalRow>>;

    /// Replace the worksheet contents with `rows`.
    async fn overwrite(&self, rows: &[JournalRow]) -> Result<()>;

    /// Short human-readable location of the worksheet.
    fn describe(&self) -> String;
}

/// Append `row` to `table` and write the result back as the whole worksheet.
///
/// Returns the table as written.
pub async fn append_and_write(
    store: &dyn JournalStore,
    mut table: Vec<JournalRow>,
    row: JournalRow,
) -> Result<Vec<JournalRow>> {
    table.push(row);
    store
        .overwrite(&table)
        .await
        .with_context(|| format!("Failed to write {}", store.describe()))?;

    debug!(rows = table.len(), store = %store.describe(), "Worksheet written");
    Ok(table)
}

/// Read the worksheet, append `row`, write it back.
pub async fn save_row(store: &dyn JournalStore, row: JournalRow) -> Result<Vec<JournalRow>> {
    let existing = store
        .read()
        .await
        .with_context(|| format!("Failed to read {}", store.describe()))?;

    append_and_write(store, existing, row).await
}
