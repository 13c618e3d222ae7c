//! SQLite persistence for journal worksheets.
//!
//! Each worksheet is a set of rows in `journal_rows`, ordered by insertion.
//! Decimal columns are stored as TEXT so values read back exactly as saved.

use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::debug;

use crate::journal::JournalStore;
use crate::models::JournalRow;

/// Journal worksheet stored in a SQLite database.
pub struct SqliteJournal {
    pool: SqlitePool,
    worksheet: String,
}

/// Stored journal row record.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredJournalRow {
    pub id: i64,
    pub email: String,
    pub trade_date: String,
    pub total_capital: String,
    pub stock: String,
    pub entry_price: String,
    pub stop_loss_orig: String,
    pub target: String,
    pub trailing_sl1: String,
    pub shares: i64,
    pub investment: String,
    pub nifty_trend: String,
    pub sensex_trend: String,
    pub industry_trend: String,
    pub stock_trend: String,
}

impl StoredJournalRow {
    fn into_row(self) -> Result<JournalRow> {
        let id = self.id;
        let decimal = |column: &str, value: &str| {
            Decimal::from_str(value)
                .with_context(|| format!("Invalid {} '{}' in journal row {}", column, value, id))
        };

        Ok(JournalRow {
            date: NaiveDate::parse_from_str(&self.trade_date, "%Y-%m-%d")
                .with_context(|| format!("Invalid date '{}' in journal row {}", self.trade_date, id))?,
            total_capital: decimal("total_capital", &self.total_capital)?,
            entry_price: decimal("entry_price", &self.entry_price)?,
            stop_loss_orig: decimal("stop_loss_orig", &self.stop_loss_orig)?,
            target: decimal("target", &self.target)?,
            trailing_sl1: decimal("trailing_sl1", &self.trailing_sl1)?,
            investment: decimal("investment", &self.investment)?,
            nifty_trend: self.nifty_trend.parse()?,
            sensex_trend: self.sensex_trend.parse()?,
            industry_trend: self.industry_trend.parse()?,
            stock_trend: self.stock_trend.parse()?,
            shares: self.shares,
            stock: self.stock,
            email: self.email,
        })
    }
}

impl SqliteJournal {
    /// Connect to the database and select a worksheet.
    pub async fn new(database_url: &str, worksheet: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        let db = Self {
            pool,
            worksheet: worksheet.to_string(),
        };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run all database migrations.
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS journal_rows (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                worksheet TEXT NOT NULL,
                email TEXT NOT NULL,
                trade_date TEXT NOT NULL,
                total_capital TEXT NOT NULL,
                stock TEXT NOT NULL,
                entry_price TEXT NOT NULL,
                stop_loss_orig TEXT NOT NULL,
                target TEXT NOT NULL,
                trailing_sl1 TEXT NOT NULL,
                shares INTEGER NOT NULL,
                investment TEXT NOT NULL,
                nifty_trend TEXT NOT NULL,
                sensex_trend TEXT NOT NULL,
                industry_trend TEXT NOT NULL,
                stock_trend TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_journal_rows_worksheet ON journal_rows(worksheet, id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Number of rows in the selected worksheet.
    pub async fn row_count(&self) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM journal_rows WHERE worksheet = ?")
                .bind(self.worksheet.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }
}

#[async_trait]
impl JournalStore for SqliteJournal {
    async fn read(&self) -> Result<Vec<JournalRow>> {
        let stored = sqlx::query_as::<_, StoredJournalRow>(
            "SELECT * FROM journal_rows WHERE worksheet = ? ORDER BY id",
        )
        .bind(self.worksheet.as_str())
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch journal rows")?;

        stored.into_iter().map(StoredJournalRow::into_row).collect()
    }

    async fn overwrite(&self, rows: &[JournalRow]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM journal_rows WHERE worksheet = ?")
            .bind(self.worksheet.as_str())
            .execute(&mut *tx)
            .await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO journal_rows (
                    worksheet, email, trade_date, total_capital, stock, entry_price,
                    stop_loss_orig, target, trailing_sl1, shares, investment,
                    nifty_trend, sensex_trend, industry_trend, stock_trend
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(self.worksheet.as_str())
            .bind(row.email.as_str())
            .bind(row.date.format("%Y-%m-%d").to_string())
            .bind(row.total_capital.to_string())
            .bind(row.stock.as_str())
            .bind(row.entry_price.to_string())
            .bind(row.stop_loss_orig.to_string())
            .bind(row.target.to_string())
            .bind(row.trailing_sl1.to_string())
            .bind(row.shares)
            .bind(row.investment.to_string())
            .bind(row.nifty_trend.as_str())
            .bind(row.sensex_trend.as_str())
            .bind(row.industry_trend.as_str())
            .bind(row.stock_trend.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(worksheet = %self.worksheet, rows = rows.len(), "Journal worksheet replaced");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("worksheet '{}' in SQLite journal", self.worksheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::testing::{sample_row, sized_row};
    use crate::journal::{save_row, DEFAULT_WORKSHEET};
    use crate::models::Trend;

    async fn memory_journal(worksheet: &str) -> SqliteJournal {
        SqliteJournal::new("sqlite::memory:", worksheet).await.unwrap()
    }

    #[tokio::test]
    async fn test_append_then_read_back() {
        let db = memory_journal(DEFAULT_WORKSHEET).await;
        save_row(&db, sample_row("TCS")).await.unwrap();

        let mut new_row = sample_row("INFY");
        new_row.stock_trend = Trend::Down;
        save_row(&db, new_row.clone()).await.unwrap();

        let rows = db.read().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], sample_row("TCS"));
        assert_eq!(rows[1], new_row);
        assert_eq!(db.row_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_full_precision_values_read_back_exactly() {
        let db = memory_journal(DEFAULT_WORKSHEET).await;
        let row = sized_row("SBIN");

        save_row(&db, row.clone()).await.unwrap();

        assert_eq!(db.read().await.unwrap(), vec![row]);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_whole_worksheet() {
        let db = memory_journal(DEFAULT_WORKSHEET).await;
        db.overwrite(&[sample_row("TCS"), sample_row("INFY")]).await.unwrap();

        db.overwrite(&[sample_row("WIPRO")]).await.unwrap();

        let rows = db.read().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].stock, "WIPRO");
    }

    #[tokio::test]
    async fn test_worksheets_are_isolated() {
        let db = memory_journal("Sheet1").await;
        db.overwrite(&[sample_row("TCS")]).await.unwrap();

        let other = SqliteJournal {
            pool: db.pool.clone(),
            worksheet: "Sheet2".to_string(),
        };
        assert!(other.read().await.unwrap().is_empty());

        other.overwrite(&[sample_row("INFY")]).await.unwrap();
        assert_eq!(db.read().await.unwrap()[0].stock, "TCS");
    }
}
