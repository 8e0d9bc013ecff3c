//! Ledger summaries (totals, month view, daily trend)

use chrono::NaiveDate;
use rusqlite::params;

use super::transactions::month_bounds;
use super::Database;
use crate::error::Result;
use crate::models::{DailyTotals, LedgerSummary};

impl Database {
    /// All-time income, expense and balance for a user
    pub fn summary(&self, user_id: i64) -> Result<LedgerSummary> {
        let conn = self.conn()?;
        let (income, expense): (i64, i64) = conn.query_row(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN type = 'income' THEN amount_cents END), 0),
                COALESCE(SUM(CASE WHEN type = 'expense' THEN amount_cents END), 0)
            FROM transactions
            WHERE user_id = ?
            "#,
            params![user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(LedgerSummary {
            total_income_cents: income,
            total_expense_cents: expense,
            balance_cents: income - expense,
        })
    }

    /// Income and expense for one calendar month
    ///
    /// `balance_cents` is still the all-time balance, not the month's net.
    pub fn month_summary(&self, user_id: i64, year: i32, month: u32) -> Result<LedgerSummary> {
        let (start, end) = month_bounds(year, month)?;
        let all_time = self.summary(user_id)?;

        let conn = self.conn()?;
        let (income, expense): (i64, i64) = conn.query_row(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN type = 'income' THEN amount_cents END), 0),
                COALESCE(SUM(CASE WHEN type = 'expense' THEN amount_cents END), 0)
            FROM transactions
            WHERE user_id = ? AND date >= ? AND date < ?
            "#,
            params![user_id, start.to_string(), end.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(LedgerSummary {
            total_income_cents: income,
            total_expense_cents: expense,
            balance_cents: all_time.balance_cents,
        })
    }

    /// Per-day income and expense for one calendar month, oldest day first
    ///
    /// Days without transactions are omitted.
    pub fn daily_trend(&self, user_id: i64, year: i32, month: u32) -> Result<Vec<DailyTotals>> {
        let (start, end) = month_bounds(year, month)?;

        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                date,
                COALESCE(SUM(CASE WHEN type = 'income' THEN amount_cents END), 0),
                COALESCE(SUM(CASE WHEN type = 'expense' THEN amount_cents END), 0)
            FROM transactions
            WHERE user_id = ? AND date >= ? AND date < ?
            GROUP BY date
            ORDER BY date
            "#,
        )?;
        let rows = stmt.query_map(params![user_id, start.to_string(), end.to_string()], |row| {
            let date_str: String = row.get(0)?;
            let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;
            Ok(DailyTotals {
                date,
                day: date.format("%d %b").to_string(),
                income_cents: row.get(1)?,
                expense_cents: row.get(2)?,
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
