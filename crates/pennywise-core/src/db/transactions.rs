//! Transaction operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::{Error, Result};
use crate::models::{CategoryTotal, NewTransaction, Transaction, TransactionType};

/// First day of the month and first day of the next one
pub(super) fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let invalid = || Error::InvalidData(format!("Invalid month {}-{}", year, month));
    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    Ok((start, end))
}

fn insert_all(db_tx: &rusqlite::Transaction, txs: &[NewTransaction]) -> Result<()> {
    let mut stmt = db_tx.prepare(
        r#"
        INSERT INTO transactions (user_id, date, type, category, amount_cents, description)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )?;
    for tx in txs {
        stmt.execute(params![
            tx.user_id,
            tx.date.to_string(),
            tx.kind.as_str(),
            tx.category.trim(),
            tx.amount_cents,
            tx.description,
        ])?;
    }
    Ok(())
}

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, date, type, category, amount_cents, description FROM transactions";

impl Database {
    /// Insert a transaction, returning its new ID
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<i64> {
        tx.validate()?;
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO transactions (user_id, date, type, category, amount_cents, description)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.user_id,
                tx.date.to_string(),
                tx.kind.as_str(),
                tx.category.trim(),
                tx.amount_cents,
                tx.description,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Insert many transactions in one SQLite transaction
    pub fn insert_transactions(&self, txs: &[NewTransaction]) -> Result<usize> {
        for tx in txs {
            tx.validate()?;
        }

        let mut conn = self.conn()?;
        let db_tx = conn.transaction()?;
        insert_all(&db_tx, txs)?;
        db_tx.commit()?;

        Ok(txs.len())
    }

    /// Swap a user's whole history for `txs` atomically. Returns rows removed.
    ///
    /// If any insert fails the delete is rolled back too.
    pub fn replace_user_transactions(&self, user_id: i64, txs: &[NewTransaction]) -> Result<usize> {
        for tx in txs {
            tx.validate()?;
        }

        let mut conn = self.conn()?;
        let db_tx = conn.transaction()?;
        let removed = db_tx.execute("DELETE FROM transactions WHERE user_id = ?", params![user_id])?;
        insert_all(&db_tx, txs)?;
        db_tx.commit()?;

        Ok(removed)
    }

    /// Get a single transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let tx = conn
            .query_row(
                &format!("{} WHERE id = ?", SELECT_COLUMNS),
                params![id],
                Self::row_to_transaction,
            )
            .optional()?;
        Ok(tx)
    }

    /// Replace the fields of an existing transaction. Returns false if it doesn't exist.
    pub fn update_transaction(&self, id: i64, tx: &NewTransaction) -> Result<bool> {
        tx.validate()?;
        let conn = self.conn()?;

        let changed = conn.execute(
            r#"
            UPDATE transactions
            SET user_id = ?, date = ?, type = ?, category = ?, amount_cents = ?, description = ?
            WHERE id = ?
            "#,
            params![
                tx.user_id,
                tx.date.to_string(),
                tx.kind.as_str(),
                tx.category.trim(),
                tx.amount_cents,
                tx.description,
                id,
            ],
        )?;

        Ok(changed > 0)
    }

    /// Delete a transaction. Returns false if it doesn't exist.
    pub fn delete_transaction(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?;
        Ok(changed > 0)
    }

    /// List transactions, newest first
    pub fn list_transactions(
        &self,
        user_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let txs = match user_id {
            Some(uid) => {
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE user_id = ? ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
                    SELECT_COLUMNS
                ))?;
                let rows = stmt.query_map(params![uid, limit, offset], Self::row_to_transaction)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "{} ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
                    SELECT_COLUMNS
                ))?;
                let rows = stmt.query_map(params![limit, offset], Self::row_to_transaction)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };

        Ok(txs)
    }

    /// Every transaction in the ledger, ordered by user then date (training input)
    pub fn all_transactions(&self) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY user_id, date, id",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::row_to_transaction)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// A user's full history, oldest first
    pub fn user_transactions(&self, user_id: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE user_id = ? ORDER BY date, id",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![user_id], Self::row_to_transaction)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// A user's transactions on or after `from`, optionally of one type, oldest first
    pub fn transactions_since(
        &self,
        user_id: i64,
        from: NaiveDate,
        kind: Option<TransactionType>,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let txs = match kind {
            Some(kind) => {
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE user_id = ? AND date >= ? AND type = ? ORDER BY date, id",
                    SELECT_COLUMNS
                ))?;
                let rows = stmt.query_map(
                    params![user_id, from.to_string(), kind.as_str()],
                    Self::row_to_transaction,
                )?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "{} WHERE user_id = ? AND date >= ? ORDER BY date, id",
                    SELECT_COLUMNS
                ))?;
                let rows = stmt.query_map(
                    params![user_id, from.to_string()],
                    Self::row_to_transaction,
                )?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };

        Ok(txs)
    }

    /// Most recent expenses for a user, newest first
    pub fn recent_expenses(&self, user_id: i64, limit: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE user_id = ? AND type = 'expense' ORDER BY date DESC, id DESC LIMIT ?",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![user_id, limit], Self::row_to_transaction)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Sum of a user's amounts of one type on or after `from`, in cents
    pub fn sum_since(&self, user_id: i64, kind: TransactionType, from: NaiveDate) -> Result<i64> {
        let conn = self.conn()?;
        let total: i64 = conn.query_row(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM transactions WHERE user_id = ? AND type = ? AND date >= ?",
            params![user_id, kind.as_str(), from.to_string()],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Expense totals per category for one calendar month, largest first
    pub fn category_totals_for_month(
        &self,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<CategoryTotal>> {
        let (start, end) = month_bounds(year, month)?;

        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT category, SUM(amount_cents) AS total
            FROM transactions
            WHERE user_id = ? AND type = 'expense' AND date >= ? AND date < ?
            GROUP BY category
            ORDER BY total DESC, category
            "#,
        )?;
        let rows = stmt.query_map(
            params![user_id, start.to_string(), end.to_string()],
            |row| {
                Ok(CategoryTotal {
                    category: row.get(0)?,
                    total_cents: row.get(1)?,
                })
            },
        )?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Whether the user has any transactions at all
    pub fn has_transactions(&self, user_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM transactions WHERE user_id = ?)",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Total number of transactions in the ledger
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete every transaction (or only one user's). Returns rows removed.
    pub fn clear_transactions(&self, user_id: Option<i64>) -> Result<usize> {
        let conn = self.conn()?;
        let removed = match user_id {
            Some(uid) => conn.execute("DELETE FROM transactions WHERE user_id = ?", params![uid])?,
            None => conn.execute("DELETE FROM transactions", [])?,
        };
        Ok(removed)
    }

    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let date_str: String = row.get(2)?;
        let kind_str: String = row.get(3)?;

        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let kind = kind_str.parse::<TransactionType>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                Box::new(Error::InvalidData(e)),
            )
        })?;

        Ok(Transaction {
            id: row.get(0)?,
            user_id: row.get(1)?,
            date,
            kind,
            category: row.get(4)?,
            amount_cents: row.get(5)?,
            description: row.get(6)?,
        })
    }
}
