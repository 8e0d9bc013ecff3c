//! CSV export and import of the ledger
//!
//! Both directions share one column layout:
//! `id,user_id,date,type,category,amount,description`, with amounts written
//! as plain two-decimal numbers. The id column is ignored on import.

use std::collections::BTreeSet;
use std::io::{Read, Write};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{format_cents, parse_amount, NewTransaction, Transaction, TransactionType};

/// Options for transaction export
#[derive(Debug, Clone, Default)]
pub struct TransactionExportOptions {
    /// Only this user's transactions
    pub user_id: Option<i64>,
    /// Start date filter (inclusive)
    pub from: Option<NaiveDate>,
    /// End date filter (inclusive)
    pub to: Option<NaiveDate>,
}

impl TransactionExportOptions {
    fn matches(&self, tx: &Transaction) -> bool {
        self.user_id.map_or(true, |u| tx.user_id == u)
            && self.from.map_or(true, |from| tx.date >= from)
            && self.to.map_or(true, |to| tx.date <= to)
    }
}

/// One CSV row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CsvRecord {
    #[serde(default)]
    id: Option<i64>,
    user_id: i64,
    date: NaiveDate,
    #[serde(rename = "type")]
    kind: String,
    category: String,
    amount: String,
    #[serde(default)]
    description: String,
}

impl From<&Transaction> for CsvRecord {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: Some(tx.id),
            user_id: tx.user_id,
            date: tx.date,
            kind: tx.kind.as_str().to_string(),
            category: tx.category.clone(),
            amount: format_cents(tx.amount_cents),
            description: tx.description.clone(),
        }
    }
}

impl CsvRecord {
    fn into_new_transaction(self, line: usize) -> Result<NewTransaction> {
        let at = |msg: String| Error::InvalidData(format!("line {}: {}", line, msg));

        let kind: TransactionType = self.kind.parse().map_err(at)?;
        let amount_cents = parse_amount(&self.amount).map_err(|e| at(e.to_string()))?;
        let tx = NewTransaction::new(self.user_id, self.date, kind, self.category, amount_cents)
            .with_description(self.description);
        tx.validate().map_err(|e| at(e.to_string()))?;
        Ok(tx)
    }
}

/// Counts from a CSV import
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportStats {
    pub imported: usize,
    pub users: usize,
}

impl Database {
    /// Transactions selected for export, ordered by user then date
    pub fn export_transactions(&self, opts: &TransactionExportOptions) -> Result<Vec<Transaction>> {
        let txs = match opts.user_id {
            Some(user_id) => self.user_transactions(user_id)?,
            None => self.all_transactions()?,
        };
        Ok(txs.into_iter().filter(|tx| opts.matches(tx)).collect())
    }

    /// Export transactions to CSV text
    pub fn export_transactions_csv(&self, opts: &TransactionExportOptions) -> Result<String> {
        let txs = self.export_transactions(opts)?;
        let mut buf = Vec::new();
        write_transactions_csv(&txs, &mut buf)?;
        String::from_utf8(buf).map_err(|e| Error::InvalidData(format!("CSV is not UTF-8: {}", e)))
    }

    /// Import transactions from CSV
    ///
    /// Every row is validated before anything is written; one bad row rejects the file.
    pub fn import_transactions_csv<R: Read>(&self, reader: R) -> Result<ImportStats> {
        let txs = read_transactions_csv(reader)?;
        let users: BTreeSet<i64> = txs.iter().map(|t| t.user_id).collect();
        let imported = self.insert_transactions(&txs)?;
        tracing::info!(imported, users = users.len(), "Imported transactions");

        Ok(ImportStats {
            imported,
            users: users.len(),
        })
    }
}

/// Write transactions as CSV (header always included)
pub fn write_transactions_csv<W: Write>(txs: &[Transaction], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if txs.is_empty() {
        wtr.write_record(["id", "user_id", "date", "type", "category", "amount", "description"])?;
    }
    for tx in txs {
        wtr.serialize(CsvRecord::from(tx))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Parse and validate CSV rows into insertable transactions
pub fn read_transactions_csv<R: Read>(reader: R) -> Result<Vec<NewTransaction>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut txs = Vec::new();

    for (i, record) in rdr.deserialize::<CsvRecord>().enumerate() {
        // Header is line 1
        let line = i + 2;
        let record = record.map_err(|e| Error::InvalidData(format!("line {}: {}", line, e)))?;
        txs.push(record.into_new_transaction(line)?);
    }

    Ok(txs)
}
