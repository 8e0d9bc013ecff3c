//! Import and export command implementations

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pennywise_core::{db::Database, ImportStats, TransactionExportOptions};

use super::parse_date;

pub fn cmd_import(db: &Database, file: &Path) -> Result<ImportStats> {
    println!("📥 Importing transactions from {}...", file.display());

    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let stats = db
        .import_transactions_csv(csv_file)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    println!("✅ Import complete!");
    println!("   Imported: {}", stats.imported);
    println!("   Users: {}", stats.users);
    if stats.imported > 0 {
        println!();
        println!("   Run 'pennywise train' to refresh the models.");
    }

    Ok(stats)
}

/// Export transactions to CSV. Returns the number of rows exported.
pub fn cmd_export_transactions(
    db: &Database,
    output: Option<PathBuf>,
    user_id: Option<i64>,
    from: Option<String>,
    to: Option<String>,
) -> Result<usize> {
    // Parse date options
    let from_date = from.map(|s| parse_date(&s, "--from")).transpose()?;
    let to_date = to.map(|s| parse_date(&s, "--to")).transpose()?;

    let opts = TransactionExportOptions {
        user_id,
        from: from_date,
        to: to_date,
    };

    let txs = db.export_transactions(&opts)?;
    if txs.is_empty() {
        tracing::warn!("No transactions to export");
        eprintln!("⚠️  No transactions to export.");
        return Ok(0);
    }

    let mut buf = Vec::new();
    pennywise_core::export::write_transactions_csv(&txs, &mut buf)?;

    match output {
        Some(path) => {
            let mut file = File::create(&path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            file.write_all(&buf)?;

            println!("✅ Exported {} transactions to {}", txs.len(), path.display());
        }
        None => {
            // Write to stdout
            std::io::stdout().write_all(&buf)?;
        }
    }

    Ok(txs.len())
}
