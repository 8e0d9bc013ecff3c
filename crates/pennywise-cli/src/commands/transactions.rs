//! Transaction command implementations

use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use pennywise_core::db::Database;
use pennywise_core::models::{format_cents, parse_amount, NewTransaction, TransactionType};

use super::truncate;

/// Record one transaction, returning its id
pub fn cmd_add(
    db: &Database,
    user_id: i64,
    kind: &str,
    category: &str,
    amount: &str,
    date: NaiveDate,
    description: Option<&str>,
) -> Result<i64> {
    let kind: TransactionType = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let amount_cents = parse_amount(amount).context("Invalid amount")?;

    let tx = NewTransaction::new(user_id, date, kind, category, amount_cents)
        .with_description(description.unwrap_or_default());
    let id = db.insert_transaction(&tx)?;

    println!(
        "✅ Added {} #{} │ {} │ {}",
        kind,
        id,
        tx.category,
        format_cents(amount_cents)
    );

    Ok(id)
}

pub fn cmd_transactions_list(db: &Database, user_id: Option<i64>, limit: i64) -> Result<()> {
    let transactions = db.list_transactions(user_id, limit, 0)?;

    if transactions.is_empty() {
        println!("No transactions found. Add some with:");
        println!("  pennywise import --file ledger.csv");
        println!("  pennywise seed --user 1");
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = match tx.kind {
            TransactionType::Expense => {
                format!("\x1b[31m-{}\x1b[0m", format_cents(tx.amount_cents)) // Red for expenses
            }
            TransactionType::Income => {
                format!("\x1b[32m+{}\x1b[0m", format_cents(tx.amount_cents)) // Green for income
            }
        };

        println!(
            "   [{}] u{} {} │ {:>12} │ {:<18} │ {}",
            tx.id,
            tx.user_id,
            tx.date,
            amount_str,
            truncate(&tx.category, 18),
            truncate(&tx.description, 30)
        );
    }

    Ok(())
}

pub fn cmd_transactions_delete(db: &Database, id: i64) -> Result<()> {
    // Verify transaction exists
    let tx = db
        .get_transaction(id)?
        .ok_or_else(|| anyhow::anyhow!("Transaction {} not found", id))?;

    db.delete_transaction(id)?;

    println!("✅ Deleted transaction {}:", id);
    println!(
        "   {} │ {} │ {} │ {}",
        tx.date,
        tx.kind,
        format_cents(tx.amount_cents),
        truncate(&tx.category, 40)
    );

    Ok(())
}

/// Ask before wiping transactions. Returns false if cancelled.
pub fn confirm_clear(user_id: Option<i64>) -> Result<bool> {
    match user_id {
        Some(uid) => println!("⚠️  This will DELETE every transaction of user {}.", uid),
        None => println!("⚠️  This will DELETE every transaction in the ledger."),
    }
    print!("Are you sure? [y/N] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

pub fn cmd_transactions_clear(db: &Database, user_id: Option<i64>) -> Result<usize> {
    let removed = db.clear_transactions(user_id)?;
    println!("✅ Removed {} transaction(s)", removed);
    Ok(removed)
}
