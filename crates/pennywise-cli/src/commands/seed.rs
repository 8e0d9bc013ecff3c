//! Demo data command

use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use pennywise_core::{db::Database, seed_demo_data, SeedReport};

/// Ask before replacing a user's ledger. Returns false if cancelled.
pub fn confirm_seed(user_id: i64) -> Result<bool> {
    print!(
        "⚠️  This will DELETE every transaction of user {} and replace it with demo data.\n\n",
        user_id
    );
    print!("Are you sure? [y/N] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

pub fn cmd_seed(
    db: &Database,
    user_id: i64,
    today: NaiveDate,
    seed: Option<u64>,
) -> Result<SeedReport> {
    println!("🌱 Seeding demo data for user {}...", user_id);

    let report = seed_demo_data(db, user_id, today, seed).context("Failed to seed demo data")?;

    println!("✅ Demo data ready!");
    println!("   Removed: {}", report.removed);
    println!("   Months: {}", report.months);
    println!("   Incomes: {}", report.incomes);
    println!("   Expenses: {}", report.expenses);
    println!();
    println!("   Run 'pennywise train' to fit the models.");

    Ok(report)
}
