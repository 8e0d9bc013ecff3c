//! Ledger totals and daily trend commands

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use pennywise_core::db::Database;
use pennywise_core::models::format_cents;
use pennywise_core::{DailyTotals, LedgerSummary};

/// Print all-time totals and this month's totals. Returns (all_time, month).
pub fn cmd_summary(
    db: &Database,
    user_id: i64,
    today: NaiveDate,
) -> Result<(LedgerSummary, LedgerSummary)> {
    let all_time = db.summary(user_id)?;
    let month = db.month_summary(user_id, today.year(), today.month())?;

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│        💰 Pennywise Summary (u{:<4})     │", user_id);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", today.format("%B %Y"));
    println!("    Income:   {:>14}", format_cents(month.total_income_cents));
    println!("    Expense:  {:>14}", format_cents(month.total_expense_cents));
    println!();
    println!("  All time");
    println!("    Income:   {:>14}", format_cents(all_time.total_income_cents));
    println!("    Expense:  {:>14}", format_cents(all_time.total_expense_cents));
    println!("    Balance:  {:>14}", format_cents(all_time.balance_cents));
    println!();

    Ok((all_time, month))
}

/// Print income and expense per day of the current month
pub fn cmd_daily(db: &Database, user_id: i64, today: NaiveDate) -> Result<Vec<DailyTotals>> {
    let days = db.daily_trend(user_id, today.year(), today.month())?;

    if days.is_empty() {
        println!("No transactions in {}.", today.format("%B %Y"));
        return Ok(days);
    }

    println!();
    println!("📅 Daily Trend ({})", today.format("%B %Y"));
    println!("   ─────────────────────────────────────────");
    println!("   {:<8} {:>14} {:>14}", "Day", "Income", "Expense");
    for day in &days {
        println!(
            "   {:<8} {:>14} {:>14}",
            day.day,
            format_cents(day.income_cents),
            format_cents(day.expense_cents)
        );
    }

    Ok(days)
}
