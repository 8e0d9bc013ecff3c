//! Demo data generation
//!
//! Replaces a user's ledger with a plausible year-to-date history: one salary
//! on the 1st of every month and a handful of random expenses, so the
//! trainers and the dashboard have something to work with.

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{NewTransaction, TransactionType};

pub const EXPENSE_CATEGORIES: [&str; 7] = [
    "Bills & Utilities",
    "Entertainment",
    "Food",
    "Health",
    "Shopping",
    "Transportation",
    "Other",
];

/// Expenses are spread over days 1..=28 of past months
const LAST_EXPENSE_DAY: u32 = 28;

/// What a seeding run inserted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeedReport {
    pub removed: usize,
    pub months: u32,
    pub incomes: usize,
    pub expenses: usize,
}

/// Generate demo transactions for January through the current month
///
/// In the current month expenses only fall before `today`.
pub fn demo_transactions<R: Rng>(user_id: i64, today: NaiveDate, rng: &mut R) -> Result<Vec<NewTransaction>> {
    let year = today.year();
    let mut txs = Vec::new();

    for month in 1..=today.month() {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::InvalidData(format!("Invalid month {}-{}", year, month)))?;
        let salary = rng.gen_range(50_000..=75_000_i64) * 100;
        txs.push(
            NewTransaction::new(user_id, first, TransactionType::Income, "Salary", salary)
                .with_description("Monthly Salary"),
        );

        let last_day = if month == today.month() {
            today.day() - 1
        } else {
            LAST_EXPENSE_DAY
        };
        if last_day < 1 {
            continue;
        }

        for _ in 0..rng.gen_range(15..=20) {
            let day = rng.gen_range(1..=last_day);
            let date = NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| Error::InvalidData(format!("Invalid day {}-{}-{}", year, month, day)))?;
            let category = EXPENSE_CATEGORIES
                .choose(rng)
                .copied()
                .unwrap_or("Other");
            let amount = rng.gen_range(500..=5_000_i64) * 100;
            txs.push(
                NewTransaction::new(user_id, date, TransactionType::Expense, category, amount)
                    .with_description("Sample expense"),
            );
        }
    }

    Ok(txs)
}

/// Replace the user's transactions with fresh demo data
pub fn seed_demo_data(db: &Database, user_id: i64, today: NaiveDate, seed: Option<u64>) -> Result<SeedReport> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let txs = demo_transactions(user_id, today, &mut rng)?;

    let removed = db.replace_user_transactions(user_id, &txs)?;

    let incomes = txs
        .iter()
        .filter(|t| t.kind == TransactionType::Income)
        .count();
    let report = SeedReport {
        removed,
        months: today.month(),
        incomes,
        expenses: txs.len() - incomes,
    };
    info!(
        user_id,
        removed = report.removed,
        incomes = report.incomes,
        expenses = report.expenses,
        "Seeded demo transactions"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_demo_transactions_shape() {
        let today = date(2025, 4, 10);
        let mut rng = StdRng::seed_from_u64(1);
        let txs = demo_transactions(9, today, &mut rng).unwrap();

        let incomes: Vec<_> = txs.iter().filter(|t| t.kind == TransactionType::Income).collect();
        assert_eq!(incomes.len(), 4);
        for income in &incomes {
            assert_eq!(income.date.day(), 1);
            assert_eq!(income.category, "Salary");
            assert!((5_000_000..=7_500_000).contains(&income.amount_cents));
        }

        for month in 1..=4 {
            let n = txs
                .iter()
                .filter(|t| t.kind == TransactionType::Expense && t.date.month() == month)
                .count();
            assert!((15..=20).contains(&n), "month {} had {} expenses", month, n);
        }

        for tx in txs.iter().filter(|t| t.kind == TransactionType::Expense) {
            assert_eq!(tx.user_id, 9);
            assert!(EXPENSE_CATEGORIES.contains(&tx.category.as_str()));
            assert!((50_000..=500_000).contains(&tx.amount_cents));
            assert!(tx.date.day() <= 28);
            assert!(tx.date < today);
            assert!(tx.validate().is_ok());
        }
    }

    #[test]
    fn test_first_of_month_has_no_current_expenses() {
        let today = date(2025, 2, 1);
        let mut rng = StdRng::seed_from_u64(2);
        let txs = demo_transactions(1, today, &mut rng).unwrap();

        assert!(txs
            .iter()
            .filter(|t| t.date.month() == 2)
            .all(|t| t.kind == TransactionType::Income));
        assert_eq!(txs.iter().filter(|t| t.date.month() == 2).count(), 1);
    }

    #[test]
    fn test_same_seed_same_data() {
        let today = date(2025, 3, 15);
        let a = demo_transactions(1, today, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = demo_transactions(1, today, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_replaces_only_that_user() {
        let db = Database::in_memory().unwrap();
        db.insert_transactions(&[
            NewTransaction::new(1, date(2024, 1, 1), TransactionType::Expense, "Old", 100),
            NewTransaction::new(2, date(2024, 1, 1), TransactionType::Expense, "Keep", 100),
        ])
        .unwrap();

        let report = seed_demo_data(&db, 1, date(2025, 3, 15), Some(7)).unwrap();
        assert_eq!(report.removed, 1);
        assert_eq!(report.months, 3);
        assert_eq!(report.incomes, 3);

        let user1 = db.user_transactions(1).unwrap();
        assert_eq!(user1.len(), report.incomes + report.expenses);
        assert!(user1.iter().all(|t| t.category != "Old"));
        assert_eq!(db.user_transactions(2).unwrap().len(), 1);
    }

    #[test]
    fn test_failed_seed_keeps_existing_rows() {
        let db = Database::in_memory().unwrap();
        db.insert_transaction(&NewTransaction::new(
            1,
            date(2024, 1, 1),
            TransactionType::Expense,
            "Old",
            100,
        ))
        .unwrap();
        db.conn()
            .unwrap()
            .execute_batch(
                r#"
                CREATE TRIGGER reject_expenses BEFORE INSERT ON transactions
                WHEN NEW.description = 'Sample expense'
                BEGIN SELECT RAISE(ABORT, 'rejected'); END;
                "#,
            )
            .unwrap();

        assert!(seed_demo_data(&db, 1, date(2025, 3, 15), Some(7)).is_err());

        let user1 = db.user_transactions(1).unwrap();
        assert_eq!(user1.len(), 1);
        assert_eq!(user1[0].category, "Old");
    }
}
