//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use chrono::NaiveDate;
use pennywise_core::config::TrainingConfig;
use pennywise_core::db::Database;
use pennywise_core::{ArtifactKind, Config, TransactionType};

use crate::commands::{self, truncate};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

/// Config pointing at a temp models dir with small forests
fn test_config(models_dir: &std::path::Path) -> Config {
    let mut config = Config::default().with_models_dir(models_dir);
    config.training = TrainingConfig {
        seed: 42,
        category_trees: 5,
        savings_trees: 5,
        savings_max_depth: 3,
    };
    config
}

// ========== Transaction Command Tests ==========

#[test]
fn test_cmd_add() {
    let db = setup_test_db();
    let id = commands::cmd_add(
        &db,
        1,
        "Expense",
        "Food",
        "1234.50",
        date(2025, 3, 3),
        Some("Groceries"),
    )
    .unwrap();

    let tx = db.get_transaction(id).unwrap().unwrap();
    assert_eq!(tx.kind, TransactionType::Expense);
    assert_eq!(tx.amount_cents, 123_450);
    assert_eq!(tx.description, "Groceries");
}

#[test]
fn test_cmd_add_rejects_bad_input() {
    let db = setup_test_db();
    assert!(commands::cmd_add(&db, 1, "transfer", "Food", "10", date(2025, 3, 3), None).is_err());
    assert!(commands::cmd_add(&db, 1, "expense", "Food", "-10", date(2025, 3, 3), None).is_err());
    assert!(commands::cmd_add(&db, 1, "expense", "Food", "ten", date(2025, 3, 3), None).is_err());
    assert!(commands::cmd_add(&db, 1, "expense", "  ", "10", date(2025, 3, 3), None).is_err());
    assert_eq!(db.count_transactions().unwrap(), 0);
}

#[test]
fn test_cmd_transactions_list() {
    let db = setup_test_db();
    assert!(commands::cmd_transactions_list(&db, None, 20).is_ok());

    commands::cmd_add(&db, 2, "income", "Salary", "50000", date(2025, 3, 1), None).unwrap();
    assert!(commands::cmd_transactions_list(&db, Some(2), 5).is_ok());
}

#[test]
fn test_cmd_transactions_delete() {
    let db = setup_test_db();
    let id = commands::cmd_add(&db, 1, "expense", "Food", "10", date(2025, 3, 3), None).unwrap();

    assert!(commands::cmd_transactions_delete(&db, id).is_ok());
    assert!(db.get_transaction(id).unwrap().is_none());

    let err = commands::cmd_transactions_delete(&db, id).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_cmd_transactions_clear() {
    let db = setup_test_db();
    commands::cmd_add(&db, 1, "expense", "Food", "10", date(2025, 3, 3), None).unwrap();
    commands::cmd_add(&db, 2, "expense", "Food", "10", date(2025, 3, 3), None).unwrap();

    assert_eq!(commands::cmd_transactions_clear(&db, Some(1)).unwrap(), 1);
    assert_eq!(db.count_transactions().unwrap(), 1);
    assert_eq!(commands::cmd_transactions_clear(&db, None).unwrap(), 1);
    assert_eq!(db.count_transactions().unwrap(), 0);
}

// ========== Status / Summary Command Tests ==========

#[test]
fn test_cmd_status() {
    let db = setup_test_db();
    assert!(commands::cmd_status(&db).is_ok());
    assert!(!db.is_encrypted().unwrap());
}

#[test]
fn test_cmd_init_unencrypted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("init.db");
    commands::cmd_init(&path, true).unwrap();
    assert!(path.exists());

    let db = commands::open_db(&path, true).unwrap();
    assert_eq!(db.path(), path.to_str().unwrap());
    assert!(commands::cmd_status(&db).is_ok());
}

#[test]
fn test_cmd_summary() {
    let db = setup_test_db();
    commands::cmd_add(&db, 1, "income", "Salary", "50000", date(2025, 2, 1), None).unwrap();
    commands::cmd_add(&db, 1, "expense", "Rent", "20000", date(2025, 2, 3), None).unwrap();
    commands::cmd_add(&db, 1, "income", "Salary", "50000", date(2025, 3, 1), None).unwrap();
    commands::cmd_add(&db, 1, "expense", "Food", "1250.50", date(2025, 3, 4), None).unwrap();

    let (all_time, month) = commands::cmd_summary(&db, 1, date(2025, 3, 20)).unwrap();
    assert_eq!(all_time.total_income_cents, 10_000_000);
    assert_eq!(all_time.total_expense_cents, 2_125_050);
    assert_eq!(all_time.balance_cents, 7_874_950);
    assert_eq!(month.total_income_cents, 5_000_000);
    assert_eq!(month.total_expense_cents, 125_050);
    assert_eq!(month.balance_cents, all_time.balance_cents);

    let (empty, _) = commands::cmd_summary(&db, 9, date(2025, 3, 20)).unwrap();
    assert_eq!(empty.balance_cents, 0);
}

#[test]
fn test_cmd_daily() {
    let db = setup_test_db();
    assert!(commands::cmd_daily(&db, 1, date(2025, 3, 20)).unwrap().is_empty());

    commands::cmd_add(&db, 1, "income", "Salary", "50000", date(2025, 3, 1), None).unwrap();
    commands::cmd_add(&db, 1, "expense", "Food", "100", date(2025, 3, 9), None).unwrap();
    commands::cmd_add(&db, 1, "expense", "Food", "50", date(2025, 3, 9), None).unwrap();
    commands::cmd_add(&db, 1, "expense", "Food", "70", date(2025, 2, 9), None).unwrap();

    let days = commands::cmd_daily(&db, 1, date(2025, 3, 20)).unwrap();
    let labels: Vec<&str> = days.iter().map(|d| d.day.as_str()).collect();
    assert_eq!(labels, vec!["01 Mar", "09 Mar"]);
    assert_eq!(days[0].income_cents, 5_000_000);
    assert_eq!(days[1].expense_cents, 15_000);
}

// ========== Import / Export Command Tests ==========

#[test]
fn test_cmd_import() {
    let db = setup_test_db();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "id,user_id,date,type,category,amount,description").unwrap();
    writeln!(file, "7,1,2025-01-01,income,Salary,55000.00,Monthly Salary").unwrap();
    writeln!(file, "8,2,2025-01-02,expense,Food,120.5,").unwrap();
    file.flush().unwrap();

    let stats = commands::cmd_import(&db, file.path()).unwrap();
    assert_eq!(stats.imported, 2);
    assert_eq!(stats.users, 2);
    assert_eq!(db.count_transactions().unwrap(), 2);
}

#[test]
fn test_cmd_import_missing_file() {
    let db = setup_test_db();
    let result = commands::cmd_import(&db, std::path::Path::new("/nonexistent/ledger.csv"));
    assert!(result.is_err());
}

#[test]
fn test_cmd_export_to_file() {
    let db = setup_test_db();
    commands::cmd_add(&db, 1, "expense", "Food", "10", date(2025, 3, 3), None).unwrap();
    commands::cmd_add(&db, 1, "expense", "Health", "20", date(2025, 4, 3), None).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let exported = commands::cmd_export_transactions(
        &db,
        Some(path.clone()),
        Some(1),
        Some("2025-04-01".to_string()),
        None,
    )
    .unwrap();
    assert_eq!(exported, 1);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("id,user_id,date,type,category,amount,description"));
    assert!(content.contains("Health,20.00"));
    assert!(!content.contains("Food"));
}

#[test]
fn test_cmd_export_empty_writes_nothing() {
    let db = setup_test_db();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    let exported =
        commands::cmd_export_transactions(&db, Some(path.clone()), None, None, None).unwrap();
    assert_eq!(exported, 0);
    assert!(!path.exists());
}

#[test]
fn test_cmd_export_bad_date() {
    let db = setup_test_db();
    let result =
        commands::cmd_export_transactions(&db, None, None, Some("03/01/2025".to_string()), None);
    assert!(result.is_err());
}

// ========== Seed / Train / Analytics Command Tests ==========

#[test]
fn test_cmd_seed() {
    let db = setup_test_db();
    let report = commands::cmd_seed(&db, 4, date(2025, 5, 12), Some(1)).unwrap();
    assert_eq!(report.incomes, 5);
    assert_eq!(
        db.count_transactions().unwrap(),
        (report.incomes + report.expenses) as i64
    );
}

#[test]
fn test_parse_kind() {
    assert_eq!(
        commands::parse_kind("anomaly_stats").unwrap(),
        ArtifactKind::AnomalyStats
    );
    let err = commands::parse_kind("decision_tree").unwrap_err();
    assert!(err.to_string().contains("next_month"));
}

#[test]
fn test_cmd_train_and_models() {
    let db = setup_test_db();
    let models = tempfile::tempdir().unwrap();
    let config = test_config(models.path());

    commands::cmd_seed(&db, 1, date(2025, 7, 20), Some(3)).unwrap();
    let report = commands::cmd_train(&db, &config, None).unwrap();
    assert_eq!(report.saved(), 5);
    assert!(commands::cmd_models(&db, &config).is_ok());

    let only = commands::cmd_train(&db, &config, Some("trend_slopes")).unwrap();
    assert_eq!(only.results.len(), 1);
    assert!(only.get(ArtifactKind::TrendSlopes).unwrap().is_saved());

    assert!(commands::cmd_train(&db, &config, Some("bogus")).is_err());
}

#[test]
fn test_cmd_train_empty_ledger_skips() {
    let db = setup_test_db();
    let models = tempfile::tempdir().unwrap();
    let config = test_config(models.path());

    let report = commands::cmd_train(&db, &config, None).unwrap();
    assert_eq!(report.saved(), 0);
    assert_eq!(std::fs::read_dir(models.path()).unwrap().count(), 0);
}

#[test]
fn test_cmd_analytics() {
    let db = setup_test_db();
    let models = tempfile::tempdir().unwrap();
    let config = test_config(models.path());
    let today = date(2025, 7, 20);

    // Untrained models still give a report
    commands::cmd_seed(&db, 1, today, Some(3)).unwrap();
    let report = commands::cmd_analytics(&db, &config, 1, today).unwrap();
    assert_eq!(report.next_month_prediction, None);
    assert!(!report.current_spending.is_empty());

    commands::cmd_train(&db, &config, None).unwrap();
    let report = commands::cmd_analytics(&db, &config, 1, today).unwrap();
    assert!(report.next_month_prediction.is_some());
    assert!(report.insights.len() <= 6);
}

#[test]
fn test_cmd_invest() {
    let db = setup_test_db();
    let models = tempfile::tempdir().unwrap();
    let mut config = test_config(models.path());
    let today = date(2025, 7, 20);

    // No models and no fallback: an error, not a made-up plan
    assert!(commands::cmd_invest(&db, &config, 1, today).is_err());

    config.invest.fallback_surplus = Some(50_000.0);
    let plan = commands::cmd_invest(&db, &config, 1, today).unwrap();
    assert_eq!(plan.predicted_surplus, 50_000.0);
}

// ========== Utility Tests ==========

#[test]
fn test_parse_date() {
    assert_eq!(
        commands::parse_date("2025-02-28", "--from").unwrap(),
        date(2025, 2, 28)
    );
    let err = commands::parse_date("2025-02-30", "--from").unwrap_err();
    assert!(err.to_string().contains("--from"));
    assert_eq!(
        commands::resolve_today(Some("2024-12-31")).unwrap(),
        date(2024, 12, 31)
    );
    assert!(commands::resolve_today(None).is_ok());
}

#[test]
fn test_load_config_with_override() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[training]\nseed = 7").unwrap();
    file.flush().unwrap();

    let models = tempfile::tempdir().unwrap();
    let config = commands::load_config(Some(file.path()), Some(models.path())).unwrap();
    assert_eq!(config.training.seed, 7);
    assert_eq!(config.models_dir, models.path());

    let missing = commands::load_config(Some(std::path::Path::new("/nonexistent.toml")), None);
    assert!(missing.is_err());
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a much longer string", 10), "a much ...");
    assert_eq!(truncate("₹₹₹₹₹₹", 5), "₹₹...");
}
