//! Integration tests for pennywise-core
//!
//! These tests exercise the full seed → train → analytics workflow.

use chrono::NaiveDate;
use pennywise_core::{
    artifacts::{ArtifactKind, ArtifactStore, ModelSnapshot},
    build_analytics,
    config::{Config, InvestConfig, TrainingConfig},
    db::Database,
    features::{monthly_aggregates, Partition},
    investment_plan, seed_demo_data, Forecaster, InsightKind, NewTransaction, Trainer,
    TransactionExportOptions, TransactionType,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Small forests keep the tests quick
fn test_config(models_dir: &std::path::Path) -> Config {
    let mut config = Config::default().with_models_dir(models_dir);
    config.training = TrainingConfig {
        seed: 42,
        category_trees: 10,
        savings_trees: 10,
        savings_max_depth: 4,
    };
    config
}

fn train(db: &Database, config: &Config) -> ModelSnapshot {
    let store = ArtifactStore::new(&config.models_dir);
    let report = Trainer::new(db, &store, &config.training).train_all();
    assert_eq!(report.failed(), 0, "{:?}", report);
    ModelSnapshot::load(&store)
}

fn expense(user_id: i64, d: NaiveDate, category: &str, cents: i64) -> NewTransaction {
    NewTransaction::new(user_id, d, TransactionType::Expense, category, cents)
}

fn income(user_id: i64, d: NaiveDate, cents: i64) -> NewTransaction {
    NewTransaction::new(user_id, d, TransactionType::Income, "Salary", cents)
}

// =============================================================================
// Full Workflow
// =============================================================================

#[test]
fn test_seed_train_analytics_workflow() {
    let db = Database::in_memory().expect("Failed to create database");
    let models = tempfile::tempdir().unwrap();
    let config = test_config(models.path());
    let today = date(2025, 8, 20);

    let seeded = seed_demo_data(&db, 3, today, Some(42)).expect("Failed to seed");
    assert_eq!(seeded.incomes, 8);

    let store = ArtifactStore::new(&config.models_dir);
    let report = Trainer::new(&db, &store, &config.training).train_all();
    assert_eq!(report.saved(), 5, "{:?}", report);

    let snapshot = ModelSnapshot::load(&store);
    assert_eq!(snapshot.versions().len(), 5);

    let analytics = build_analytics(&db, &snapshot, &config, 3, today);

    assert!(analytics.next_month_prediction.unwrap() >= 0.0);
    assert!(analytics.savings_prediction.is_some());
    assert!(analytics.category_forecast.values().all(|v| *v >= 0.0));
    // Jan..Aug is 8 months; the first three only feed lags
    assert_eq!(analytics.monthly_trends.len(), 5);
    assert_eq!(analytics.monthly_trends[0].month, "Apr");
    assert_eq!(analytics.savings_over_time.len(), 5);
    assert!(!analytics.current_spending.is_empty());
    assert!(!analytics.insights.is_empty() && analytics.insights.len() <= 6);

    let json = serde_json::to_value(&analytics).unwrap();
    assert!(json["next_month_prediction"].is_number());
    assert!(json["insights"][0]["type"].is_string());

    // Someone else's dashboard stays empty
    let other = build_analytics(&db, &snapshot, &config, 99, today);
    assert!(other.insights.is_empty());
    assert_eq!(other.next_month_prediction, None);
}

#[test]
fn test_investment_plan_after_training() {
    let db = Database::in_memory().unwrap();
    let models = tempfile::tempdir().unwrap();
    let config = test_config(models.path());
    let today = date(2025, 8, 20);

    seed_demo_data(&db, 1, today, Some(9)).unwrap();
    let snapshot = train(&db, &config);
    let forecaster = Forecaster::new(&db, &snapshot, &config.forecast, today);

    let demo = InvestConfig {
        fallback_surplus: Some(50_000.0),
    };
    let plan = investment_plan(&forecaster, 1, &demo).expect("plan with fallback");
    assert!(plan.predicted_surplus > 0.0);
    let a = plan.allocation_percentages;
    assert!((a.low + a.medium + a.high - 1.0).abs() < 1e-9);
    assert_eq!(plan.investment_options.low.len(), 2);
}

// =============================================================================
// Forecasting Properties
// =============================================================================

#[test]
fn test_short_history_gives_nulls_not_errors() {
    let db = Database::in_memory().unwrap();
    let models = tempfile::tempdir().unwrap();
    let config = test_config(models.path());
    let today = date(2025, 6, 15);

    // A long history for user 2 so every model exists
    seed_demo_data(&db, 2, today, Some(5)).unwrap();
    // User 1 only has two months
    db.insert_transactions(&[
        income(1, date(2025, 5, 1), 5_000_000),
        expense(1, date(2025, 5, 3), "Food", 200_000),
        expense(1, date(2025, 6, 3), "Food", 200_000),
    ])
    .unwrap();

    let snapshot = train(&db, &config);
    let analytics = build_analytics(&db, &snapshot, &config, 1, today);

    assert_eq!(analytics.next_month_prediction, None);
    assert_eq!(analytics.savings_prediction, None);
    assert!(analytics.category_forecast.is_empty());
    assert!(analytics.monthly_trends.is_empty());
    assert!(analytics.savings_over_time.is_empty());
}

#[test]
fn test_monthly_savings_is_income_minus_expense() {
    let db = Database::in_memory().unwrap();
    db.insert_transactions(&[
        income(1, date(2025, 3, 1), 5_000_000),
        expense(1, date(2025, 3, 4), "Bills & Utilities", 1_800_000),
        expense(1, date(2025, 3, 20), "Food", 1_200_000),
    ])
    .unwrap();

    let txs = db.user_transactions(1).unwrap();
    let aggs = monthly_aggregates(&txs, Partition::User);
    assert_eq!(aggs.len(), 1);
    assert_eq!(aggs[0].income_total, 50_000.0);
    assert_eq!(aggs[0].expense_total, 30_000.0);
    assert_eq!(aggs[0].savings(), 20_000.0);
}

#[test]
fn test_anomalies_and_low_savings_rank_first() {
    let db = Database::in_memory().unwrap();
    let models = tempfile::tempdir().unwrap();
    let config = test_config(models.path());
    let today = date(2025, 6, 30);

    let mut txs = vec![income(5, date(2025, 6, 1), 3_000_000)];
    for day in 1..=20 {
        let cents = if day % 2 == 0 { 100_000 } else { 120_000 };
        txs.push(expense(5, date(2025, 6, day), "Food", cents));
    }
    txs.push(expense(5, date(2025, 6, 25), "Shopping", 500_000));
    txs.push(expense(5, date(2025, 6, 26), "Shopping", 500_000));
    db.insert_transactions(&txs).unwrap();

    let store = ArtifactStore::new(&config.models_dir);
    Trainer::new(&db, &store, &config.training).train_all();
    let snapshot = ModelSnapshot::load(&store);
    assert!(snapshot.anomaly_stats().is_some());

    let analytics = build_analytics(&db, &snapshot, &config, 5, today);
    assert_eq!(analytics.anomalies.len(), 2);

    let insights = &analytics.insights;
    assert!(insights.len() <= 6);
    let kinds: Vec<InsightKind> = insights.iter().map(|i| i.kind).collect();
    assert_eq!(&kinds[..3], &[InsightKind::Warning; 3]);
    assert_eq!(insights[0].title, "Unusual Spending in Shopping");
    assert_eq!(insights[2].title, "Low Savings Rate");
    assert!(kinds[3..].iter().all(|k| *k == InsightKind::Info));
    assert!(!kinds.contains(&InsightKind::Positive));
}

#[test]
fn test_category_forecast_needs_three_months() {
    let db = Database::in_memory().unwrap();
    let models = tempfile::tempdir().unwrap();
    let config = test_config(models.path());
    let today = date(2025, 6, 15);

    seed_demo_data(&db, 2, today, Some(11)).unwrap();
    db.insert_transactions(&[
        expense(1, date(2025, 3, 3), "Food", 300_000),
        expense(1, date(2025, 4, 3), "Food", 320_000),
        expense(1, date(2025, 5, 3), "Food", 310_000),
        expense(1, date(2025, 4, 9), "Health", 150_000),
        expense(1, date(2025, 5, 9), "Health", 150_000),
    ])
    .unwrap();

    let snapshot = train(&db, &config);
    let analytics = build_analytics(&db, &snapshot, &config, 1, today);

    let categories: Vec<&String> = analytics.category_forecast.keys().collect();
    assert_eq!(categories, vec!["Food"]);
}

// =============================================================================
// Artifact Lifecycle
// =============================================================================

#[test]
fn test_training_empty_ledger_keeps_artifacts() {
    let db = Database::in_memory().unwrap();
    let models = tempfile::tempdir().unwrap();
    let config = test_config(models.path());
    let store = ArtifactStore::new(&config.models_dir);

    seed_demo_data(&db, 1, date(2025, 7, 10), Some(3)).unwrap();
    Trainer::new(&db, &store, &config.training).train_all();
    let before = ModelSnapshot::load(&store).versions();
    assert_eq!(before.len(), 5);

    db.clear_transactions(None).unwrap();
    let report = Trainer::new(&db, &store, &config.training).train_all();
    assert_eq!(report.saved(), 0);

    assert_eq!(ModelSnapshot::load(&store).versions(), before);
    for kind in ArtifactKind::all() {
        assert!(store.path_for(*kind).exists());
    }
}

#[test]
fn test_csv_round_trip_trains_identical_models() {
    let source = Database::in_memory().unwrap();
    seed_demo_data(&source, 1, date(2025, 7, 10), Some(21)).unwrap();
    seed_demo_data(&source, 2, date(2025, 7, 10), Some(22)).unwrap();

    let csv = source
        .export_transactions_csv(&TransactionExportOptions::default())
        .unwrap();
    let target = Database::in_memory().unwrap();
    let stats = target.import_transactions_csv(csv.as_bytes()).unwrap();
    assert_eq!(stats.users, 2);
    assert_eq!(stats.imported as i64, source.count_transactions().unwrap());

    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let a = train(&source, &test_config(dir_a.path())).versions();
    let b = train(&target, &test_config(dir_b.path())).versions();
    assert_eq!(a, b);
}
