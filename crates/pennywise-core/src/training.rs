//! Batch model trainers
//!
//! Five independent tasks rebuild the persisted models from the full ledger:
//!
//! | Artifact | Rows | Model |
//! |---|---|---|
//! | next_month | monthly totals per user | linear regression |
//! | category | monthly totals per (user, category) | random forest |
//! | savings | monthly income - expense per user | random forest |
//! | anomaly_stats | expense amounts per user | mean / sample std |
//! | trend_slopes | all amounts per user, time-ordered | OLS slope |
//!
//! A trainer that finds nothing to learn from writes nothing, so the previous
//! artifact stays in place.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::artifacts::{AnomalyStats, ArtifactKind, ArtifactStore, TrendSlopes, UserStats};
use crate::config::TrainingConfig;
use crate::db::Database;
use crate::error::Result;
use crate::features::{monthly_aggregates, with_lags, MonthlyAggregate, Partition};
use crate::models::Transaction;
use crate::regression::{simple_slope, LinearRegression, RandomForest, Regressor};

/// Users with fewer expense rows are left out of the anomaly stats
pub const MIN_ANOMALY_ROWS: usize = 3;

/// Users with fewer transactions get no trend slope
pub const MIN_TREND_ROWS: usize = 6;

/// Result of one trainer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrainStatus {
    Saved { version: String, rows: usize },
    Skipped { reason: String },
    Failed { reason: String },
}

impl TrainStatus {
    fn skipped(reason: &str) -> Self {
        Self::Skipped {
            reason: reason.to_string(),
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Outcome of a full training run
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrainingReport {
    pub results: BTreeMap<ArtifactKind, TrainStatus>,
}

impl TrainingReport {
    pub fn saved(&self) -> usize {
        self.results.values().filter(|s| s.is_saved()).count()
    }

    pub fn failed(&self) -> usize {
        self.results
            .values()
            .filter(|s| matches!(s, TrainStatus::Failed { .. }))
            .count()
    }

    pub fn get(&self, kind: ArtifactKind) -> Option<&TrainStatus> {
        self.results.get(&kind)
    }
}

/// Rebuilds model artifacts from the ledger
pub struct Trainer<'a> {
    db: &'a Database,
    store: &'a ArtifactStore,
    config: &'a TrainingConfig,
}

impl<'a> Trainer<'a> {
    pub fn new(db: &'a Database, store: &'a ArtifactStore, config: &'a TrainingConfig) -> Self {
        Self { db, store, config }
    }

    /// Run every trainer. A failing trainer does not stop the others.
    pub fn train_all(&self) -> TrainingReport {
        let mut report = TrainingReport::default();

        for &kind in ArtifactKind::all() {
            let status = match self.train(kind) {
                Ok(status) => status,
                Err(e) => {
                    warn!(artifact = %kind, error = %e, "Training failed");
                    TrainStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            report.results.insert(kind, status);
        }

        report
    }

    /// Run a single trainer
    pub fn train(&self, kind: ArtifactKind) -> Result<TrainStatus> {
        match kind {
            ArtifactKind::NextMonth => self.train_next_month(),
            ArtifactKind::Category => self.train_category(),
            ArtifactKind::Savings => self.train_savings(),
            ArtifactKind::AnomalyStats => self.train_anomaly_stats(),
            ArtifactKind::TrendSlopes => self.train_trend_slopes(),
        }
    }

    /// Linear model of next month's total expense per user
    pub fn train_next_month(&self) -> Result<TrainStatus> {
        let txs = self.db.all_transactions()?;
        if txs.is_empty() {
            return Ok(TrainStatus::skipped("No transaction data found"));
        }

        let aggs = monthly_aggregates(&txs, Partition::User);
        let rows = with_lags(&aggs, |a| a.expense_total);
        if rows.is_empty() {
            return Ok(TrainStatus::skipped("Not enough monthly history"));
        }

        let x: Vec<Vec<f64>> = rows.iter().map(|r| r.expense_features().to_vec()).collect();
        let y: Vec<f64> = rows.iter().map(|r| r.aggregate.expense_total).collect();

        let mut model = LinearRegression::new();
        model.fit(&x, &y)?;
        self.save(ArtifactKind::NextMonth, rows.len(), &model)
    }

    /// Forest over monthly expense per (user, category)
    pub fn train_category(&self) -> Result<TrainStatus> {
        let txs = self.db.all_transactions()?;
        if txs.is_empty() {
            return Ok(TrainStatus::skipped("No transaction data found"));
        }

        let aggs = monthly_aggregates(&txs, Partition::UserCategory);
        let rows = with_lags(&aggs, |a| a.expense_total);
        if rows.is_empty() {
            return Ok(TrainStatus::skipped("Not enough monthly history per category"));
        }

        let x: Vec<Vec<f64>> = rows.iter().map(|r| r.expense_features().to_vec()).collect();
        let y: Vec<f64> = rows.iter().map(|r| r.aggregate.expense_total).collect();

        let mut model = RandomForest::new(self.config.category_trees, None, self.config.seed);
        model.fit(&x, &y)?;
        self.save(ArtifactKind::Category, rows.len(), &model)
    }

    /// Shallow forest over monthly savings per user
    pub fn train_savings(&self) -> Result<TrainStatus> {
        let txs = self.db.all_transactions()?;
        if txs.is_empty() {
            return Ok(TrainStatus::skipped("No transaction data found"));
        }

        let aggs = monthly_aggregates(&txs, Partition::User);
        let rows = with_lags(&aggs, MonthlyAggregate::savings);
        if rows.is_empty() {
            return Ok(TrainStatus::skipped("Not enough monthly history"));
        }

        let x: Vec<Vec<f64>> = rows.iter().map(|r| r.savings_features().to_vec()).collect();
        let y: Vec<f64> = rows.iter().map(|r| r.aggregate.savings()).collect();

        let mut model = RandomForest::new(
            self.config.savings_trees,
            Some(self.config.savings_max_depth),
            self.config.seed,
        );
        model.fit(&x, &y)?;
        self.save(ArtifactKind::Savings, rows.len(), &model)
    }

    /// Per-user mean and sample standard deviation of expense amounts
    pub fn train_anomaly_stats(&self) -> Result<TrainStatus> {
        let txs = self.db.all_transactions()?;
        let expenses: Vec<&Transaction> = txs.iter().filter(|t| t.is_expense()).collect();
        if expenses.is_empty() {
            return Ok(TrainStatus::skipped("No expense data found"));
        }

        let stats = anomaly_stats(&expenses);
        if stats.is_empty() {
            return Ok(TrainStatus::skipped("No user has enough varied expenses"));
        }
        self.save(ArtifactKind::AnomalyStats, expenses.len(), &stats)
    }

    /// Per-user slope of transaction amounts over time
    pub fn train_trend_slopes(&self) -> Result<TrainStatus> {
        let txs = self.db.all_transactions()?;
        if txs.is_empty() {
            return Ok(TrainStatus::skipped("No transaction data found"));
        }

        let slopes = trend_slopes(&txs);
        if slopes.is_empty() {
            return Ok(TrainStatus::skipped("No user has enough transactions"));
        }
        self.save(ArtifactKind::TrendSlopes, txs.len(), &slopes)
    }

    fn save<M: Serialize>(&self, kind: ArtifactKind, rows: usize, model: &M) -> Result<TrainStatus> {
        let version = self.store.save(kind, rows, model)?;
        info!(artifact = %kind, rows, version = %version, "Saved model");
        Ok(TrainStatus::Saved { version, rows })
    }
}

fn by_user<'t, I>(txs: I) -> BTreeMap<i64, Vec<&'t Transaction>>
where
    I: IntoIterator<Item = &'t Transaction>,
{
    let mut users: BTreeMap<i64, Vec<&Transaction>> = BTreeMap::new();
    for tx in txs {
        users.entry(tx.user_id).or_default().push(tx);
    }
    users
}

/// Mean and sample std per user; users with too few rows or zero spread are left out
pub fn anomaly_stats(expenses: &[&Transaction]) -> AnomalyStats {
    let mut stats = AnomalyStats::new();

    for (user_id, txs) in by_user(expenses.iter().copied()) {
        if txs.len() < MIN_ANOMALY_ROWS {
            continue;
        }
        let amounts: Vec<f64> = txs.iter().map(|t| t.amount()).collect();
        let n = amounts.len() as f64;
        let mean = amounts.iter().sum::<f64>() / n;
        let var = amounts.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let std = var.sqrt();
        if std == 0.0 {
            continue;
        }
        stats.insert(user_id, UserStats { mean, std });
    }

    stats
}

/// Slope of amount against sequence index per user (all types, date order)
pub fn trend_slopes(txs: &[Transaction]) -> TrendSlopes {
    let mut slopes = TrendSlopes::new();

    for (user_id, mut user_txs) in by_user(txs) {
        if user_txs.len() < MIN_TREND_ROWS {
            continue;
        }
        user_txs.sort_by_key(|t| (t.date, t.id));
        let amounts: Vec<f64> = user_txs.iter().map(|t| t.amount()).collect();
        slopes.insert(user_id, simple_slope(&amounts));
    }

    slopes
}
