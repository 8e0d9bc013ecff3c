//! Request-time predictions
//!
//! A `Forecaster` rebuilds the same feature vectors the trainers used, from a
//! trailing window of the user's ledger, and runs them through one pinned
//! `ModelSnapshot`. Every predictor returns an `Outcome` instead of failing.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::artifacts::{ModelSnapshot, UserStats};
use crate::config::ForecastConfig;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::features::{
    monthly_aggregates, partitions, ExpenseFeatures, MonthlyAggregate, Partition,
    SavingsFeatures, LAGS,
};
use crate::models::{cents_to_f64, TransactionType};
use crate::outcome::Outcome;
use crate::regression::Regressor;

/// Z-score above which an expense is flagged
pub const ANOMALY_Z: f64 = 2.0;

/// Z-score above which a flagged expense is high severity
pub const HIGH_SEVERITY_Z: f64 = 3.0;

/// Chart colors for current spending, assigned in order and cycled
pub const PALETTE: [&str; 10] = [
    "#8B5CF6", "#10B981", "#F59E0B", "#EF4444", "#06B6D4", "#84CC16", "#EC4899", "#3B82F6",
    "#6366F1", "#F97316",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// An expense far from the user's usual amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub severity: Severity,
}

/// One month of a backtest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Abbreviated month name ("Jan")
    pub month: String,
    pub actual: f64,
    pub predicted: f64,
}

/// One slice of the current month's spending chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingSlice {
    pub name: String,
    pub value: f64,
    pub color: String,
}

/// |x - mean| / std, or 0 when the spread is zero
pub fn z_score(amount: f64, stats: &UserStats) -> f64 {
    if stats.std > 0.0 {
        ((amount - stats.mean) / stats.std).abs()
    } else {
        0.0
    }
}

/// Severity for an amount, or None if it is not unusual
pub fn classify(amount: f64, stats: &UserStats) -> Option<Severity> {
    let z = z_score(amount, stats);
    if z > HIGH_SEVERITY_Z {
        Some(Severity::High)
    } else if z > ANOMALY_Z {
        Some(Severity::Medium)
    } else {
        None
    }
}

/// Per-user predictor bound to one snapshot and one notion of "today"
pub struct Forecaster<'a> {
    db: &'a Database,
    snapshot: &'a ModelSnapshot,
    config: &'a ForecastConfig,
    today: NaiveDate,
}

impl<'a> Forecaster<'a> {
    pub fn new(
        db: &'a Database,
        snapshot: &'a ModelSnapshot,
        config: &'a ForecastConfig,
        today: NaiveDate,
    ) -> Self {
        Self {
            db,
            snapshot,
            config,
            today,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    fn window_start(&self) -> Result<NaiveDate> {
        self.days_before(self.config.lookback_days)
    }

    /// `today` minus a configured window, failing instead of leaving the date range
    fn days_before(&self, days: i64) -> Result<NaiveDate> {
        u64::try_from(days)
            .ok()
            .and_then(|n| self.today.checked_sub_days(Days::new(n)))
            .ok_or_else(|| {
                Error::Config(format!(
                    "window of {} days before {} is out of range",
                    days, self.today
                ))
            })
    }

    /// Total expense expected next month
    pub fn next_month(&self, user_id: i64) -> Outcome<f64> {
        self.try_next_month(user_id).into()
    }

    fn try_next_month(&self, user_id: i64) -> Result<Option<f64>> {
        let Some(model) = self.snapshot.next_month_model() else {
            return Ok(None);
        };

        let txs = self.db.transactions_since(user_id, self.window_start()?, None)?;
        let aggs = monthly_aggregates(&txs, Partition::User);
        let Some(features) = ExpenseFeatures::latest(&aggs, self.today.month()) else {
            return Ok(None);
        };

        Ok(Some(model.predict(&features.to_vec())?.max(0.0)))
    }

    /// Next month's expense per category with enough recent history
    pub fn category_forecast(&self, user_id: i64) -> Outcome<BTreeMap<String, f64>> {
        self.try_category_forecast(user_id).into()
    }

    fn try_category_forecast(&self, user_id: i64) -> Result<Option<BTreeMap<String, f64>>> {
        let Some(model) = self.snapshot.category_model() else {
            return Ok(None);
        };

        let txs = self.db.transactions_since(
            user_id,
            self.window_start()?,
            Some(TransactionType::Expense),
        )?;
        let aggs = monthly_aggregates(&txs, Partition::UserCategory);

        let mut forecasts = BTreeMap::new();
        for series in partitions(&aggs) {
            let Some(features) = ExpenseFeatures::latest(series, self.today.month()) else {
                continue;
            };
            let Some(category) = series[0].category.clone() else {
                continue;
            };
            let prediction = model.predict(&features.to_vec())?;
            forecasts.insert(category, prediction.max(0.0));
        }

        Ok(Some(forecasts))
    }

    /// Income minus expense expected next month (may be negative)
    pub fn savings(&self, user_id: i64) -> Outcome<f64> {
        self.try_savings(user_id).into()
    }

    fn try_savings(&self, user_id: i64) -> Result<Option<f64>> {
        let Some(model) = self.snapshot.savings_model() else {
            return Ok(None);
        };

        let txs = self.db.transactions_since(user_id, self.window_start()?, None)?;
        let aggs = monthly_aggregates(&txs, Partition::User);
        let Some(features) = SavingsFeatures::latest(&aggs, self.today.month()) else {
            return Ok(None);
        };

        Ok(Some(model.predict(&features.to_vec())?))
    }

    /// Unusual amounts among the most recent expenses
    pub fn anomalies(&self, user_id: i64) -> Outcome<Vec<Anomaly>> {
        self.try_anomalies(user_id).into()
    }

    fn try_anomalies(&self, user_id: i64) -> Result<Option<Vec<Anomaly>>> {
        let Some(all_stats) = self.snapshot.anomaly_stats() else {
            return Ok(None);
        };
        let Some(stats) = all_stats.get(&user_id) else {
            return Ok(Some(Vec::new()));
        };

        let recent = self.db.recent_expenses(user_id, self.config.anomaly_sample)?;
        let anomalies = recent
            .into_iter()
            .filter_map(|tx| {
                let amount = tx.amount();
                classify(amount, stats).map(|severity| Anomaly {
                    category: tx.category,
                    amount,
                    date: tx.date,
                    severity,
                })
            })
            .collect();

        Ok(Some(anomalies))
    }

    /// Actual vs backtested expense for every month with three months before it
    pub fn monthly_trends(&self, user_id: i64) -> Outcome<Vec<TrendPoint>> {
        self.try_monthly_trends(user_id).into()
    }

    fn try_monthly_trends(&self, user_id: i64) -> Result<Option<Vec<TrendPoint>>> {
        let Some(model) = self.snapshot.next_month_model() else {
            return Ok(None);
        };

        let aggs = self.user_months(user_id)?;
        let mut points = Vec::new();
        for i in LAGS..aggs.len() {
            let Some(features) = ExpenseFeatures::backtest(&aggs, i) else {
                continue;
            };
            let predicted = model.predict(&features.to_vec())?.max(0.0);
            points.push(trend_point(&aggs[i], aggs[i].expense_total, predicted));
        }

        Ok(Some(points))
    }

    /// Actual vs backtested savings for every month with three months before it
    pub fn savings_over_time(&self, user_id: i64) -> Outcome<Vec<TrendPoint>> {
        self.try_savings_over_time(user_id).into()
    }

    fn try_savings_over_time(&self, user_id: i64) -> Result<Option<Vec<TrendPoint>>> {
        let Some(model) = self.snapshot.savings_model() else {
            return Ok(None);
        };

        let aggs = self.user_months(user_id)?;
        let mut points = Vec::new();
        for i in LAGS..aggs.len() {
            let Some(features) = SavingsFeatures::backtest(&aggs, i) else {
                continue;
            };
            let predicted = model.predict(&features.to_vec())?;
            points.push(trend_point(&aggs[i], aggs[i].savings(), predicted));
        }

        Ok(Some(points))
    }

    fn user_months(&self, user_id: i64) -> Result<Vec<MonthlyAggregate>> {
        let txs = self.db.user_transactions(user_id)?;
        Ok(monthly_aggregates(&txs, Partition::User))
    }

    /// This calendar month's expenses by category, largest first
    pub fn current_spending(&self, user_id: i64) -> Outcome<Vec<SpendingSlice>> {
        self.try_current_spending(user_id).into()
    }

    fn try_current_spending(&self, user_id: i64) -> Result<Option<Vec<SpendingSlice>>> {
        let totals =
            self.db
                .category_totals_for_month(user_id, self.today.year(), self.today.month())?;

        Ok(Some(
            totals
                .into_iter()
                .enumerate()
                .map(|(i, total)| SpendingSlice {
                    name: total.category,
                    value: cents_to_f64(total.total_cents),
                    color: PALETTE[i % PALETTE.len()].to_string(),
                })
                .collect(),
        ))
    }

    /// Trained spending trend slope for the user
    pub fn trend_slope(&self, user_id: i64) -> Option<f64> {
        self.snapshot
            .trend_slopes()
            .and_then(|slopes| slopes.get(&user_id).copied())
    }

    /// Percent of trailing-window income left after expenses
    pub fn savings_rate(&self, user_id: i64) -> Outcome<f64> {
        self.try_savings_rate(user_id).into()
    }

    fn try_savings_rate(&self, user_id: i64) -> Result<Option<f64>> {
        let from = self.days_before(self.config.savings_rate_days)?;
        let income = self.db.sum_since(user_id, TransactionType::Income, from)?;
        if income <= 0 {
            return Ok(None);
        }
        let expense = self.db.sum_since(user_id, TransactionType::Expense, from)?;
        Ok(Some((income - expense) as f64 / income as f64 * 100.0))
    }
}

fn trend_point(agg: &MonthlyAggregate, actual: f64, predicted: f64) -> TrendPoint {
    TrendPoint {
        month: agg.month.format("%b").to_string(),
        actual,
        predicted,
    }
}
