//! Analytics response assembly
//!
//! Runs every predictor for one user against one model snapshot and folds
//! the outcomes into a response that is always well formed.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::artifacts::ModelSnapshot;
use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::forecast::{Anomaly, Forecaster, SpendingSlice, TrendPoint};
use crate::insights::{Insight, InsightContext, InsightEngine};

/// The analytics dashboard payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub next_month_prediction: Option<f64>,
    pub category_forecast: BTreeMap<String, f64>,
    pub savings_prediction: Option<f64>,
    pub anomalies: Vec<Anomaly>,
    pub monthly_trends: Vec<TrendPoint>,
    pub current_spending: Vec<SpendingSlice>,
    pub savings_over_time: Vec<TrendPoint>,
    pub insights: Vec<Insight>,
}

impl AnalyticsReport {
    /// Report for a user with no transactions
    pub fn empty() -> Self {
        Self::default()
    }

    /// Placeholder figures used when the ledger cannot be read at all
    pub fn fallback() -> Self {
        Self {
            next_month_prediction: Some(35_000.0),
            savings_prediction: Some(12_000.0),
            ..Self::default()
        }
    }
}

/// Build the analytics report for one user
///
/// Never fails: predictor faults become null/empty fields, and a store
/// failure before any predictor runs yields `AnalyticsReport::fallback()`.
pub fn build_analytics(
    db: &Database,
    snapshot: &ModelSnapshot,
    config: &Config,
    user_id: i64,
    today: NaiveDate,
) -> AnalyticsReport {
    match try_build_analytics(db, snapshot, config, user_id, today) {
        Ok(report) => report,
        Err(e) => {
            warn!(user_id, error = %e, "Analytics failed, returning fallback report");
            AnalyticsReport::fallback()
        }
    }
}

fn try_build_analytics(
    db: &Database,
    snapshot: &ModelSnapshot,
    config: &Config,
    user_id: i64,
    today: NaiveDate,
) -> Result<AnalyticsReport> {
    if !db.has_transactions(user_id)? {
        debug!(user_id, "No transactions, returning empty report");
        return Ok(AnalyticsReport::empty());
    }

    let forecaster = Forecaster::new(db, snapshot, &config.forecast, today);

    let next_month_prediction = forecaster.next_month(user_id).into_option("next_month");
    let category_forecast = forecaster
        .category_forecast(user_id)
        .into_value_or_default("category_forecast");
    let savings_prediction = forecaster.savings(user_id).into_option("savings");
    let anomalies = forecaster
        .anomalies(user_id)
        .into_value_or_default("anomalies");
    let monthly_trends = forecaster
        .monthly_trends(user_id)
        .into_value_or_default("monthly_trends");
    let current_spending = forecaster
        .current_spending(user_id)
        .into_value_or_default("current_spending");
    let savings_over_time = forecaster
        .savings_over_time(user_id)
        .into_value_or_default("savings_over_time");

    let ctx = InsightContext {
        anomalies: &anomalies,
        savings_rate: forecaster.savings_rate(user_id).into_option("savings_rate"),
        trend_slope: forecaster.trend_slope(user_id),
        category_forecast: &category_forecast,
    };
    let insights = InsightEngine::new().generate(&ctx);

    Ok(AnalyticsReport {
        next_month_prediction,
        category_forecast,
        savings_prediction,
        anomalies,
        monthly_trends,
        current_spending,
        savings_over_time,
        insights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTransaction, TransactionType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_user_without_transactions_gets_empty_report() {
        let db = Database::in_memory().unwrap();
        let report = build_analytics(
            &db,
            &ModelSnapshot::empty(),
            &Config::default(),
            1,
            date(2025, 6, 1),
        );
        assert_eq!(report, AnalyticsReport::empty());
        assert!(report.insights.is_empty());
    }

    #[test]
    fn test_untrained_models_still_give_well_formed_report() {
        let db = Database::in_memory().unwrap();
        db.insert_transactions(&[
            NewTransaction::new(1, date(2025, 6, 1), TransactionType::Income, "Salary", 5_000_000),
            NewTransaction::new(1, date(2025, 6, 2), TransactionType::Expense, "Food", 1_000_000),
        ])
        .unwrap();

        let report = build_analytics(
            &db,
            &ModelSnapshot::empty(),
            &Config::default(),
            1,
            date(2025, 6, 10),
        );
        assert_eq!(report.next_month_prediction, None);
        assert_eq!(report.savings_prediction, None);
        assert!(report.category_forecast.is_empty());
        assert!(report.anomalies.is_empty());
        assert_eq!(report.current_spending.len(), 1);
        // 80% savings rate
        assert_eq!(report.insights[0].title, "Excellent Savings Rate");
        assert_eq!(report.insights.last().unwrap().title, "Savings Opportunity");
    }

    #[test]
    fn test_out_of_range_windows_degrade_instead_of_panicking() {
        let db = Database::in_memory().unwrap();
        db.insert_transactions(&[
            NewTransaction::new(1, date(2025, 6, 1), TransactionType::Income, "Salary", 5_000_000),
            NewTransaction::new(1, date(2025, 6, 2), TransactionType::Expense, "Food", 1_000_000),
        ])
        .unwrap();

        let mut config = Config::default();
        config.forecast.lookback_days = 1_000_000_000;
        config.forecast.savings_rate_days = 1_000_000_000;

        let report = build_analytics(&db, &ModelSnapshot::empty(), &config, 1, date(2025, 6, 10));
        assert_ne!(report, AnalyticsReport::fallback());
        assert_eq!(report.current_spending.len(), 1);
        assert!(report
            .insights
            .iter()
            .all(|i| i.title != "Excellent Savings Rate"));
    }

    #[test]
    fn test_store_failure_returns_fallback() {
        let db = Database::in_memory().unwrap();
        db.conn()
            .unwrap()
            .execute_batch("DROP TABLE transactions")
            .unwrap();

        let report = build_analytics(
            &db,
            &ModelSnapshot::empty(),
            &Config::default(),
            1,
            date(2025, 6, 10),
        );
        assert_eq!(report, AnalyticsReport::fallback());
    }

    #[test]
    fn test_fallback_values() {
        let report = AnalyticsReport::fallback();
        assert_eq!(report.next_month_prediction, Some(35_000.0));
        assert_eq!(report.savings_prediction, Some(12_000.0));
        assert!(report.monthly_trends.is_empty());
    }

    #[test]
    fn test_report_json_keys() {
        let json = serde_json::to_value(AnalyticsReport::empty()).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys.len(), 8);
        for key in [
            "next_month_prediction",
            "category_forecast",
            "savings_prediction",
            "anomalies",
            "monthly_trends",
            "current_spending",
            "savings_over_time",
            "insights",
        ] {
            assert!(keys.contains(&key), "missing {}", key);
        }
        assert!(json["next_month_prediction"].is_null());
    }
}
