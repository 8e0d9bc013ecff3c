//! Built-in insight rules

use super::engine::{InsightContext, InsightRule};
use super::types::{format_rupees, Insight};

/// Warnings shown for unusual expenses
const MAX_ANOMALY_WARNINGS: usize = 2;

/// Savings rate (percent) below which a warning is raised
pub const LOW_SAVINGS_RATE: f64 = 10.0;

/// Savings rate (percent) above which the user is congratulated
pub const HIGH_SAVINGS_RATE: f64 = 20.0;

/// Trend slope beyond which spending counts as rising or falling
pub const TREND_THRESHOLD: f64 = 5.0;

/// Flags the first few anomalous expenses
pub struct AnomalyRule;

impl InsightRule for AnomalyRule {
    fn id(&self) -> &'static str {
        "anomalies"
    }

    fn candidates(&self, ctx: &InsightContext<'_>) -> Vec<Insight> {
        ctx.anomalies
            .iter()
            .take(MAX_ANOMALY_WARNINGS)
            .map(|anomaly| {
                Insight::warning(
                    format!("Unusual Spending in {}", anomaly.category),
                    format!(
                        "A transaction of {} was much higher than your usual spending in this category.",
                        format_rupees(anomaly.amount)
                    ),
                )
            })
            .collect()
    }
}

/// Comments on the trailing savings rate
pub struct SavingsRateRule;

impl InsightRule for SavingsRateRule {
    fn id(&self) -> &'static str {
        "savings_rate"
    }

    fn candidates(&self, ctx: &InsightContext<'_>) -> Vec<Insight> {
        let Some(rate) = ctx.savings_rate else {
            return Vec::new();
        };

        if rate < LOW_SAVINGS_RATE {
            vec![Insight::warning(
                "Low Savings Rate",
                format!(
                    "Your savings rate in the last 30 days was only {:.1}%. Consider reviewing your budget to increase this.",
                    rate
                ),
            )]
        } else if rate > HIGH_SAVINGS_RATE {
            vec![Insight::positive(
                "Excellent Savings Rate",
                format!(
                    "Great job! Your savings rate in the last 30 days was {:.1}%. You are building a strong financial foundation.",
                    rate
                ),
            )]
        } else {
            Vec::new()
        }
    }
}

/// Reads the trained spending trend slope
pub struct TrendRule;

impl InsightRule for TrendRule {
    fn id(&self) -> &'static str {
        "trend"
    }

    fn candidates(&self, ctx: &InsightContext<'_>) -> Vec<Insight> {
        match ctx.trend_slope {
            Some(slope) if slope > TREND_THRESHOLD => vec![Insight::info(
                "Spending Trend",
                "Your overall spending has been trending upwards recently. Keep an eye on your budget.",
            )],
            Some(slope) if slope < -TREND_THRESHOLD => vec![Insight::positive(
                "Great Discipline",
                "Your spending has been trending downwards. Excellent work on managing your budget!",
            )],
            _ => Vec::new(),
        }
    }
}

/// Highlights the largest category forecast
///
/// Forecasts are keyed by category name, so when two categories share the
/// top value the alphabetically first one is reported, not whichever was
/// predicted first.
pub struct ForecastRule;

impl InsightRule for ForecastRule {
    fn id(&self) -> &'static str {
        "forecast"
    }

    fn candidates(&self, ctx: &InsightContext<'_>) -> Vec<Insight> {
        // First maximum wins
        let top = ctx
            .category_forecast
            .iter()
            .fold(None::<(&String, f64)>, |best, (category, &value)| match best {
                Some((_, best_value)) if best_value >= value => best,
                _ => Some((category, value)),
            });

        match top {
            Some((category, prediction)) => vec![Insight::info(
                format!("Forecast: {}", category),
                format!(
                    "We predict your spending on {} next month will be around {}.",
                    category,
                    format_rupees(prediction)
                ),
            )],
            None => Vec::new(),
        }
    }
}
