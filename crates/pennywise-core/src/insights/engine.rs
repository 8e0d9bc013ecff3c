//! Insight Engine - collects candidates from each rule and ranks them

use std::collections::BTreeMap;

use super::rules::{AnomalyRule, ForecastRule, SavingsRateRule, TrendRule};
use super::types::{Insight, InsightKind};
use crate::forecast::Anomaly;

/// Most insights shown at once
pub const MAX_INSIGHTS: usize = 6;

/// Predictor outputs the rules read from
#[derive(Debug, Clone, Copy)]
pub struct InsightContext<'a> {
    pub anomalies: &'a [Anomaly],
    /// Trailing savings rate in percent, if the user had income
    pub savings_rate: Option<f64>,
    pub trend_slope: Option<f64>,
    pub category_forecast: &'a BTreeMap<String, f64>,
}

/// A source of candidate insights
pub trait InsightRule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> &'static str;

    /// Produce candidates; their kind decides where they rank
    fn candidates(&self, ctx: &InsightContext<'_>) -> Vec<Insight>;
}

/// Runs the rules and applies the ranking policy
pub struct InsightEngine {
    rules: Vec<Box<dyn InsightRule>>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Create an engine with the built-in rules
    ///
    /// Registration order is the order info notes appear in.
    pub fn new() -> Self {
        let mut engine = Self { rules: vec![] };

        engine.register(Box::new(AnomalyRule));
        engine.register(Box::new(SavingsRateRule));
        engine.register(Box::new(TrendRule));
        engine.register(Box::new(ForecastRule));

        engine
    }

    pub fn register(&mut self, rule: Box<dyn InsightRule>) {
        self.rules.push(rule);
    }

    /// Generate and rank insights
    pub fn generate(&self, ctx: &InsightContext<'_>) -> Vec<Insight> {
        let mut candidates = Vec::new();
        for rule in &self.rules {
            let found = rule.candidates(ctx);
            tracing::debug!(rule = rule.id(), count = found.len(), "Insight rule evaluated");
            candidates.extend(found);
        }
        rank(candidates)
    }
}

/// The generic tip used to pad a short list
pub fn filler_tip() -> Insight {
    Insight::info(
        "Savings Opportunity",
        "Consider setting aside 20% of your income for an emergency fund.",
    )
}

/// Warnings first; positives only without warnings; then info; padded with one tip; capped
pub fn rank(candidates: Vec<Insight>) -> Vec<Insight> {
    let mut warnings = Vec::new();
    let mut positives = Vec::new();
    let mut info = Vec::new();
    for insight in candidates {
        match insight.kind {
            InsightKind::Warning => warnings.push(insight),
            InsightKind::Positive => positives.push(insight),
            InsightKind::Info => info.push(insight),
        }
    }

    let mut ranked = warnings;
    if ranked.is_empty() {
        ranked.extend(positives);
    }

    let room = MAX_INSIGHTS.saturating_sub(ranked.len());
    ranked.extend(info.into_iter().take(room));

    if ranked.len() < MAX_INSIGHTS {
        ranked.push(filler_tip());
    }

    ranked.truncate(MAX_INSIGHTS);
    ranked
}
