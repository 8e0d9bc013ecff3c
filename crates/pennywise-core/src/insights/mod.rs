//! Insight synthesizer
//!
//! Turns predictor outputs into a short ranked list of notices for the
//! dashboard. Each rule proposes candidates tagged warning, positive or info;
//! the engine then applies one fixed ranking policy:
//!
//! 1. every warning
//! 2. positives, only when there are no warnings
//! 3. info notes in rule order, up to the cap
//! 4. one generic tip if the list is still short
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pennywise_core::insights::{InsightContext, InsightEngine};
//!
//! let ctx = InsightContext { anomalies: &anomalies, savings_rate, trend_slope, category_forecast: &forecast };
//! let insights = InsightEngine::new().generate(&ctx);
//! ```

pub mod engine;
pub mod rules;
pub mod types;

pub use engine::{rank, InsightContext, InsightEngine, InsightRule, MAX_INSIGHTS};
pub use types::{format_rupees, Insight, InsightKind};
