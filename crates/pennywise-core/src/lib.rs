//! Pennywise Core Library
//!
//! Shared functionality for the Pennywise personal finance forecaster:
//! - Encrypted transaction ledger with connection pooling
//! - Monthly aggregation and lag features
//! - Small regressors (OLS, regression trees, random forests)
//! - Batch trainers writing content-addressed model artifacts
//! - Request-time forecasts, anomaly scoring and insights
//! - Investment plan suggestions
//! - CSV export/import and demo data seeding

pub mod artifacts;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod features;
pub mod forecast;
pub mod insights;
pub mod invest;
pub mod models;
pub mod outcome;
pub mod regression;
pub mod report;
pub mod seed;
pub mod training;

pub use artifacts::{ArtifactKind, ArtifactStore, ModelSnapshot};
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use export::{ImportStats, TransactionExportOptions};
pub use forecast::{Anomaly, Forecaster, Severity, SpendingSlice, TrendPoint};
pub use insights::{Insight, InsightKind};
pub use invest::{investment_plan, InvestmentPlan, PlanError, RiskProfile};
pub use models::{DailyTotals, LedgerSummary, NewTransaction, Transaction, TransactionType};
pub use outcome::Outcome;
pub use report::{build_analytics, AnalyticsReport};
pub use seed::{seed_demo_data, SeedReport};
pub use training::{Trainer, TrainingReport, TrainStatus};
