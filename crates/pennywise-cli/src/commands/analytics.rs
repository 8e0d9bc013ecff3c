//! Analytics report and investment plan commands
//!
//! Both print JSON to stdout so the output can be piped into other tools.

use anyhow::Result;
use chrono::NaiveDate;
use pennywise_core::{
    build_analytics, db::Database, investment_plan, AnalyticsReport, ArtifactStore, Config,
    Forecaster, InvestmentPlan, ModelSnapshot,
};

pub fn cmd_analytics(
    db: &Database,
    config: &Config,
    user_id: i64,
    today: NaiveDate,
) -> Result<AnalyticsReport> {
    let snapshot = ModelSnapshot::load(&ArtifactStore::new(&config.models_dir));
    let report = build_analytics(db, &snapshot, config, user_id, today);

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(report)
}

pub fn cmd_invest(
    db: &Database,
    config: &Config,
    user_id: i64,
    today: NaiveDate,
) -> Result<InvestmentPlan> {
    let snapshot = ModelSnapshot::load(&ArtifactStore::new(&config.models_dir));
    let forecaster = Forecaster::new(db, &snapshot, &config.forecast, today);
    let plan = investment_plan(&forecaster, user_id, &config.invest)?;

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(plan)
}
