//! Model training and artifact status commands

use anyhow::Result;
use pennywise_core::{
    db::Database, ArtifactKind, ArtifactStore, Config, ModelSnapshot, TrainStatus, Trainer,
    TrainingReport,
};

/// Parse a model name as accepted by `train --kind`
pub fn parse_kind(s: &str) -> Result<ArtifactKind> {
    ArtifactKind::all()
        .iter()
        .copied()
        .find(|k| k.as_str() == s)
        .ok_or_else(|| {
            let names: Vec<&str> = ArtifactKind::all().iter().map(|k| k.as_str()).collect();
            anyhow::anyhow!("Unknown model '{}'. Use one of: {}", s, names.join(", "))
        })
}

fn print_status(kind: ArtifactKind, status: &TrainStatus) {
    match status {
        TrainStatus::Saved { version, rows } => {
            let short = version.get(..12).unwrap_or(version.as_str());
            println!("   ✅ {:<14} saved   {} ({} rows)", kind.as_str(), short, rows);
        }
        TrainStatus::Skipped { reason } => {
            println!("   ⏭️  {:<14} skipped {}", kind.as_str(), reason);
        }
        TrainStatus::Failed { reason } => {
            println!("   ❌ {:<14} failed  {}", kind.as_str(), reason);
        }
    }
}

/// Retrain every model, or just one
pub fn cmd_train(db: &Database, config: &Config, kind: Option<&str>) -> Result<TrainingReport> {
    let store = ArtifactStore::new(&config.models_dir);
    let trainer = Trainer::new(db, &store, &config.training);

    println!("🧠 Training models into {}...", store.dir().display());

    let report = match kind {
        Some(name) => {
            let kind = parse_kind(name)?;
            let status = trainer.train(kind).unwrap_or_else(|e| TrainStatus::Failed {
                reason: e.to_string(),
            });
            let mut report = TrainingReport::default();
            report.results.insert(kind, status);
            report
        }
        None => trainer.train_all(),
    };

    for (kind, status) in &report.results {
        print_status(*kind, status);
    }

    println!();
    if report.failed() > 0 {
        anyhow::bail!("{} model(s) failed to train", report.failed());
    }
    println!("✅ {} model(s) saved", report.saved());

    Ok(report)
}

/// Show what is currently trained
pub fn cmd_models(db: &Database, config: &Config) -> Result<()> {
    let store = ArtifactStore::new(&config.models_dir);
    let snapshot = ModelSnapshot::load(&store);
    let versions = snapshot.versions();

    println!();
    println!("📦 Models ({})", store.dir().display());
    println!("   ─────────────────────────────");
    for kind in ArtifactKind::all() {
        match versions.get(kind) {
            Some(version) => {
                let short = version.get(..12).unwrap_or(version.as_str());
                let forest = match kind {
                    ArtifactKind::Category => snapshot.category_model(),
                    ArtifactKind::Savings => snapshot.savings_model(),
                    _ => None,
                };
                match forest {
                    Some(model) => println!(
                        "   {:<14} {} ({} trees, {} nodes)",
                        kind.as_str(),
                        short,
                        model.trees().len(),
                        model.node_count()
                    ),
                    None => println!("   {:<14} {}", kind.as_str(), short),
                }
            }
            None => println!("   {:<14} (not trained)", kind.as_str()),
        }
    }

    println!();
    println!("   Transactions in ledger: {}", db.count_transactions()?);

    Ok(())
}
