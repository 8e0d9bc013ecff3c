//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Resolve the config file and --models-dir override
//! - `resolve_today` / `parse_date` - Date argument handling
//! - `cmd_init` / `cmd_status` - Initialize and inspect the database

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use pennywise_core::{db::Database, Config};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Load configuration, applying the --models-dir override
pub fn load_config(config_path: Option<&Path>, models_dir: Option<&Path>) -> Result<Config> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    Ok(match models_dir {
        Some(dir) => config.with_models_dir(dir),
        None => config,
    })
}

/// Parse a YYYY-MM-DD argument
pub fn parse_date(s: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid {} date format (use YYYY-MM-DD)", flag))
}

/// The --today override, or the local date
pub fn resolve_today(today: Option<&str>) -> Result<NaiveDate> {
    match today {
        Some(s) => parse_date(s, "--today"),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;
    let count = db.count_transactions()?;
    println!("   Transactions: {}", count);
    print_encryption(&db)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add data: pennywise import --file ledger.csv (or pennywise seed --user 1)");
    println!("  2. Train models: pennywise train");
    println!("  3. View forecasts: pennywise analytics --user 1");

    Ok(())
}

fn print_encryption(db: &Database) -> Result<()> {
    if db.is_encrypted()? {
        println!("   🔒 Encryption: ENABLED");
    } else {
        println!("   ⚠️  Encryption: DISABLED");
    }
    Ok(())
}

/// Print where the ledger lives and whether it is encrypted
pub fn cmd_status(db: &Database) -> Result<()> {
    println!();
    println!("📊 Pennywise Status");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Database: {}", db.path());

    if let Ok(metadata) = std::fs::metadata(db.path()) {
        let size_kb = metadata.len() as f64 / 1024.0;
        if size_kb < 1024.0 {
            println!("   Size: {:.1} KB", size_kb);
        } else {
            println!("   Size: {:.1} MB", size_kb / 1024.0);
        }
    }

    print_encryption(db)?;
    println!("   Transactions: {}", db.count_transactions()?);
    println!();

    Ok(())
}
