//! Pennywise CLI - Personal finance forecaster
//!
//! Usage:
//!   pennywise init                    Initialize database
//!   pennywise import --file CSV       Import transactions
//!   pennywise train                   Retrain every model
//!   pennywise summary --user 1        Income, expense and balance totals
//!   pennywise analytics --user 1      Print the analytics report as JSON

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Status => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_status(&db)
        }
        Commands::Add {
            user,
            kind,
            category,
            amount,
            date,
            description,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let date = commands::resolve_today(date.as_deref())?;
            commands::cmd_add(
                &db,
                user,
                &kind,
                &category,
                &amount,
                date,
                description.as_deref(),
            )?;
            Ok(())
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_transactions_list(&db, None, 20),
                Some(TransactionsAction::List { user, limit }) => {
                    commands::cmd_transactions_list(&db, user, limit)
                }
                Some(TransactionsAction::Delete { id }) => {
                    commands::cmd_transactions_delete(&db, id)
                }
                Some(TransactionsAction::Clear { user, yes }) => {
                    if !yes && !commands::confirm_clear(user)? {
                        println!("Cancelled.");
                        return Ok(());
                    }
                    commands::cmd_transactions_clear(&db, user)?;
                    Ok(())
                }
            }
        }
        Commands::Import { file } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import(&db, &file)?;
            Ok(())
        }
        Commands::Export {
            output,
            user,
            from,
            to,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_export_transactions(&db, output, user, from, to)?;
            Ok(())
        }
        Commands::Seed {
            user,
            seed,
            today,
            yes,
        } => {
            let today = commands::resolve_today(today.as_deref())?;
            if !yes && !commands::confirm_seed(user)? {
                println!("Cancelled.");
                return Ok(());
            }
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_seed(&db, user, today, seed)?;
            Ok(())
        }
        Commands::Summary { user, today } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let today = commands::resolve_today(today.as_deref())?;
            commands::cmd_summary(&db, user, today)?;
            Ok(())
        }
        Commands::Daily { user, today } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let today = commands::resolve_today(today.as_deref())?;
            commands::cmd_daily(&db, user, today)?;
            Ok(())
        }
        Commands::Train { kind } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref(), cli.models_dir.as_deref())?;
            commands::cmd_train(&db, &config, kind.as_deref())?;
            Ok(())
        }
        Commands::Models => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref(), cli.models_dir.as_deref())?;
            commands::cmd_models(&db, &config)
        }
        Commands::Analytics { user, today } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref(), cli.models_dir.as_deref())?;
            let today = commands::resolve_today(today.as_deref())?;
            commands::cmd_analytics(&db, &config, user, today)?;
            Ok(())
        }
        Commands::Invest { user, today } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref(), cli.models_dir.as_deref())?;
            let today = commands::resolve_today(today.as_deref())?;
            commands::cmd_invest(&db, &config, user, today)?;
            Ok(())
        }
    }
}
