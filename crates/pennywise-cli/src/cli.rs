//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Pennywise - Forecast spending and savings from your ledger
#[derive(Parser)]
#[command(name = "pennywise")]
#[command(about = "Personal finance forecaster", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "pennywise.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set PENNYWISE_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Config file (defaults to ~/.local/share/pennywise/config.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding model artifacts (overrides the config file)
    #[arg(long, global = true)]
    pub models_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Show database location, encryption and size
    Status,

    /// Record a transaction
    Add {
        /// Owning user
        #[arg(short, long)]
        user: i64,

        /// Transaction type: income or expense
        #[arg(short = 't', long = "type")]
        kind: String,

        /// Category (e.g. Food, Salary)
        #[arg(short, long)]
        category: String,

        /// Amount, e.g. 1234.50
        #[arg(short, long)]
        amount: String,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Free-text description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Manage transactions (list, delete, clear)
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Import transactions from CSV (id,user_id,date,type,category,amount,description)
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Export transactions to CSV
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only this user's transactions
        #[arg(short, long)]
        user: Option<i64>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Replace a user's transactions with generated demo data
    Seed {
        /// User to seed
        #[arg(short, long)]
        user: i64,

        /// RNG seed for reproducible data
        #[arg(long)]
        seed: Option<u64>,

        /// Pretend today is this date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Show income, expense and balance totals for a user
    Summary {
        /// User to summarize
        #[arg(short, long)]
        user: i64,

        /// Pretend today is this date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },

    /// Show day-by-day income and expense for the current month
    Daily {
        /// User to report on
        #[arg(short, long)]
        user: i64,

        /// Pretend today is this date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },

    /// Retrain models from the whole ledger
    Train {
        /// Only retrain one model: next_month, category, savings, anomaly_stats, trend_slopes
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Show trained model versions and ledger size
    Models,

    /// Print the analytics report for a user as JSON
    Analytics {
        /// User to report on
        #[arg(short, long)]
        user: i64,

        /// Pretend today is this date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },

    /// Print an investment plan for a user as JSON
    Invest {
        /// User to plan for
        #[arg(short, long)]
        user: i64,

        /// Pretend today is this date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List recent transactions
    List {
        /// Only this user's transactions
        #[arg(short, long)]
        user: Option<i64>,

        /// Maximum number to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: i64,
    },

    /// Delete every transaction (or one user's)
    Clear {
        /// Only this user's transactions
        #[arg(short, long)]
        user: Option<i64>,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}
