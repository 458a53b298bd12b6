//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Finsight - Personal finance dashboard in your terminal
#[derive(Parser)]
#[command(name = "finsight")]
#[command(about = "Client for the Finsight personal finance API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Finance API base URL (overrides the config file)
    #[arg(long, env = "FINSIGHT_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Where the session token is stored
    ///
    /// Defaults to ~/.local/share/finsight/session.json
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Config file path (defaults to ~/.local/share/finsight/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session token
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "FINSIGHT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account, then log in
    Register {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "FINSIGHT_PASSWORD", hide_env_values = true)]
        password: String,

        /// Display name
        #[arg(short, long)]
        name: String,
    },

    /// Forget the stored session token
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Show client configuration and session state
    Status,

    /// Show dashboard summary
    Dashboard,

    /// Manage transactions (list, add, update, delete)
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Spending analytics
    Analytics {
        #[command(subcommand)]
        action: AnalyticsAction,
    },

    /// AI advisor: insights, forecasts, chat, categorization
    Ai {
        #[command(subcommand)]
        action: AiAction,
    },

    /// Generate reports
    Report {
        #[command(subcommand)]
        report_type: ReportType,
    },

    /// List suggested categories, or suggest one for a description (offline)
    Categories {
        /// Description to categorize
        description: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List transactions
    List {
        /// Maximum number of transactions
        #[arg(short, long, default_value = "20")]
        limit: u32,

        /// Number of transactions to skip
        #[arg(long)]
        skip: Option<u32>,

        /// Only this category
        #[arg(short, long)]
        category: Option<String>,

        /// Case-insensitive description filter
        ///
        /// Searches the 500 transactions after --skip (or --limit, if larger)
        /// and shows up to --limit matches.
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Add a transaction
    Add {
        /// What the money was for
        description: String,

        /// Amount as a positive number (e.g., 12.50)
        amount: String,

        /// Category (left to the server when omitted)
        #[arg(short, long)]
        category: Option<String>,

        /// income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: String,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Update fields of a transaction
    Update {
        /// Transaction ID
        id: i64,

        /// New amount
        #[arg(long)]
        amount: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New category
        #[arg(long)]
        category: Option<String>,

        /// New type (income or expense)
        #[arg(long = "type")]
        kind: Option<String>,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum AnalyticsAction {
    /// Expense analytics for a period
    Expenses {
        /// Period: this-month, last-month, this-year, last-30-days, last-90-days, all
        #[arg(short, long, default_value = "all")]
        period: String,

        /// Start date (YYYY-MM-DD), overrides period
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD), overrides period
        #[arg(long)]
        to: Option<String>,
    },

    /// Income vs. expense summary
    Summary,

    /// Spending by category
    Categories,
}

#[derive(Subcommand)]
pub enum AiAction {
    /// Personalized insights
    Insights,

    /// Expense forecast
    Forecast {
        /// Months ahead
        #[arg(short, long)]
        months: Option<u32>,
    },

    /// Ask the advisor a question
    Chat {
        /// Message (words are joined with spaces)
        #[arg(required = true)]
        message: Vec<String>,
    },

    /// Ask the server to categorize a transaction
    Categorize {
        /// Transaction description
        description: String,

        /// Amount
        amount: String,
    },
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Monthly report
    Monthly {
        /// Year (defaults to current)
        #[arg(short, long)]
        year: Option<i32>,

        /// Month 1-12 (defaults to current)
        #[arg(short, long)]
        month: Option<u32>,

        /// Output format requested from the server: json, pdf
        #[arg(short, long)]
        format: Option<String>,

        /// Where to save a PDF report (defaults to finsight-<type>-<period>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Annual report
    Annual {
        /// Year (defaults to current)
        #[arg(short, long)]
        year: Option<i32>,

        /// Output format requested from the server: json, pdf
        #[arg(short, long)]
        format: Option<String>,

        /// Where to save a PDF report (defaults to finsight-<type>-<period>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
