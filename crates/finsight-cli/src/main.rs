//! Finsight CLI - Personal finance dashboard in your terminal
//!
//! Usage:
//!   finsight login -e EMAIL          Log in and store the session token
//!   finsight dashboard               Summary, recent transactions, top categories
//!   finsight transactions add D AMT  Record a transaction
//!   finsight ai chat QUESTION        Ask the financial advisor

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use finsight_core::ReportKind;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
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
        .with(fmt::layer().with_target(false).compact())
        .init();

    // Offline command, no config or session needed
    if let Commands::Categories { description } = &cli.command {
        return commands::cmd_categories(description.as_deref(), cli.json);
    }

    let app = commands::open_app(
        cli.config.as_deref(),
        cli.api_url.as_deref(),
        cli.session_file.as_deref(),
        cli.json,
    )?;

    run(&app, cli.command).await
}

async fn run(app: &commands::App, command: Commands) -> Result<()> {
    match command {
        Commands::Login { email, password } => commands::cmd_login(app, &email, &password).await,
        Commands::Register {
            email,
            password,
            name,
        } => commands::cmd_register(app, &email, &password, &name).await,
        Commands::Logout => commands::cmd_logout(app),
        Commands::Whoami => commands::cmd_whoami(app).await,
        Commands::Status => commands::cmd_status(app).await,
        Commands::Dashboard => commands::cmd_dashboard(app).await,
        Commands::Transactions { action } => match action {
            None => commands::cmd_transactions_list(app, 20, None, None, None).await,
            Some(TransactionsAction::List {
                limit,
                skip,
                category,
                search,
            }) => {
                commands::cmd_transactions_list(
                    app,
                    limit,
                    skip,
                    category.as_deref(),
                    search.as_deref(),
                )
                .await
            }
            Some(TransactionsAction::Add {
                description,
                amount,
                category,
                kind,
                date,
            }) => {
                commands::cmd_transactions_add(
                    app,
                    &description,
                    &amount,
                    category.as_deref(),
                    &kind,
                    date.as_deref(),
                )
                .await
            }
            Some(TransactionsAction::Update {
                id,
                amount,
                description,
                category,
                kind,
            }) => {
                commands::cmd_transactions_update(
                    app,
                    id,
                    amount.as_deref(),
                    description.as_deref(),
                    category.as_deref(),
                    kind.as_deref(),
                )
                .await
            }
            Some(TransactionsAction::Delete { id }) => {
                commands::cmd_transactions_delete(app, id).await
            }
        },
        Commands::Analytics { action } => match action {
            AnalyticsAction::Expenses { period, from, to } => {
                commands::cmd_analytics_expenses(app, &period, from.as_deref(), to.as_deref())
                    .await
            }
            AnalyticsAction::Summary => commands::cmd_analytics_summary(app).await,
            AnalyticsAction::Categories => commands::cmd_analytics_categories(app).await,
        },
        Commands::Ai { action } => match action {
            AiAction::Insights => commands::cmd_ai_insights(app).await,
            AiAction::Forecast { months } => commands::cmd_ai_forecast(app, months).await,
            AiAction::Chat { message } => commands::cmd_ai_chat(app, &message).await,
            AiAction::Categorize {
                description,
                amount,
            } => commands::cmd_ai_categorize(app, &description, &amount).await,
        },
        Commands::Report { report_type } => match report_type {
            ReportType::Monthly {
                year,
                month,
                format,
                output,
            } => {
                commands::cmd_report(
                    app,
                    ReportKind::Monthly,
                    year,
                    month,
                    format.as_deref(),
                    output.as_deref(),
                )
                .await
            }
            ReportType::Annual {
                year,
                format,
                output,
            } => {
                commands::cmd_report(
                    app,
                    ReportKind::Annual,
                    year,
                    None,
                    format.as_deref(),
                    output.as_deref(),
                )
                .await
            }
        },
        Commands::Categories { description } => {
            commands::cmd_categories(description.as_deref(), app.json)
        }
    }
}
