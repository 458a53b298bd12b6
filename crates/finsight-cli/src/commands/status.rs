//! Status, dashboard and offline category commands

use anyhow::{Context, Result};
use finsight_core::categories::{keyword_confidence, suggest_category, SUGGESTED_CATEGORIES};
use finsight_core::{stats, TransactionQuery};
use serde::Serialize;

use super::analytics::print_category_bars;
use super::transactions::print_transaction_row;
use super::{api_result, format_money, print_json, App};

/// Transactions fetched for the dashboard's client-side totals
const DASHBOARD_FETCH_LIMIT: u32 = 100;
const DASHBOARD_RECENT: usize = 5;
const DASHBOARD_TOP_CATEGORIES: usize = 5;

#[derive(Serialize)]
struct StatusReport {
    api_url: String,
    logged_in: bool,
    user: Option<String>,
}

pub async fn cmd_status(app: &App) -> Result<()> {
    let logged_in = app
        .session
        .is_authenticated()
        .context("Failed to read session")?;

    // Only ask the server who we are when there is a token to ask with
    let user = if logged_in {
        match app.client.current_user(&app.session).await {
            Ok(user) => Some(user.email),
            Err(e) => {
                tracing::debug!("Session check failed: {}", e);
                None
            }
        }
    } else {
        None
    };

    if app.json {
        return print_json(&StatusReport {
            api_url: app.client.base_url().to_string(),
            logged_in,
            user,
        });
    }

    println!();
    println!("📊 Finsight Status");
    println!("   ─────────────────────────────────────────");
    println!("   API:     {}", app.client.base_url());
    match (&user, logged_in) {
        (Some(email), _) => println!("   Session: ✅ logged in as {}", email),
        (None, true) => println!("   Session: ⚠️  token stored but not accepted (run 'finsight login')"),
        (None, false) => println!("   Session: not logged in"),
    }

    Ok(())
}

pub async fn cmd_dashboard(app: &App) -> Result<()> {
    let summary = api_result(
        app.client.income_expense_summary(&app.session).await,
        "Failed to load dashboard",
    )?;
    let transactions = api_result(
        app.client
            .list_transactions(
                &app.session,
                &TransactionQuery {
                    limit: Some(DASHBOARD_FETCH_LIMIT),
                    ..Default::default()
                },
            )
            .await,
        "Failed to load transactions",
    )?;

    let recent = stats::recent(&transactions, DASHBOARD_RECENT);
    let mut categories = stats::category_breakdown(&transactions);
    categories.truncate(DASHBOARD_TOP_CATEGORIES);

    if app.json {
        return print_json(&serde_json::json!({
            "summary": summary,
            "recent_transactions": recent,
            "top_categories": categories,
        }));
    }

    println!();
    println!("💰 Dashboard");
    println!("   ─────────────────────────────────────────");
    println!("   Income:       {:>14}", format_money(summary.total_income));
    println!("   Expenses:     {:>14}", format_money(summary.total_expenses));
    println!("   Net savings:  {:>14}", format_money(summary.net_savings));
    println!("   Savings rate: {:>13.1}%", summary.savings_rate);

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");
    if recent.is_empty() {
        println!("   None yet. Add one with 'finsight transactions add'.");
    }
    for tx in &recent {
        print_transaction_row(tx);
    }

    if !categories.is_empty() {
        println!();
        println!("🏷️  Top Categories");
        println!("   ─────────────────────────────────────────");
        print_category_bars(&categories);
    }

    Ok(())
}

/// List the suggested categories, or guess one for a description (no network)
pub fn cmd_categories(description: Option<&str>, json: bool) -> Result<()> {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(description) => {
            let category = suggest_category(description);
            let confidence = keyword_confidence(description, category);
            if json {
                return print_json(&serde_json::json!({
                    "description": description,
                    "category": category,
                    "confidence": confidence,
                }));
            }
            println!("🏷️  {} ({:.0}% confidence)", category, confidence);
        }
        None => {
            if json {
                return print_json(&SUGGESTED_CATEGORIES);
            }
            println!();
            println!("🏷️  Categories");
            println!("   ─────────────────────────────────────────");
            for category in SUGGESTED_CATEGORIES {
                println!("   {}", category);
            }
        }
    }
    Ok(())
}
