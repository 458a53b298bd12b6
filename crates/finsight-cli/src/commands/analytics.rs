//! Analytics command implementations (expenses, summary, categories)

use anyhow::Result;
use chrono::Utc;
use finsight_core::CategoryAmount;

use super::{api_result, format_money, print_json, resolve_period, App};

pub async fn cmd_analytics_expenses(
    app: &App,
    period: &str,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    let (start, end) = resolve_period(period, from, to, Utc::now().date_naive())?;

    let analytics = api_result(
        app.client
            .expense_analytics(&app.session, start, end)
            .await,
        "Failed to load expense analytics",
    )?;

    if app.json {
        return print_json(&analytics);
    }

    let range = match (start, end) {
        (None, None) => "all time".to_string(),
        (Some(s), Some(e)) => format!("{} to {}", s, e),
        (Some(s), None) => format!("since {}", s),
        (None, Some(e)) => format!("until {}", e),
    };

    println!();
    println!("📈 Expense Analytics ({})", range);
    println!("   ─────────────────────────────────────────");
    println!("   Income:   {:>14}", format_money(analytics.total_income));
    println!("   Expenses: {:>14}", format_money(analytics.total_expenses));
    println!("   Net:      {:>14}", format_money(analytics.net_income));

    if !analytics.expense_by_category.is_empty() {
        let mut categories: Vec<(&String, &f64)> = analytics.expense_by_category.iter().collect();
        categories.sort_by(|a, b| b.1.total_cmp(a.1));

        println!();
        println!("   By category:");
        for (category, amount) in categories {
            println!("     {:<22} {:>14}", category, format_money(*amount));
        }
    }

    if !analytics.monthly_trends.is_empty() {
        println!();
        println!("   Month      Income          Expenses");
        for trend in &analytics.monthly_trends {
            println!(
                "   {:<8} {:>14} {:>14}",
                trend.month,
                format_money(trend.income),
                format_money(trend.expenses)
            );
        }
    }

    Ok(())
}

pub async fn cmd_analytics_summary(app: &App) -> Result<()> {
    let summary = api_result(
        app.client.income_expense_summary(&app.session).await,
        "Failed to load summary",
    )?;

    if app.json {
        return print_json(&summary);
    }

    println!();
    println!("💰 Income vs. Expenses");
    println!("   ─────────────────────────────────────────");
    println!("   Income:       {:>14}", format_money(summary.total_income));
    println!("   Expenses:     {:>14}", format_money(summary.total_expenses));
    println!("   Net savings:  {:>14}", format_money(summary.net_savings));
    println!("   Savings rate: {:>13.1}%", summary.savings_rate);

    Ok(())
}

pub async fn cmd_analytics_categories(app: &App) -> Result<()> {
    let breakdown = api_result(
        app.client.category_breakdown(&app.session).await,
        "Failed to load category breakdown",
    )?;
    let entries = breakdown.into_sorted();

    if app.json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("No spending recorded yet.");
        return Ok(());
    }

    println!();
    println!("🏷️  Spending by Category");
    println!("   ─────────────────────────────────────────");
    print_category_bars(&entries);

    Ok(())
}

/// Category lines with a proportional bar
pub(crate) fn print_category_bars(entries: &[CategoryAmount]) {
    for entry in entries {
        let width = (entry.percentage / 5.0).round().clamp(0.0, 20.0) as usize;
        println!(
            "   {:<22} {:>14} {:>5.1}% {}",
            entry.category,
            format_money(entry.amount),
            entry.percentage,
            "█".repeat(width)
        );
    }
}
