//! AI advisor command implementations

use anyhow::{Context, Result};
use finsight_core::models::parse_amount;

use super::{api_result, format_money, print_json, App};

pub async fn cmd_ai_insights(app: &App) -> Result<()> {
    let insights = api_result(
        app.client.insights(&app.session).await,
        "Failed to load insights",
    )?;

    if app.json {
        return print_json(&insights);
    }

    if insights.is_empty() {
        println!("No insights yet. Add a few transactions first.");
        return Ok(());
    }

    println!();
    println!("💡 Insights");
    println!("   ─────────────────────────────────────────");

    for insight in &insights {
        let icon = match insight.kind.as_str() {
            "warning" => "⚠️ ",
            "recommendation" => "👉",
            _ => "💡",
        };
        let impact = insight
            .impact
            .as_deref()
            .map(|i| format!(" [{}]", i))
            .unwrap_or_default();

        println!("   {} {}{}", icon, insight.title, impact);
        if !insight.description.is_empty() {
            println!("      {}", insight.description);
        }
    }

    Ok(())
}

pub async fn cmd_ai_forecast(app: &App, months: Option<u32>) -> Result<()> {
    let forecast = api_result(
        app.client.forecast(&app.session, months).await,
        "Failed to load forecast",
    )?;

    if app.json {
        return print_json(&forecast);
    }

    if forecast.is_empty() {
        println!("No forecast available.");
        return Ok(());
    }

    println!();
    println!("🔮 Expense Forecast");
    println!("   ─────────────────────────────────────────");

    for period in &forecast {
        println!(
            "   {:<10} {:>14}  ({:.0}% confidence)",
            period.period,
            format_money(period.predicted_expenses),
            period.confidence_level
        );
        if let Some(income) = period.predicted_income {
            println!("              income  {:>14}", format_money(income));
        }
        if let Some(savings) = period.predicted_savings {
            println!("              savings {:>14}", format_money(savings));
        }
        for driver in &period.key_drivers {
            println!("              • {}", driver);
        }
    }

    Ok(())
}

pub async fn cmd_ai_chat(app: &App, words: &[String]) -> Result<()> {
    let message = words.join(" ");
    if message.trim().is_empty() {
        anyhow::bail!("Message is empty");
    }

    let reply = api_result(
        app.client.chat(&app.session, message.trim()).await,
        "The advisor is unavailable right now",
    )?;

    if app.json {
        return print_json(&reply);
    }

    println!();
    println!("🤖 {}", reply.response);
    Ok(())
}

pub async fn cmd_ai_categorize(app: &App, description: &str, amount: &str) -> Result<()> {
    let amount = parse_amount(amount).context("Invalid amount")?;

    let suggestion = api_result(
        app.client
            .categorize(&app.session, description.trim(), amount)
            .await,
        "Failed to categorize transaction",
    )?;

    if app.json {
        return print_json(&suggestion);
    }

    match suggestion.confidence_percent() {
        Some(confidence) => println!(
            "🏷️  {} ({:.0}% confidence)",
            suggestion.category, confidence
        ),
        None => println!("🏷️  {}", suggestion.category),
    }
    Ok(())
}
