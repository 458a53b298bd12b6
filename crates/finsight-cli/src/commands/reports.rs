//! Report command implementations and period resolution

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use finsight_core::{Report, ReportFormat, ReportKind, ReportQuery};

use super::{api_result, format_money, print_json, App};

/// Date range for a named period; `None` on either side means unbounded
pub type DateRange = (Option<NaiveDate>, Option<NaiveDate>);

fn parse_date(value: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid {} date format (use YYYY-MM-DD)", flag))
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("Invalid month: {}-{:02}", year, month))
}

/// Resolve a named period (or explicit --from/--to) relative to `today`
///
/// Explicit dates win over the period name. `all` leaves both ends open so the
/// server applies no date filter.
pub fn resolve_period(
    period: &str,
    custom_from: Option<&str>,
    custom_to: Option<&str>,
    today: NaiveDate,
) -> Result<DateRange> {
    if custom_from.is_some() || custom_to.is_some() {
        let from = custom_from.map(|f| parse_date(f, "--from")).transpose()?;
        let to = custom_to.map(|t| parse_date(t, "--to")).transpose()?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                anyhow::bail!("--from ({}) is after --to ({})", from, to);
            }
        }
        return Ok((from, to));
    }

    match period.to_lowercase().as_str() {
        "this-month" => Ok((Some(first_of_month(today.year(), today.month())?), Some(today))),
        "last-month" => {
            let this_month = first_of_month(today.year(), today.month())?;
            let last_day = this_month
                .pred_opt()
                .context("Date out of range")?;
            let first_day = first_of_month(last_day.year(), last_day.month())?;
            Ok((Some(first_day), Some(last_day)))
        }
        "this-year" => Ok((Some(first_of_month(today.year(), 1)?), Some(today))),
        "last-30-days" => Ok((Some(today - Duration::days(30)), Some(today))),
        "last-90-days" => Ok((Some(today - Duration::days(90)), Some(today))),
        "all" => Ok((None, None)),
        _ => anyhow::bail!(
            "Unknown period: {}. Available: this-month, last-month, this-year, last-30-days, last-90-days, all",
            period
        ),
    }
}

fn parse_format(format: Option<&str>) -> Result<Option<ReportFormat>> {
    format
        .map(|f| f.parse::<ReportFormat>())
        .transpose()
        .map_err(anyhow::Error::msg)
}

/// Build the query for a report; missing year/month default to the current ones
pub fn report_query(
    kind: ReportKind,
    year: Option<i32>,
    month: Option<u32>,
    format: Option<&str>,
    today: NaiveDate,
) -> Result<ReportQuery> {
    let year = year.unwrap_or_else(|| today.year());
    let month = match kind {
        ReportKind::Monthly => {
            let month = month.unwrap_or_else(|| today.month());
            if !(1..=12).contains(&month) {
                anyhow::bail!("Invalid month: {} (use 1-12)", month);
            }
            Some(month)
        }
        ReportKind::Annual => None,
    };

    Ok(ReportQuery {
        year: Some(year),
        month,
        format: parse_format(format)?,
    })
}

/// Default file name for a downloaded PDF report
pub fn default_pdf_path(kind: ReportKind, query: &ReportQuery) -> PathBuf {
    let period = match (query.year, query.month) {
        (Some(y), Some(m)) => format!("{}-{:02}", y, m),
        (Some(y), None) => y.to_string(),
        _ => "latest".to_string(),
    };
    PathBuf::from(format!("finsight-{}-{}.pdf", kind, period))
}

pub async fn cmd_report(
    app: &App,
    kind: ReportKind,
    year: Option<i32>,
    month: Option<u32>,
    format: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let query = report_query(kind, year, month, format, Utc::now().date_naive())?;

    if query.format == Some(ReportFormat::Pdf) {
        return save_pdf_report(app, kind, &query, output).await;
    }
    if output.is_some() {
        anyhow::bail!("--output is only used with --format pdf");
    }

    let report = api_result(
        app.client
            .generate_report(&app.session, kind, &query)
            .await,
        &format!("Failed to generate {} report", kind),
    )?;

    if app.json {
        return print_json(&report);
    }

    print_report(&report, &query);
    Ok(())
}

async fn save_pdf_report(
    app: &App,
    kind: ReportKind,
    query: &ReportQuery,
    output: Option<&Path>,
) -> Result<()> {
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_pdf_path(kind, query));

    let document = api_result(
        app.client
            .download_report(&app.session, kind, query)
            .await,
        &format!("Failed to download {} report", kind),
    )?;
    std::fs::write(&path, &document)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if app.json {
        return print_json(&serde_json::json!({
            "path": path,
            "bytes": document.len(),
        }));
    }

    println!("📄 Saved {} report to {} ({} bytes)", kind, path.display(), document.len());
    Ok(())
}

fn print_report(report: &Report, query: &ReportQuery) {
    let period = if report.period.is_empty() {
        match (query.year, query.month) {
            (Some(y), Some(m)) => format!("{}-{:02}", y, m),
            (Some(y), None) => y.to_string(),
            _ => String::new(),
        }
    } else {
        report.period.clone()
    };

    println!();
    println!("📊 {} Report: {}", capitalize(report.kind.as_str()), period);
    println!("   ─────────────────────────────────────────");
    println!("   Income:      {:>14}", format_money(report.total_income));
    println!("   Expenses:    {:>14}", format_money(report.total_expenses));
    println!("   Net savings: {:>14}", format_money(report.net_savings));

    if !report.top_categories.is_empty() {
        println!();
        println!("   Top categories:");
        for entry in &report.top_categories {
            println!(
                "     {:<22} {:>14} ({:.1}%)",
                entry.category,
                format_money(entry.amount),
                entry.percentage
            );
        }
    }

    if let Some(generated) = &report.generated_at {
        println!();
        println!("   Generated {}", generated);
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
