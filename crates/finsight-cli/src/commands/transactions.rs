//! Transaction command implementations

use anyhow::{Context, Result};
use finsight_core::models::parse_amount;
use finsight_core::{
    stats, NewTransaction, Totals, Transaction, TransactionForm, TransactionKind,
    TransactionQuery, TransactionUpdate,
};

use super::{api_result, format_money, print_json, truncate, App};

/// One table row: id, date, signed amount, category, description
pub(crate) fn print_transaction_row(tx: &Transaction) {
    let amount_str = match tx.transaction_type {
        TransactionKind::Expense => format!("\x1b[31m-{}\x1b[0m", format_money(tx.magnitude())), // Red for expenses
        TransactionKind::Income => format!("\x1b[32m+{}\x1b[0m", format_money(tx.magnitude())), // Green for income
    };
    let marker = if tx.ai_categorized { "*" } else { " " };

    println!(
        "   [{:>4}] {} │ {:>22} │ {:<18}{}│ {}",
        tx.id,
        tx.date.get(..10).unwrap_or(&tx.date),
        amount_str,
        truncate(&tx.category, 18),
        marker,
        truncate(&tx.description, 36)
    );
}

/// Page size fetched when searching, so matches past the first page are found
pub const SEARCH_FETCH_LIMIT: u32 = 500;

/// Server query for a listing; a search widens the page and filters locally
pub fn list_query(
    limit: u32,
    skip: Option<u32>,
    category: Option<&str>,
    searching: bool,
) -> TransactionQuery {
    let limit = if searching {
        limit.max(SEARCH_FETCH_LIMIT)
    } else {
        limit
    };
    TransactionQuery {
        skip,
        limit: Some(limit),
        category: category.map(str::to_string),
    }
}

pub async fn cmd_transactions_list(
    app: &App,
    limit: u32,
    skip: Option<u32>,
    category: Option<&str>,
    search: Option<&str>,
) -> Result<()> {
    // "all" means no category filter, same as omitting it
    let category = category
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));

    let searching = search.map_or(false, |s| !s.trim().is_empty());

    let query = list_query(limit, skip, category, searching);
    let transactions = api_result(
        app.client.list_transactions(&app.session, &query).await,
        "Failed to load transactions",
    )?;

    let mut shown = stats::filter_transactions(&transactions, search, category);
    if limit > 0 {
        shown.truncate(limit as usize);
    }

    if app.json {
        return print_json(&shown);
    }

    if shown.is_empty() {
        println!("No transactions found. Add one with:");
        println!("  finsight transactions add \"Coffee\" 4.50");
        return Ok(());
    }

    println!();
    println!("📝 Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in &shown {
        print_transaction_row(tx);
    }

    let totals = Totals::from_transactions(shown.iter().copied());
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {} shown │ income {} │ expenses {} │ net {}",
        totals.count,
        format_money(totals.income),
        format_money(totals.expenses),
        format_money(totals.net)
    );
    if shown.iter().any(|tx| tx.ai_categorized) {
        println!("   * category assigned automatically");
    }

    Ok(())
}

pub async fn cmd_transactions_add(
    app: &App,
    description: &str,
    amount: &str,
    category: Option<&str>,
    kind: &str,
    date: Option<&str>,
) -> Result<()> {
    let transaction_type: TransactionKind = kind.parse().map_err(anyhow::Error::msg)?;

    let form = TransactionForm {
        description: description.to_string(),
        amount: amount.to_string(),
        category: category.map(str::to_string),
        transaction_type,
        date: date.map(str::to_string),
    };
    let new_tx = NewTransaction::from_form(form).context("Invalid transaction")?;

    let created = api_result(
        app.client.create_transaction(&app.session, &new_tx).await,
        "Failed to add transaction",
    )?;

    if app.json {
        return print_json(&created);
    }

    println!("✅ Added transaction {}", created.id);
    print_transaction_row(&created);
    if created.ai_categorized {
        println!("   Category '{}' was assigned automatically", created.category);
    }

    Ok(())
}

pub async fn cmd_transactions_update(
    app: &App,
    id: i64,
    amount: Option<&str>,
    description: Option<&str>,
    category: Option<&str>,
    kind: Option<&str>,
) -> Result<()> {
    let update = TransactionUpdate {
        amount: amount
            .map(parse_amount)
            .transpose()
            .context("Invalid amount")?,
        description: description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        category: category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        transaction_type: kind
            .map(|k| k.parse::<TransactionKind>())
            .transpose()
            .map_err(anyhow::Error::msg)?,
    };

    if update.is_empty() {
        anyhow::bail!("Nothing to update. Pass --amount, --description, --category or --type");
    }

    let updated = api_result(
        app.client
            .update_transaction(&app.session, id, &update)
            .await,
        &format!("Failed to update transaction {}", id),
    )?;

    if app.json {
        return print_json(&updated);
    }

    println!("✅ Updated transaction {}", updated.id);
    print_transaction_row(&updated);
    Ok(())
}

pub async fn cmd_transactions_delete(app: &App, id: i64) -> Result<()> {
    let response = api_result(
        app.client.delete_transaction(&app.session, id).await,
        &format!("Failed to delete transaction {}", id),
    )?;

    if app.json {
        return print_json(&response);
    }

    println!("🗑️  Deleted transaction {}", id);
    Ok(())
}
