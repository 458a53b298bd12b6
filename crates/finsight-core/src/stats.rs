//! Client-side statistics over transaction lists
//!
//! Plain sums and filters used by the dashboard and the transaction views.
//! Amounts are treated as magnitudes; direction comes from the transaction kind.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::models::{CategoryAmount, MonthlyTrend, Transaction, TransactionKind};

/// Income/expense totals for a set of transactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
    pub count: usize,
}

impl Totals {
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut totals = Self::default();
        for tx in transactions {
            match tx.transaction_type {
                TransactionKind::Income => totals.income += tx.magnitude(),
                TransactionKind::Expense => totals.expenses += tx.magnitude(),
            }
            totals.count += 1;
        }
        totals.net = totals.income - totals.expenses;
        totals
    }

    /// Share of income kept, in percent
    pub fn savings_rate(&self) -> f64 {
        savings_rate(self.income, self.expenses)
    }
}

/// Percent of income not spent; 0 when there is no income
pub fn savings_rate(income: f64, expenses: f64) -> f64 {
    if income > 0.0 {
        (income - expenses) / income * 100.0
    } else {
        0.0
    }
}

/// Filter by description search term and category
///
/// The search is a case-insensitive substring match on the description.
/// A category of `None`, empty, or `"all"` matches every transaction.
pub fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    search: Option<&str>,
    category: Option<&str>,
) -> Vec<&'a Transaction> {
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let category = category
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));

    transactions
        .iter()
        .filter(|tx| {
            needle
                .as_deref()
                .map_or(true, |n| tx.description.to_lowercase().contains(n))
        })
        .filter(|tx| category.map_or(true, |c| tx.category == c))
        .collect()
}

/// Expense totals per category, largest first
pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryAmount> {
    let mut by_category: HashMap<&str, f64> = HashMap::new();
    let mut total = 0.0;

    for tx in transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionKind::Expense)
    {
        let category = if tx.category.is_empty() {
            "Other"
        } else {
            tx.category.as_str()
        };
        *by_category.entry(category).or_default() += tx.magnitude();
        total += tx.magnitude();
    }

    let mut breakdown: Vec<CategoryAmount> = by_category
        .into_iter()
        .map(|(category, amount)| CategoryAmount {
            category: category.to_string(),
            amount,
            percentage: if total > 0.0 {
                amount / total * 100.0
            } else {
                0.0
            },
        })
        .collect();

    breakdown.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    breakdown
}

/// Income and expenses per `YYYY-MM`, oldest first
///
/// Transactions whose date does not parse are skipped.
pub fn monthly_trends(transactions: &[Transaction]) -> Vec<MonthlyTrend> {
    let mut months: BTreeMap<String, MonthlyTrend> = BTreeMap::new();

    for tx in transactions {
        let Some(date) = tx.naive_date() else {
            continue;
        };
        let key = date.format("%Y-%m").to_string();
        let entry = months.entry(key.clone()).or_insert_with(|| MonthlyTrend {
            month: key,
            ..Default::default()
        });
        match tx.transaction_type {
            TransactionKind::Income => entry.income += tx.magnitude(),
            TransactionKind::Expense => entry.expenses += tx.magnitude(),
        }
    }

    months.into_values().collect()
}

/// Most recent transactions first, by date then id
pub fn recent(transactions: &[Transaction], limit: usize) -> Vec<&Transaction> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    sorted.truncate(limit);
    sorted
}
