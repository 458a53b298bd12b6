//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared `App` context (client + session) and output helpers
//! - `auth` - Login, register, logout, whoami
//! - `transactions` - Transaction commands (list, add, update, delete)
//! - `analytics` - Expense analytics, summary, category breakdown
//! - `ai` - Insights, forecast, chat, categorize
//! - `reports` - Report generation and period resolution
//! - `status` - Status, dashboard and offline category commands

pub mod ai;
pub mod analytics;
pub mod auth;
pub mod core;
pub mod reports;
pub mod status;
pub mod transactions;

// Re-export command functions for main.rs
pub use ai::*;
pub use analytics::*;
pub use auth::*;
pub use core::*;
pub use reports::*;
pub use status::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an amount with two decimals and thousands separators
pub fn format_money(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{}", sign, grouped, frac)
}
