//! Finsight Core Library
//!
//! Shared functionality for the Finsight personal finance client:
//! - Session store holding the bearer token (file-backed or in-memory)
//! - API gateway client for the finance REST service
//! - Typed request/response models
//! - Client-side statistics over transaction lists
//! - Suggested categories and an offline categorizer
//! - Layered client configuration

pub mod categories;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod stats;

/// Test utilities including mock finance API server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use models::{
    AnalyticsSummary, CategoryAmount, CategoryBreakdown, CategorySuggestion, ChatReply,
    ExpenseAnalytics, Forecast, Insight, MonthlyTrend, NewTransaction, RegisterResponse,
    Registration, Report, ReportFormat, ReportKind, ReportQuery, TokenResponse, Transaction,
    TransactionForm, TransactionKind, TransactionQuery, TransactionUpdate, User,
};
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore, TOKEN_KEY};
pub use stats::Totals;
