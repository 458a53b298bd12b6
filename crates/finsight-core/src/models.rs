//! Domain models for Finsight
//!
//! Shapes of the finance API's request and response bodies. Response types are
//! lenient: missing fields fall back to defaults and a few known server aliases
//! are accepted, so the client never rejects a body that is valid JSON.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Direction of a transaction. Amounts are magnitudes; the kind carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    #[default]
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Report period granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    #[default]
    Monthly,
    Annual,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }
}

impl std::str::FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "annual" | "yearly" => Ok(Self::Annual),
            _ => Err(format!("Unknown report type: {}", s)),
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output format requested from the report endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Pdf,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pdf => "pdf",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pdf" => Ok(Self::Pdf),
            _ => Err(format!("Unknown report format: {}", s)),
        }
    }
}

// ========== Auth ==========

/// Login request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Registration request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Returned by `POST /auth/login`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Returned by `POST /auth/register`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: Option<i64>,
}

/// An authenticated user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

// ========== Transactions ==========

/// A transaction as returned by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub transaction_type: TransactionKind,
    pub date: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    /// Category was assigned automatically rather than by the user
    #[serde(alias = "is_ai_categorized")]
    pub ai_categorized: bool,
}

impl Transaction {
    /// Magnitude of the amount, regardless of how the server stored the sign
    pub fn magnitude(&self) -> f64 {
        self.amount.abs()
    }

    /// Amount with the sign implied by the transaction kind
    pub fn signed_amount(&self) -> f64 {
        match self.transaction_type {
            TransactionKind::Income => self.magnitude(),
            TransactionKind::Expense => -self.magnitude(),
        }
    }

    /// Calendar date of the transaction, if the `date` field parses
    ///
    /// Accepts plain dates and RFC 3339 / naive timestamps.
    pub fn naive_date(&self) -> Option<NaiveDate> {
        let head = self.date.get(..10)?;
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }
}

/// Raw user input for a new transaction, before coercion
#[derive(Debug, Clone, Default)]
pub struct TransactionForm {
    pub description: String,
    /// Amount exactly as typed, e.g. `"12.50"`
    pub amount: String,
    pub category: Option<String>,
    pub transaction_type: TransactionKind,
    pub date: Option<String>,
}

/// Request body for `POST /transactions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub amount: f64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub transaction_type: TransactionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl NewTransaction {
    /// Coerce form input into a request body
    ///
    /// The amount is parsed to a number before transmission (`"12.50"` becomes
    /// `12.5`). Blank categories are dropped so the server can categorize.
    pub fn from_form(form: TransactionForm) -> Result<Self> {
        let description = form.description.trim().to_string();
        if description.is_empty() {
            return Err(Error::InvalidData("Description is required".into()));
        }

        let amount = parse_amount(&form.amount)?;

        let date = match form.date.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => Some(
                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .map_err(|_| Error::InvalidData(format!("Invalid date: {} (use YYYY-MM-DD)", d)))?,
            ),
            _ => None,
        };

        let category = form
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(Self {
            amount,
            description,
            category,
            transaction_type: form.transaction_type,
            date,
        })
    }
}

/// Parse a user-entered amount into a positive magnitude
///
/// Accepts an optional leading currency symbol and thousands separators.
pub fn parse_amount(input: &str) -> Result<f64> {
    let cleaned: String = input
        .trim()
        .trim_start_matches(['$', '₹', '€', '£'])
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Err(Error::InvalidData("Amount is required".into()));
    }

    let amount: f64 = cleaned
        .parse()
        .map_err(|_| Error::InvalidData(format!("Invalid amount: {}", input.trim())))?;

    if !amount.is_finite() {
        return Err(Error::InvalidData(format!("Invalid amount: {}", input.trim())));
    }
    if amount < 0.0 {
        return Err(Error::InvalidData(
            "Amount must be positive; use the transaction type for direction".into(),
        ));
    }

    Ok(amount)
}

/// Request body for `PUT /transactions/{id}`; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionKind>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.transaction_type.is_none()
    }
}

/// Paging and filtering for `GET /transactions`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
}

impl TransactionQuery {
    /// Query pairs for the present parameters; zero and empty values are omitted
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(skip) = self.skip.filter(|s| *s > 0) {
            pairs.push(("skip", skip.to_string()));
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("category", category.to_string()));
        }
        pairs
    }
}

// ========== Analytics ==========

/// One month of income/expense totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyTrend {
    pub month: String,
    pub expenses: f64,
    pub income: f64,
}

/// Returned by `GET /analytics/expenses`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseAnalytics {
    pub total_expenses: f64,
    pub total_income: f64,
    pub net_income: f64,
    pub expense_by_category: BTreeMap<String, f64>,
    pub monthly_trends: Vec<MonthlyTrend>,
}

/// Returned by `GET /analytics/summary`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_savings: f64,
    pub savings_rate: f64,
    pub category_breakdown: BTreeMap<String, f64>,
}

/// Spending in one category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: f64,
    pub percentage: f64,
}

/// Returned by `GET /analytics/categories`: either a map or a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryBreakdown {
    Map(BTreeMap<String, f64>),
    List(Vec<CategoryAmount>),
}

impl CategoryBreakdown {
    /// Entries sorted by amount, largest first, with percentages filled in
    pub fn into_sorted(self) -> Vec<CategoryAmount> {
        let mut entries: Vec<CategoryAmount> = match self {
            Self::Map(map) => map
                .into_iter()
                .map(|(category, amount)| CategoryAmount {
                    category,
                    amount,
                    percentage: 0.0,
                })
                .collect(),
            Self::List(list) => list,
        };

        let total: f64 = entries.iter().map(|e| e.amount.abs()).sum();
        if total > 0.0 {
            for entry in entries.iter_mut().filter(|e| e.percentage == 0.0) {
                entry.percentage = entry.amount.abs() / total * 100.0;
            }
        }

        entries.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        entries
    }
}

// ========== AI ==========

/// A generated tip, warning or recommendation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Insight {
    pub id: String,
    /// tip | warning | recommendation (free-form on some servers)
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(alias = "message")]
    pub description: String,
    /// high | medium | low
    #[serde(alias = "severity")]
    pub impact: Option<String>,
    pub category: Option<String>,
    pub generated_at: Option<String>,
}

/// Returned by `GET /ai/insights`: a bare list or `{"insights": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InsightsResponse {
    Wrapped { insights: Vec<Insight> },
    List(Vec<Insight>),
}

impl InsightsResponse {
    pub fn into_vec(self) -> Vec<Insight> {
        match self {
            Self::Wrapped { insights } => insights,
            Self::List(list) => list,
        }
    }
}

/// One forecast period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Forecast {
    #[serde(alias = "month")]
    pub period: String,
    pub predicted_expenses: f64,
    pub predicted_income: Option<f64>,
    pub predicted_savings: Option<f64>,
    /// Percent, 0-100
    #[serde(alias = "confidence")]
    pub confidence_level: f64,
    pub key_drivers: Vec<String>,
}

/// Returned by `GET /ai/forecast`: a bare list or `{"forecast": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForecastResponse {
    Wrapped { forecast: Vec<Forecast> },
    List(Vec<Forecast>),
}

impl ForecastResponse {
    pub fn into_vec(self) -> Vec<Forecast> {
        match self {
            Self::Wrapped { forecast } => forecast,
            Self::List(list) => list,
        }
    }
}

/// Request body for `POST /ai/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Returned by `POST /ai/chat`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatReply {
    pub response: String,
    pub timestamp: Option<String>,
}

/// Request body for `POST /ai/categorize`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizeRequest {
    pub description: String,
    pub amount: f64,
}

/// Returned by `POST /ai/categorize`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorySuggestion {
    pub category: String,
    /// Percent on the reference server; some servers send a 0-1 fraction
    pub confidence: Option<f64>,
}

impl CategorySuggestion {
    /// Confidence as a percent (0-100), whichever scale the server used
    ///
    /// Values up to 1.0 are read as fractions.
    pub fn confidence_percent(&self) -> Option<f64> {
        self.confidence
            .filter(|c| c.is_finite() && *c >= 0.0)
            .map(|c| if c <= 1.0 { c * 100.0 } else { c })
            .map(|c| c.min(100.0))
    }
}

// ========== Reports ==========

/// Optional parameters for `GET /reports/{kind}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub format: Option<ReportFormat>,
}

impl ReportQuery {
    /// Query pairs for the present parameters; zero values are omitted
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(year) = self.year.filter(|y| *y != 0) {
            pairs.push(("year", year.to_string()));
        }
        if let Some(month) = self.month.filter(|m| *m != 0) {
            pairs.push(("month", month.to_string()));
        }
        if let Some(format) = self.format {
            pairs.push(("format", format.as_str().to_string()));
        }
        pairs
    }
}

/// A generated monthly or annual report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ReportKind,
    pub period: String,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_savings: f64,
    pub top_categories: Vec<CategoryAmount>,
    pub generated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_coerces_text() {
        assert_eq!(parse_amount("12.50").unwrap(), 12.5);
        assert_eq!(parse_amount(" 1,250.00 ").unwrap(), 1250.0);
        assert_eq!(parse_amount("$9").unwrap(), 9.0);
        assert_eq!(parse_amount("₹4,520").unwrap(), 4520.0);
    }

    #[test]
    fn test_parse_amount_rejects_bad_input() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("inf").is_err());
        assert!(parse_amount("NaN").is_err());
    }

    #[test]
    fn test_new_transaction_from_form() {
        let form = TransactionForm {
            description: "  Coffee ".into(),
            amount: "12.50".into(),
            category: Some("   ".into()),
            transaction_type: TransactionKind::Expense,
            date: Some("2024-01-15".into()),
        };
        let tx = NewTransaction::from_form(form).unwrap();
        assert_eq!(tx.amount, 12.5);
        assert_eq!(tx.description, "Coffee");
        assert_eq!(tx.category, None);
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 1, 15));

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["amount"], serde_json::json!(12.5));
        assert_eq!(json["transaction_type"], "expense");
        assert_eq!(json["date"], "2024-01-15");
        assert!(json.get("category").is_none());
    }

    #[test]
    fn test_new_transaction_requires_description() {
        let form = TransactionForm {
            amount: "10".into(),
            ..Default::default()
        };
        assert!(matches!(
            NewTransaction::from_form(form),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_new_transaction_rejects_bad_date() {
        let form = TransactionForm {
            description: "Rent".into(),
            amount: "10".into(),
            date: Some("15/01/2024".into()),
            ..Default::default()
        };
        assert!(NewTransaction::from_form(form).is_err());
    }

    #[test]
    fn test_transaction_lenient_deserialize() {
        let tx: Transaction = serde_json::from_value(serde_json::json!({
            "id": 7,
            "description": "Salary Deposit",
            "amount": 420000.0,
            "category": "Income",
            "transaction_type": "income",
            "date": "2024-01-14T09:30:00",
            "is_ai_categorized": true
        }))
        .unwrap();
        assert_eq!(tx.id, 7);
        assert_eq!(tx.user_id, 0);
        assert!(tx.ai_categorized);
        assert_eq!(tx.naive_date(), NaiveDate::from_ymd_opt(2024, 1, 14));
    }

    #[test]
    fn test_signed_amount_follows_kind() {
        let mut tx = Transaction {
            amount: -8750.0,
            transaction_type: TransactionKind::Expense,
            ..Default::default()
        };
        assert_eq!(tx.signed_amount(), -8750.0);
        tx.transaction_type = TransactionKind::Income;
        tx.amount = 75000.0;
        assert_eq!(tx.signed_amount(), 75000.0);
    }

    #[test]
    fn test_transaction_query_omits_absent() {
        assert!(TransactionQuery::default().to_pairs().is_empty());

        let q = TransactionQuery {
            skip: Some(0),
            limit: Some(50),
            category: Some("Shopping".into()),
        };
        assert_eq!(
            q.to_pairs(),
            vec![("limit", "50".to_string()), ("category", "Shopping".to_string())]
        );
    }

    #[test]
    fn test_update_skips_absent_fields() {
        let update = TransactionUpdate {
            category: Some("Travel".into()),
            ..Default::default()
        };
        assert!(!update.is_empty());
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"category":"Travel"}"#);
        assert!(TransactionUpdate::default().is_empty());
    }

    #[test]
    fn test_category_breakdown_shapes() {
        let map: CategoryBreakdown =
            serde_json::from_str(r#"{"Shopping": 25.0, "Food & Dining": 75.0}"#).unwrap();
        let sorted = map.into_sorted();
        assert_eq!(sorted[0].category, "Food & Dining");
        assert!((sorted[0].percentage - 75.0).abs() < 1e-9);

        let list: CategoryBreakdown =
            serde_json::from_str(r#"[{"category": "Bills", "amount": 10.0, "percentage": 100.0}]"#)
                .unwrap();
        assert_eq!(list.into_sorted()[0].percentage, 100.0);
    }

    #[test]
    fn test_forecast_envelopes() {
        let wrapped: ForecastResponse = serde_json::from_str(
            r#"{"forecast": [{"month": "Month +1", "predicted_expenses": 100.0, "confidence": 92}]}"#,
        )
        .unwrap();
        let points = wrapped.into_vec();
        assert_eq!(points[0].period, "Month +1");
        assert_eq!(points[0].confidence_level, 92.0);

        let list: ForecastResponse =
            serde_json::from_str(r#"[{"period": "2024-02", "predicted_expenses": 5.0}]"#).unwrap();
        assert_eq!(list.into_vec().len(), 1);
    }

    #[test]
    fn test_insights_envelopes() {
        let wrapped: InsightsResponse = serde_json::from_str(
            r#"{"insights": [{"type": "alert", "title": "High Spending", "message": "Review", "severity": "medium"}]}"#,
        )
        .unwrap();
        let insights = wrapped.into_vec();
        assert_eq!(insights[0].description, "Review");
        assert_eq!(insights[0].impact.as_deref(), Some("medium"));
    }

    #[test]
    fn test_report_query_pairs() {
        let q = ReportQuery {
            year: Some(2024),
            month: None,
            format: Some(ReportFormat::Json),
        };
        assert_eq!(
            q.to_pairs(),
            vec![("year", "2024".to_string()), ("format", "json".to_string())]
        );
    }

    #[test]
    fn test_confidence_percent_scales() {
        let percent: CategorySuggestion =
            serde_json::from_str(r#"{"category": "Transportation", "confidence": 85.0}"#).unwrap();
        assert_eq!(percent.confidence_percent(), Some(85.0));

        let fraction: CategorySuggestion =
            serde_json::from_str(r#"{"category": "Transportation", "confidence": 0.85}"#).unwrap();
        let scaled = fraction.confidence_percent().unwrap();
        assert!((scaled - 85.0).abs() < 1e-9);

        let missing: CategorySuggestion = serde_json::from_str(r#"{"category": "Other"}"#).unwrap();
        assert_eq!(missing.confidence_percent(), None);

        let negative = CategorySuggestion {
            category: "Other".into(),
            confidence: Some(-3.0),
        };
        assert_eq!(negative.confidence_percent(), None);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Income".parse::<TransactionKind>().unwrap(), TransactionKind::Income);
        assert!("refund".parse::<TransactionKind>().is_err());
        assert_eq!("yearly".parse::<ReportKind>().unwrap(), ReportKind::Annual);
        assert_eq!(ReportKind::Monthly.to_string(), "monthly");
    }
}
