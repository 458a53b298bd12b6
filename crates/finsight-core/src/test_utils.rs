//! Test utilities for finsight-core
//!
//! This module provides a mock finance API server that implements every
//! endpoint the client calls, backed by in-memory users, tokens and
//! transactions. It enforces bearer auth on protected routes and records each
//! request it receives so tests can assert on headers and bodies.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::{Path, Query, Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderMap, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::categories::{keyword_confidence, suggest_category};
use crate::models::{Transaction, TransactionKind, User};
use crate::stats::{category_breakdown, monthly_trends, savings_rate, Totals};

/// First line of every PDF report the mock serves
pub const PDF_HEADER: &str = "%PDF-1.4";

/// Seeded account available on every mock server
pub const DEMO_EMAIL: &str = "demo@finsight.test";
pub const DEMO_PASSWORD: &str = "demo-password";

/// Route that always answers with `RAW_BODY`
pub const RAW_PATH: &str = "/test/raw";
/// Route that answers with a body that is not JSON
pub const MALFORMED_PATH: &str = "/test/malformed";
/// Route that answers 204 with no body
pub const EMPTY_PATH: &str = "/test/empty";

/// Fixed body served on `RAW_PATH`
pub fn raw_body() -> Value {
    json!({
        "CamelCase": 1,
        "snake_case": [1, 2.5, "three", null, {"nested": true}],
        "amount": "12.50",
        "unicode": "₹4,95,000.00",
        "empty": {}
    })
}

/// One request as seen by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path plus query string
    pub uri: String,
    /// Every `Authorization` header value, in order
    pub authorization: Vec<String>,
    pub content_type: Option<String>,
    /// Parsed JSON body, if any
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
struct MockUser {
    id: i64,
    email: String,
    password: String,
    full_name: String,
    created_at: String,
}

#[derive(Debug, Default)]
struct MockState {
    users: Vec<MockUser>,
    tokens: HashMap<String, i64>,
    transactions: Vec<Transaction>,
    requests: Vec<RecordedRequest>,
    next_user_id: i64,
    next_tx_id: i64,
    next_token: u64,
}

impl MockState {
    fn add_user(&mut self, email: &str, password: &str, full_name: &str) -> i64 {
        self.next_user_id += 1;
        let id = self.next_user_id;
        self.users.push(MockUser {
            id,
            email: email.to_string(),
            password: password.to_string(),
            full_name: full_name.to_string(),
            created_at: Utc::now().to_rfc3339(),
        });
        self.seed_transactions(id);
        id
    }

    /// Starter transactions for a new user
    fn seed_transactions(&mut self, user_id: i64) {
        use TransactionKind::*;
        let seed: [(&str, &str, &str, f64, TransactionKind); 8] = [
            ("2024-01-15", "Big Bazaar", "Food & Dining", 8750.0, Expense),
            ("2024-01-15", "Petrol Pump", "Transportation", 4520.0, Expense),
            ("2024-01-14", "Salary Deposit", "Income", 420000.0, Income),
            ("2024-01-14", "Cafe Coffee Day", "Food & Dining", 1245.0, Expense),
            ("2024-01-13", "Electric Bill", "Bills & Utilities", 12000.0, Expense),
            ("2024-01-13", "Amazon Purchase", "Shopping", 6499.0, Expense),
            ("2024-01-12", "Netflix Subscription", "Entertainment", 1599.0, Expense),
            ("2024-01-12", "Freelance Payment", "Income", 75000.0, Income),
        ];
        for (date, description, category, amount, kind) in seed {
            self.next_tx_id += 1;
            let now = Utc::now().to_rfc3339();
            self.transactions.push(Transaction {
                id: self.next_tx_id,
                user_id,
                amount,
                description: description.to_string(),
                category: category.to_string(),
                transaction_type: kind,
                date: date.to_string(),
                created_at: Some(now.clone()),
                updated_at: Some(now),
                ai_categorized: true,
            });
        }
    }

    fn user_transactions(&self, user_id: i64) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }
}

type SharedState = Arc<Mutex<MockState>>;

/// Mock finance API server for testing and development
pub struct MockFinanceServer {
    addr: SocketAddr,
    state: SharedState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockFinanceServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let mut initial = MockState::default();
        initial.add_user(DEMO_EMAIL, DEMO_PASSWORD, "Demo User");
        let state: SharedState = Arc::new(Mutex::new(initial));

        let app = Router::new()
            .route("/auth/register", post(handle_register))
            .route("/auth/login", post(handle_login))
            .route("/auth/me", get(handle_me))
            .route(
                "/transactions",
                get(handle_list_transactions).post(handle_create_transaction),
            )
            .route(
                "/transactions/:id",
                put(handle_update_transaction).delete(handle_delete_transaction),
            )
            .route("/analytics/expenses", get(handle_expense_analytics))
            .route("/analytics/summary", get(handle_summary))
            .route("/analytics/categories", get(handle_categories))
            .route("/ai/insights", get(handle_insights))
            .route("/ai/forecast", get(handle_forecast))
            .route("/ai/chat", post(handle_chat))
            .route("/ai/categorize", post(handle_categorize))
            .route("/reports/:kind", get(handle_report))
            .route(RAW_PATH, get(|| async { Json(raw_body()) }))
            .route(MALFORMED_PATH, get(|| async { "{not json" }))
            .route(EMPTY_PATH, get(|| async { StatusCode::NO_CONTENT }))
            .route("/test/status/:code", get(handle_status))
            .layer(middleware::from_fn_with_state(state.clone(), record_request))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Most recent request
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.lock().unwrap().requests.last().cloned()
    }

    /// Ids of every transaction stored for `email`
    pub fn transaction_ids(&self, email: &str) -> Vec<i64> {
        let state = self.state.lock().unwrap();
        let Some(user) = state.users.iter().find(|u| u.email == email) else {
            return Vec::new();
        };
        state
            .transactions
            .iter()
            .filter(|t| t.user_id == user.id)
            .map(|t| t.id)
            .collect()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockFinanceServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Record method, URI, auth headers and JSON body of every request
async fn record_request(State(state): State<SharedState>, req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        uri: parts.uri.to_string(),
        authorization: parts
            .headers
            .get_all(AUTHORIZATION)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect(),
        content_type: parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&bytes).ok(),
    };
    state.lock().unwrap().requests.push(recorded);

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// Resolve the bearer token to a user id, or 401
fn authenticate(state: &MockState, headers: &HeaderMap) -> Result<i64, StatusCode> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;
    state
        .tokens
        .get(token)
        .copied()
        .ok_or(StatusCode::UNAUTHORIZED)
}

fn error(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

async fn handle_register(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let full_name = body["full_name"].as_str().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "email and password are required");
    }

    let mut state = state.lock().unwrap();
    if state.users.iter().any(|u| u.email == email) {
        return error(StatusCode::BAD_REQUEST, "Email already registered");
    }
    let user_id = state.add_user(email, password, full_name);
    Json(json!({ "message": "User created successfully", "user_id": user_id })).into_response()
}

async fn handle_login(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let mut state = state.lock().unwrap();
    let Some(user_id) = state
        .users
        .iter()
        .find(|u| u.email == email && u.password == password)
        .map(|u| u.id)
    else {
        return error(StatusCode::UNAUTHORIZED, "Incorrect email or password");
    };

    state.next_token += 1;
    let token = format!("mock-token-{}-{}", user_id, state.next_token);
    state.tokens.insert(token.clone(), user_id);
    Json(json!({ "access_token": token, "token_type": "bearer" })).into_response()
}

async fn handle_me(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(status) => return error(status, "Invalid authentication credentials"),
    };
    let Some(user) = state.users.iter().find(|u| u.id == user_id) else {
        return error(StatusCode::UNAUTHORIZED, "User not found");
    };
    Json(User {
        id: user.id,
        email: user.email.clone(),
        full_name: user.full_name.clone(),
        created_at: Some(user.created_at.clone()),
        updated_at: Some(user.created_at.clone()),
    })
    .into_response()
}

#[derive(Debug, Deserialize)]
struct ListParams {
    skip: Option<usize>,
    limit: Option<usize>,
    category: Option<String>,
}

async fn handle_list_transactions(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Response {
    let state = state.lock().unwrap();
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(status) => return error(status, "Invalid authentication credentials"),
    };
    let list: Vec<Transaction> = state
        .user_transactions(user_id)
        .into_iter()
        .filter(|t| params.category.as_deref().map_or(true, |c| t.category == c))
        .skip(params.skip.unwrap_or(0))
        .take(params.limit.unwrap_or(100))
        .collect();
    Json(list).into_response()
}

async fn handle_create_transaction(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(status) => return error(status, "Invalid authentication credentials"),
    };

    // Strict like a typed server: amount must be a JSON number
    let Some(amount) = body["amount"].as_f64() else {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "amount must be a number");
    };
    let Some(description) = body["description"].as_str() else {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "description is required");
    };
    let kind = match body["transaction_type"].as_str().map(str::parse::<TransactionKind>) {
        Some(Ok(kind)) => kind,
        _ => return error(StatusCode::UNPROCESSABLE_ENTITY, "invalid transaction_type"),
    };
    let (category, ai_categorized) = match body["category"].as_str() {
        Some(c) if !c.is_empty() => (c.to_string(), false),
        _ => (suggest_category(description).to_string(), true),
    };
    let date = body["date"]
        .as_str()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Utc::now().date_naive());

    state.next_tx_id += 1;
    let now = Utc::now().to_rfc3339();
    let tx = Transaction {
        id: state.next_tx_id,
        user_id,
        amount,
        description: description.to_string(),
        category,
        transaction_type: kind,
        date: date.format("%Y-%m-%d").to_string(),
        created_at: Some(now.clone()),
        updated_at: Some(now),
        ai_categorized,
    };
    state.transactions.push(tx.clone());
    Json(tx).into_response()
}

async fn handle_update_transaction(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(status) => return error(status, "Invalid authentication credentials"),
    };
    let Some(tx) = state
        .transactions
        .iter_mut()
        .find(|t| t.id == id && t.user_id == user_id)
    else {
        return error(StatusCode::NOT_FOUND, "Transaction not found");
    };

    if let Some(amount) = body.get("amount").and_then(Value::as_f64) {
        tx.amount = amount;
    }
    if let Some(description) = body.get("description").and_then(Value::as_str) {
        tx.description = description.to_string();
    }
    if let Some(category) = body.get("category").and_then(Value::as_str) {
        tx.category = category.to_string();
        tx.ai_categorized = false;
    }
    if let Some(Ok(kind)) = body
        .get("transaction_type")
        .and_then(Value::as_str)
        .map(str::parse::<TransactionKind>)
    {
        tx.transaction_type = kind;
    }
    tx.updated_at = Some(Utc::now().to_rfc3339());
    Json(tx.clone()).into_response()
}

async fn handle_delete_transaction(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = state.lock().unwrap();
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(status) => return error(status, "Invalid authentication credentials"),
    };
    let before = state.transactions.len();
    state
        .transactions
        .retain(|t| !(t.id == id && t.user_id == user_id));
    if state.transactions.len() == before {
        return error(StatusCode::NOT_FOUND, "Transaction not found");
    }
    Json(json!({ "message": "Transaction deleted", "id": id })).into_response()
}

#[derive(Debug, Deserialize)]
struct DateRange {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

async fn handle_expense_analytics(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(range): Query<DateRange>,
) -> Response {
    let state = state.lock().unwrap();
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(status) => return error(status, "Invalid authentication credentials"),
    };
    let txs: Vec<Transaction> = state
        .user_transactions(user_id)
        .into_iter()
        .filter(|t| match t.naive_date() {
            Some(d) => {
                range.start_date.map_or(true, |s| d >= s) && range.end_date.map_or(true, |e| d <= e)
            }
            None => false,
        })
        .collect();

    let totals = Totals::from_transactions(&txs);
    let by_category: HashMap<String, f64> = category_breakdown(&txs)
        .into_iter()
        .map(|c| (c.category, c.amount))
        .collect();
    Json(json!({
        "total_expenses": totals.expenses,
        "total_income": totals.income,
        "net_income": totals.net,
        "expense_by_category": by_category,
        "monthly_trends": monthly_trends(&txs),
    }))
    .into_response()
}

async fn handle_summary(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(status) => return error(status, "Invalid authentication credentials"),
    };
    let txs = state.user_transactions(user_id);
    let totals = Totals::from_transactions(&txs);
    let by_category: HashMap<String, f64> = category_breakdown(&txs)
        .into_iter()
        .map(|c| (c.category, c.amount))
        .collect();
    Json(json!({
        "total_income": totals.income,
        "total_expenses": totals.expenses,
        "net_savings": totals.net,
        "savings_rate": savings_rate(totals.income, totals.expenses),
        "category_breakdown": by_category,
    }))
    .into_response()
}

async fn handle_categories(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(status) => return error(status, "Invalid authentication credentials"),
    };
    let by_category: HashMap<String, f64> = category_breakdown(&state.user_transactions(user_id))
        .into_iter()
        .map(|c| (c.category, c.amount))
        .collect();
    Json(by_category).into_response()
}

async fn handle_insights(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(status) => return error(status, "Invalid authentication credentials"),
    };
    let now = Utc::now().to_rfc3339();
    let mut insights = Vec::new();
    if let Some(top) = category_breakdown(&state.user_transactions(user_id)).first() {
        insights.push(json!({
            "id": "top-category",
            "type": "tip",
            "title": format!("Top Spending Category: {}", top.category),
            "description": format!("{:.1}% of your spending goes to {}", top.percentage, top.category),
            "impact": "medium",
            "category": top.category,
            "generated_at": now,
        }));
        if top.percentage > 30.0 {
            insights.push(json!({
                "id": "savings-opportunity",
                "type": "recommendation",
                "title": "Savings Opportunity",
                "description": format!("Reducing {} by 10% could save {:.0}", top.category, top.amount * 0.1),
                "impact": "high",
                "category": top.category,
                "generated_at": now,
            }));
        }
    }
    Json(json!({ "insights": insights })).into_response()
}

#[derive(Debug, Deserialize)]
struct ForecastParams {
    months: Option<u32>,
}

async fn handle_forecast(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<ForecastParams>,
) -> Response {
    let state = state.lock().unwrap();
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(status) => return error(status, "Invalid authentication credentials"),
    };
    let totals = Totals::from_transactions(&state.user_transactions(user_id));
    let monthly = totals.expenses / 6.0;
    let forecast: Vec<Value> = (1..=params.months.unwrap_or(6))
        .map(|i| {
            json!({
                "month": format!("Month +{}", i),
                "predicted_expenses": monthly * (1.0 + f64::from(i) * 0.02),
                "confidence": 95u32.saturating_sub(i * 3).max(70),
            })
        })
        .collect();
    Json(json!({ "forecast": forecast })).into_response()
}

async fn handle_chat(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    {
        let state = state.lock().unwrap();
        if let Err(status) = authenticate(&state, &headers) {
            return error(status, "Invalid authentication credentials");
        }
    }
    let message = body["message"].as_str().unwrap_or_default().to_lowercase();
    let response = if message.contains("budget") {
        "Based on your spending patterns, keep monthly expenses under your average income."
    } else if message.contains("save") {
        "To increase savings, consider reducing entertainment expenses."
    } else if message.contains("invest") {
        "Consider a diversified portfolio with 60% equity and 40% debt."
    } else {
        "I'm here to help with your financial questions! Ask me about budgeting, saving, investing, or expense analysis."
    };
    Json(json!({ "response": response, "timestamp": Utc::now().to_rfc3339() })).into_response()
}

async fn handle_categorize(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    {
        let state = state.lock().unwrap();
        if let Err(status) = authenticate(&state, &headers) {
            return error(status, "Invalid authentication credentials");
        }
    }
    let description = body["description"].as_str().unwrap_or_default();
    let category = suggest_category(description);
    let confidence = keyword_confidence(description, category);
    Json(json!({ "category": category, "confidence": confidence, "is_ai_categorized": true }))
        .into_response()
}

#[derive(Debug, Deserialize)]
struct ReportParams {
    year: Option<i32>,
    month: Option<u32>,
    format: Option<String>,
}

async fn handle_report(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(kind): Path<String>,
    Query(params): Query<ReportParams>,
) -> Response {
    let state = state.lock().unwrap();
    let user_id = match authenticate(&state, &headers) {
        Ok(id) => id,
        Err(status) => return error(status, "Invalid authentication credentials"),
    };
    if kind != "monthly" && kind != "annual" {
        return error(StatusCode::NOT_FOUND, "Unknown report type");
    }

    let year = params.year.unwrap_or(2024);
    let prefix = match (kind.as_str(), params.month) {
        ("monthly", Some(month)) => format!("{:04}-{:02}", year, month),
        ("monthly", None) => format!("{:04}-01", year),
        _ => format!("{:04}", year),
    };
    let txs: Vec<Transaction> = state
        .user_transactions(user_id)
        .into_iter()
        .filter(|t| t.date.starts_with(&prefix))
        .collect();
    let totals = Totals::from_transactions(&txs);

    if params.format.as_deref() == Some("pdf") {
        let document = format!(
            "{}\n% {} report {}\n% net {:.2}\n%%EOF\n",
            PDF_HEADER, kind, prefix, totals.net
        );
        return ([(CONTENT_TYPE, "application/pdf")], document).into_response();
    }

    let top: Vec<Value> = category_breakdown(&txs)
        .into_iter()
        .take(5)
        .map(|c| json!({ "category": c.category, "amount": c.amount, "percentage": c.percentage }))
        .collect();

    Json(json!({
        "id": format!("{}-{}", kind, prefix),
        "type": kind,
        "period": prefix,
        "total_income": totals.income,
        "total_expenses": totals.expenses,
        "net_savings": totals.net,
        "top_categories": top,
        "generated_at": Utc::now().to_rfc3339(),
    }))
    .into_response()
}

async fn handle_status(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error(status, "Simulated failure")
}
