//! Finance API gateway client
//!
//! Every call goes through [`ApiClient::request`], which:
//! - prefixes the path with the configured base URL
//! - sets a JSON content type
//! - attaches `Authorization: Bearer <token>` only when the session holds a token
//! - makes exactly one attempt (no retry, no backoff)
//! - turns a non-2xx status into [`Error::Status`]
//! - returns the parsed JSON body without further validation
//!
//! The typed endpoint methods below are thin wrappers over `request`.

use chrono::NaiveDate;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{
    AnalyticsSummary, CategorizeRequest, CategoryBreakdown, CategorySuggestion, ChatReply,
    ChatRequest, Credentials, ExpenseAnalytics, Forecast, ForecastResponse, Insight,
    InsightsResponse, NewTransaction, RegisterResponse, Registration, Report, ReportFormat, ReportKind,
    ReportQuery, TokenResponse, Transaction, TransactionQuery, TransactionUpdate, User,
};
use crate::session::Session;

/// HTTP client for the finance API
///
/// Cheap to clone; clones share the underlying connection pool. Holds no
/// authentication state of its own: the token is read from the `Session`
/// passed to each call.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http_client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base address
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client honoring the configured address and timeout
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http_client: builder.build()?,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the absolute URL for a relative path plus query pairs
    ///
    /// Pairs are percent-encoded; an empty slice adds no `?`.
    pub fn url_for(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let joined = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        let mut url = Url::parse(&joined)
            .map_err(|e| Error::Config(format!("Invalid API URL {}: {}", joined, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Perform one JSON round trip
    ///
    /// `T = serde_json::Value` returns the body exactly as the server sent it.
    /// An empty success body parses as `null`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<T> {
        let bytes = self
            .fetch(session, method.clone(), path, query, body, "application/json")
            .await?;

        let parsed = if bytes.iter().all(u8::is_ascii_whitespace) {
            serde_json::from_slice(b"null")
        } else {
            serde_json::from_slice(&bytes)
        };

        parsed.map_err(|e| {
            warn!("API request failed parsing JSON: {} {}: {}", method, path, e);
            Error::Json(e)
        })
    }

    /// One attempt, returning the raw success body
    async fn fetch(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        accept: &'static str,
    ) -> Result<Vec<u8>> {
        let url = self.url_for(path, query)?;
        let token = session.get_token()?;

        debug!(
            method = %method,
            path = path,
            authenticated = token.is_some(),
            "Sending API request"
        );

        let mut builder = self
            .http_client
            .request(method.clone(), url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCEPT, HeaderValue::from_static(accept));

        if let Some(token) = token.as_deref() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("API request failed: {} {}: {}", method, path, e);
                return Err(Error::Http(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("API request failed: {} {} returned {}", method, path, status);
            return Err(Error::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            warn!("API request failed reading body: {} {}: {}", method, path, e);
            Error::Http(e)
        })?;
        Ok(bytes.to_vec())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        session: &Session,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.request(session, Method::GET, path, query, None).await
    }

    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.request(session, method, path, &[], Some(&body)).await
    }

    // ============= Auth =============

    /// `POST /auth/login`. Does not store the returned token.
    pub async fn login(&self, session: &Session, email: &str, password: &str) -> Result<TokenResponse> {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send(session, Method::POST, "/auth/login", &credentials)
            .await
    }

    /// Log in and persist the access token in `session`
    pub async fn login_and_store(
        &self,
        session: &Session,
        email: &str,
        password: &str,
    ) -> Result<TokenResponse> {
        let token = self.login(session, email, password).await?;
        if token.access_token.trim().is_empty() {
            return Err(Error::InvalidData(
                "Login response did not include an access token".into(),
            ));
        }
        session.set_token(&token.access_token)?;
        Ok(token)
    }

    /// `POST /auth/register`
    pub async fn register(&self, session: &Session, registration: &Registration) -> Result<RegisterResponse> {
        self.send(session, Method::POST, "/auth/register", registration)
            .await
    }

    /// `GET /auth/me`
    pub async fn current_user(&self, session: &Session) -> Result<User> {
        self.get(session, "/auth/me", &[]).await
    }

    // ============= Transactions =============

    /// `GET /transactions?skip&limit&category`
    pub async fn list_transactions(
        &self,
        session: &Session,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>> {
        self.get(session, "/transactions", &query.to_pairs()).await
    }

    /// `POST /transactions`
    pub async fn create_transaction(
        &self,
        session: &Session,
        transaction: &NewTransaction,
    ) -> Result<Transaction> {
        self.send(session, Method::POST, "/transactions", transaction)
            .await
    }

    /// `PUT /transactions/{id}`
    pub async fn update_transaction(
        &self,
        session: &Session,
        id: i64,
        update: &TransactionUpdate,
    ) -> Result<Transaction> {
        self.send(session, Method::PUT, &format!("/transactions/{}", id), update)
            .await
    }

    /// `DELETE /transactions/{id}`. Returns whatever the server sends back.
    pub async fn delete_transaction(&self, session: &Session, id: i64) -> Result<Value> {
        self.request(
            session,
            Method::DELETE,
            &format!("/transactions/{}", id),
            &[],
            None,
        )
        .await
    }

    // ============= Analytics =============

    /// `GET /analytics/expenses?start_date&end_date`
    pub async fn expense_analytics(
        &self,
        session: &Session,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<ExpenseAnalytics> {
        let mut query = Vec::new();
        if let Some(start) = start_date {
            query.push(("start_date", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = end_date {
            query.push(("end_date", end.format("%Y-%m-%d").to_string()));
        }
        self.get(session, "/analytics/expenses", &query).await
    }

    /// `GET /analytics/summary`
    pub async fn income_expense_summary(&self, session: &Session) -> Result<AnalyticsSummary> {
        self.get(session, "/analytics/summary", &[]).await
    }

    /// `GET /analytics/categories`
    pub async fn category_breakdown(&self, session: &Session) -> Result<CategoryBreakdown> {
        self.get(session, "/analytics/categories", &[]).await
    }

    // ============= AI =============

    /// `GET /ai/insights`
    pub async fn insights(&self, session: &Session) -> Result<Vec<Insight>> {
        let response: InsightsResponse = self.get(session, "/ai/insights", &[]).await?;
        Ok(response.into_vec())
    }

    /// `GET /ai/forecast?months`
    pub async fn forecast(&self, session: &Session, months: Option<u32>) -> Result<Vec<Forecast>> {
        let query: Vec<(&str, String)> = months
            .filter(|m| *m > 0)
            .map(|m| vec![("months", m.to_string())])
            .unwrap_or_default();
        let response: ForecastResponse = self.get(session, "/ai/forecast", &query).await?;
        Ok(response.into_vec())
    }

    /// `POST /ai/chat`
    pub async fn chat(&self, session: &Session, message: &str) -> Result<ChatReply> {
        let request = ChatRequest {
            message: message.to_string(),
        };
        self.send(session, Method::POST, "/ai/chat", &request).await
    }

    /// `POST /ai/categorize`
    pub async fn categorize(
        &self,
        session: &Session,
        description: &str,
        amount: f64,
    ) -> Result<CategorySuggestion> {
        let request = CategorizeRequest {
            description: description.to_string(),
            amount,
        };
        self.send(session, Method::POST, "/ai/categorize", &request)
            .await
    }

    // ============= Reports =============

    /// `GET /reports/{monthly|annual}?year&month&format`
    ///
    /// Parses the JSON report. A PDF request is rejected here since the body
    /// is not JSON; use [`ApiClient::download_report`] for that.
    pub async fn generate_report(
        &self,
        session: &Session,
        kind: ReportKind,
        query: &ReportQuery,
    ) -> Result<Report> {
        if query.format == Some(ReportFormat::Pdf) {
            return Err(Error::InvalidData(
                "PDF reports are binary; download them instead of parsing".into(),
            ));
        }
        self.get(session, &format!("/reports/{}", kind.as_str()), &query.to_pairs())
            .await
    }

    /// `GET /reports/{monthly|annual}?year&month&format=pdf`, raw document bytes
    pub async fn download_report(
        &self,
        session: &Session,
        kind: ReportKind,
        query: &ReportQuery,
    ) -> Result<Vec<u8>> {
        let query = ReportQuery {
            format: Some(ReportFormat::Pdf),
            ..query.clone()
        };
        self.fetch(
            session,
            Method::GET,
            &format!("/reports/{}", kind.as_str()),
            &query.to_pairs(),
            None,
            "application/pdf",
        )
        .await
    }
}
