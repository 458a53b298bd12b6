//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use chrono::NaiveDate;
use clap::Parser;
use finsight_core::test_utils::{MockFinanceServer, DEMO_EMAIL, DEMO_PASSWORD, PDF_HEADER};
use finsight_core::{ApiClient, ReportFormat, ReportKind, Session};
use tempfile::TempDir;

use crate::cli::{AiAction, Cli, Commands, ReportType, TransactionsAction};
use crate::commands::{
    self, default_pdf_path, format_money, list_query, report_query, resolve_period, truncate, App,
    SEARCH_FETCH_LIMIT,
};

/// App talking to `server` with a session file inside `dir`
fn test_app(server: &MockFinanceServer, dir: &TempDir) -> App {
    let client = ApiClient::new(&server.url());
    let session = Session::with_file(dir.path().join("session.json"));
    App::new(client, session, false)
}

async fn logged_in_app(server: &MockFinanceServer, dir: &TempDir) -> App {
    let app = test_app(server, dir);
    commands::cmd_login(&app, DEMO_EMAIL, DEMO_PASSWORD)
        .await
        .unwrap();
    app
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_transactions_add() {
    let cli = Cli::try_parse_from([
        "finsight",
        "transactions",
        "add",
        "Coffee",
        "4.50",
        "--type",
        "expense",
        "-c",
        "Food & Dining",
    ])
    .unwrap();

    match cli.command {
        Commands::Transactions {
            action:
                Some(TransactionsAction::Add {
                    description,
                    amount,
                    category,
                    kind,
                    date,
                }),
        } => {
            assert_eq!(description, "Coffee");
            assert_eq!(amount, "4.50");
            assert_eq!(category.as_deref(), Some("Food & Dining"));
            assert_eq!(kind, "expense");
            assert!(date.is_none());
        }
        _ => panic!("expected transactions add"),
    }
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "finsight",
        "whoami",
        "--api-url",
        "http://api.example:9000",
        "--json",
    ])
    .unwrap();
    assert_eq!(cli.api_url.as_deref(), Some("http://api.example:9000"));
    assert!(cli.json);
    assert!(matches!(cli.command, Commands::Whoami));
}

#[test]
fn test_parse_transactions_without_action() {
    let cli = Cli::try_parse_from(["finsight", "transactions"]).unwrap();
    assert!(matches!(cli.command, Commands::Transactions { action: None }));
}

#[test]
fn test_parse_chat_joins_words() {
    let cli = Cli::try_parse_from(["finsight", "ai", "chat", "how", "do", "I", "save"]).unwrap();
    match cli.command {
        Commands::Ai {
            action: AiAction::Chat { message },
        } => assert_eq!(message.join(" "), "how do I save"),
        _ => panic!("expected ai chat"),
    }
}

#[test]
fn test_parse_chat_requires_message() {
    assert!(Cli::try_parse_from(["finsight", "ai", "chat"]).is_err());
}

#[test]
fn test_parse_report_monthly() {
    let cli = Cli::try_parse_from([
        "finsight", "report", "monthly", "--year", "2024", "--month", "1",
    ])
    .unwrap();
    match cli.command {
        Commands::Report {
            report_type:
                ReportType::Monthly {
                    year,
                    month,
                    format,
                    output,
                },
        } => {
            assert_eq!(year, Some(2024));
            assert_eq!(month, Some(1));
            assert!(format.is_none());
            assert!(output.is_none());
        }
        _ => panic!("expected report monthly"),
    }
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a long description here", 10), "a long ...");
    assert_eq!(truncate("₹₹₹₹₹₹₹₹₹₹₹₹", 6), "₹₹₹...");
}

#[test]
fn test_format_money() {
    assert_eq!(format_money(0.0), "0.00");
    assert_eq!(format_money(12.5), "12.50");
    assert_eq!(format_money(1234.5), "1,234.50");
    assert_eq!(format_money(495000.0), "495,000.00");
    assert_eq!(format_money(-34613.0), "-34,613.00");
    assert_eq!(format_money(1234567.891), "1,234,567.89");
}

// ========== Period Tests ==========

#[test]
fn test_resolve_period_named() {
    let today = day(2024, 3, 15);

    assert_eq!(
        resolve_period("this-month", None, None, today).unwrap(),
        (Some(day(2024, 3, 1)), Some(today))
    );
    assert_eq!(
        resolve_period("last-month", None, None, today).unwrap(),
        (Some(day(2024, 2, 1)), Some(day(2024, 2, 29)))
    );
    assert_eq!(
        resolve_period("this-year", None, None, today).unwrap(),
        (Some(day(2024, 1, 1)), Some(today))
    );
    assert_eq!(
        resolve_period("last-30-days", None, None, today).unwrap(),
        (Some(day(2024, 2, 14)), Some(today))
    );
    assert_eq!(resolve_period("all", None, None, today).unwrap(), (None, None));
}

#[test]
fn test_resolve_period_last_month_in_january() {
    let today = day(2024, 1, 10);
    assert_eq!(
        resolve_period("last-month", None, None, today).unwrap(),
        (Some(day(2023, 12, 1)), Some(day(2023, 12, 31)))
    );
}

#[test]
fn test_resolve_period_custom_dates_win() {
    let today = day(2024, 3, 15);
    assert_eq!(
        resolve_period("this-year", Some("2024-01-05"), Some("2024-01-20"), today).unwrap(),
        (Some(day(2024, 1, 5)), Some(day(2024, 1, 20)))
    );
    assert_eq!(
        resolve_period("all", Some("2024-01-05"), None, today).unwrap(),
        (Some(day(2024, 1, 5)), None)
    );
}

#[test]
fn test_resolve_period_errors() {
    let today = day(2024, 3, 15);
    assert!(resolve_period("fortnight", None, None, today).is_err());
    assert!(resolve_period("all", Some("01/05/2024"), None, today).is_err());
    assert!(resolve_period("all", Some("2024-02-01"), Some("2024-01-01"), today).is_err());
}

#[test]
fn test_report_query_defaults_to_today() {
    let today = day(2024, 3, 15);

    let monthly = report_query(ReportKind::Monthly, None, None, None, today).unwrap();
    assert_eq!(monthly.year, Some(2024));
    assert_eq!(monthly.month, Some(3));
    assert_eq!(monthly.format, None);

    let annual = report_query(ReportKind::Annual, Some(2023), Some(7), Some("pdf"), today).unwrap();
    assert_eq!(annual.year, Some(2023));
    assert_eq!(annual.month, None);
    assert_eq!(annual.format, Some(ReportFormat::Pdf));
}

#[test]
fn test_report_query_rejects_bad_input() {
    let today = day(2024, 3, 15);
    assert!(report_query(ReportKind::Monthly, None, Some(13), None, today).is_err());
    assert!(report_query(ReportKind::Monthly, None, None, Some("xlsx"), today).is_err());
}

// ========== Auth Command Tests ==========

#[tokio::test]
async fn test_cmd_login_persists_token() {
    let server = MockFinanceServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = logged_in_app(&server, &dir).await;

    assert!(app.session.is_authenticated().unwrap());

    // A fresh session over the same file sees the token
    let reopened = Session::with_file(dir.path().join("session.json"));
    assert_eq!(reopened.get_token().unwrap(), app.session.get_token().unwrap());
}

#[tokio::test]
async fn test_cmd_login_bad_password() {
    let server = MockFinanceServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = test_app(&server, &dir);

    let err = commands::cmd_login(&app, DEMO_EMAIL, "wrong")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Login failed"));
    assert!(!app.session.is_authenticated().unwrap());
}

#[tokio::test]
async fn test_cmd_register_logs_in() {
    let server = MockFinanceServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = test_app(&server, &dir);

    commands::cmd_register(&app, "new@finsight.test", "secret-pass", "New User")
        .await
        .unwrap();

    assert!(app.session.is_authenticated().unwrap());
    let user = app.client.current_user(&app.session).await.unwrap();
    assert_eq!(user.email, "new@finsight.test");
    assert_eq!(user.full_name, "New User");
}

#[tokio::test]
async fn test_cmd_logout_clears_session() {
    let server = MockFinanceServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = logged_in_app(&server, &dir).await;

    commands::cmd_logout(&app).unwrap();
    assert!(!app.session.is_authenticated().unwrap());

    // Logging out twice is fine
    commands::cmd_logout(&app).unwrap();
}

#[tokio::test]
async fn test_cmd_whoami_requires_login() {
    let server = MockFinanceServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = test_app(&server, &dir);

    let err = commands::cmd_whoami(&app).await.unwrap_err();
    assert!(err.to_string().contains("finsight login"));

    let core_err = err.downcast_ref::<finsight_core::Error>().unwrap();
    assert_eq!(core_err.status(), Some(401));
}

// ========== Transaction Command Tests ==========

#[tokio::test]
async fn test_cmd_transactions_add_sends_number() {
    let server = MockFinanceServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = logged_in_app(&server, &dir).await;
    let before = server.transaction_ids(DEMO_EMAIL).len();

    commands::cmd_transactions_add(&app, "Coffee", "12.50", None, "expense", Some("2024-01-20"))
        .await
        .unwrap();

    assert_eq!(server.transaction_ids(DEMO_EMAIL).len(), before + 1);

    let request = server.last_request().unwrap();
    assert_eq!(request.method, "POST");
    let body = request.body.unwrap();
    assert_eq!(body["amount"], serde_json::json!(12.5));
    assert_eq!(body["transaction_type"], "expense");
    assert_eq!(body["date"], "2024-01-20");
    assert!(body.get("category").is_none());
}

#[tokio::test]
async fn test_cmd_transactions_add_rejects_bad_input() {
    let server = MockFinanceServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = logged_in_app(&server, &dir).await;
    let before = server.requests().len();

    assert!(commands::cmd_transactions_add(&app, "Coffee", "abc", None, "expense", None)
        .await
        .is_err());
    assert!(commands::cmd_transactions_add(&app, "Coffee", "4", None, "transfer", None)
        .await
        .is_err());
    assert!(commands::cmd_transactions_add(&app, "  ", "4", None, "expense", None)
        .await
        .is_err());

    // Validation failures never reach the server
    assert_eq!(server.requests().len(), before);
}

#[tokio::test]
async fn test_cmd_transactions_update_and_delete() {
    let server = MockFinanceServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = logged_in_app(&server, &dir).await;
    let id = server.transaction_ids(DEMO_EMAIL)[0];

    commands::cmd_transactions_update(&app, id, Some("99"), None, Some("Travel"), None)
        .await
        .unwrap();
    let body = server.last_request().unwrap().body.unwrap();
    assert_eq!(body["amount"], serde_json::json!(99.0));
    assert_eq!(body["category"], "Travel");
    assert!(body.get("description").is_none());

    commands::cmd_transactions_delete(&app, id).await.unwrap();
    assert!(!server.transaction_ids(DEMO_EMAIL).contains(&id));

    // Already gone
    let err = commands::cmd_transactions_delete(&app, id)
        .await
        .unwrap_err();
    let core_err = err.downcast_ref::<finsight_core::Error>().unwrap();
    assert_eq!(core_err.status(), Some(404));
}

#[tokio::test]
async fn test_cmd_transactions_update_requires_a_field() {
    let server = MockFinanceServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = logged_in_app(&server, &dir).await;

    let err = commands::cmd_transactions_update(&app, 1, None, Some("  "), None, None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Nothing to update"));
}

#[tokio::test]
async fn test_cmd_transactions_list_category_query() {
    let server = MockFinanceServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = logged_in_app(&server, &dir).await;

    commands::cmd_transactions_list(&app, 10, None, Some("all"), None)
        .await
        .unwrap();
    assert_eq!(server.last_request().unwrap().uri, "/transactions?limit=10");

    commands::cmd_transactions_list(&app, 10, Some(5), Some("Shopping"), None)
        .await
        .unwrap();
    assert_eq!(
        server.last_request().unwrap().uri,
        "/transactions?skip=5&limit=10&category=Shopping"
    );
}

#[tokio::test]
async fn test_cmd_transactions_search_fetches_wide_page() {
    let server = MockFinanceServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = logged_in_app(&server, &dir).await;

    commands::cmd_transactions_list(&app, 2, None, None, Some("freelance"))
        .await
        .unwrap();
    assert_eq!(server.last_request().unwrap().uri, "/transactions?limit=500");

    // A blank search is no search
    commands::cmd_transactions_list(&app, 2, None, None, Some("  "))
        .await
        .unwrap();
    assert_eq!(server.last_request().unwrap().uri, "/transactions?limit=2");
}

#[test]
fn test_list_query_widens_for_search() {
    let plain = list_query(20, Some(40), Some("Travel"), false);
    assert_eq!(plain.limit, Some(20));
    assert_eq!(plain.skip, Some(40));
    assert_eq!(plain.category.as_deref(), Some("Travel"));

    let search = list_query(20, None, None, true);
    assert_eq!(search.limit, Some(SEARCH_FETCH_LIMIT));

    // A limit above the search page is kept
    assert_eq!(list_query(1000, None, None, true).limit, Some(1000));
}

// ========== Dashboard / Analytics / AI / Report Tests ==========

#[tokio::test]
async fn test_read_only_commands_succeed_when_logged_in() {
    let server = MockFinanceServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = logged_in_app(&server, &dir).await;

    commands::cmd_whoami(&app).await.unwrap();
    commands::cmd_status(&app).await.unwrap();
    commands::cmd_dashboard(&app).await.unwrap();
    commands::cmd_analytics_expenses(&app, "all", None, None)
        .await
        .unwrap();
    commands::cmd_analytics_summary(&app).await.unwrap();
    commands::cmd_analytics_categories(&app).await.unwrap();
    commands::cmd_ai_insights(&app).await.unwrap();
    commands::cmd_ai_forecast(&app, Some(3)).await.unwrap();
    commands::cmd_ai_chat(&app, &["how".to_string(), "to".to_string(), "save".to_string()])
        .await
        .unwrap();
    commands::cmd_ai_categorize(&app, "Uber ride", "250").await.unwrap();
    commands::cmd_report(&app, ReportKind::Monthly, Some(2024), Some(1), None, None)
        .await
        .unwrap();
    commands::cmd_report(&app, ReportKind::Annual, Some(2024), None, Some("json"), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_analytics_expenses_sends_dates() {
    let server = MockFinanceServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = logged_in_app(&server, &dir).await;

    commands::cmd_analytics_expenses(&app, "all", Some("2024-01-01"), Some("2024-01-31"))
        .await
        .unwrap();
    assert_eq!(
        server.last_request().unwrap().uri,
        "/analytics/expenses?start_date=2024-01-01&end_date=2024-01-31"
    );

    commands::cmd_analytics_expenses(&app, "all", None, None)
        .await
        .unwrap();
    assert_eq!(server.last_request().unwrap().uri, "/analytics/expenses");
}

#[tokio::test]
async fn test_cmd_report_query_string() {
    let server = MockFinanceServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = logged_in_app(&server, &dir).await;

    commands::cmd_report(&app, ReportKind::Monthly, Some(2024), Some(1), Some("json"), None)
        .await
        .unwrap();
    assert_eq!(
        server.last_request().unwrap().uri,
        "/reports/monthly?year=2024&month=1&format=json"
    );
}

#[tokio::test]
async fn test_cmd_report_pdf_saved_to_file() {
    let server = MockFinanceServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = logged_in_app(&server, &dir).await;
    let output = dir.path().join("january.pdf");

    commands::cmd_report(
        &app,
        ReportKind::Monthly,
        Some(2024),
        Some(1),
        Some("pdf"),
        Some(&output),
    )
    .await
    .unwrap();

    assert_eq!(
        server.last_request().unwrap().uri,
        "/reports/monthly?year=2024&month=1&format=pdf"
    );
    let document = std::fs::read(&output).unwrap();
    assert!(document.starts_with(PDF_HEADER.as_bytes()));
}

#[tokio::test]
async fn test_cmd_report_output_requires_pdf() {
    let server = MockFinanceServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = logged_in_app(&server, &dir).await;
    let output = dir.path().join("report.json");

    let err = commands::cmd_report(&app, ReportKind::Annual, Some(2024), None, None, Some(&output))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("--format pdf"));
    assert!(!output.exists());
}

#[test]
fn test_default_pdf_path() {
    let query = report_query(ReportKind::Monthly, Some(2024), Some(3), Some("pdf"), day(2024, 3, 15)).unwrap();
    assert_eq!(
        default_pdf_path(ReportKind::Monthly, &query),
        std::path::PathBuf::from("finsight-monthly-2024-03.pdf")
    );

    let annual = report_query(ReportKind::Annual, Some(2023), None, Some("pdf"), day(2024, 3, 15)).unwrap();
    assert_eq!(
        default_pdf_path(ReportKind::Annual, &annual),
        std::path::PathBuf::from("finsight-annual-2023.pdf")
    );
}

#[tokio::test]
async fn test_cmd_dashboard_requires_login() {
    let server = MockFinanceServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = test_app(&server, &dir);

    assert!(commands::cmd_dashboard(&app).await.is_err());
    // Status works without a session
    commands::cmd_status(&app).await.unwrap();
}

#[tokio::test]
async fn test_cmd_ai_chat_rejects_empty_message() {
    let server = MockFinanceServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = logged_in_app(&server, &dir).await;
    let before = server.requests().len();

    assert!(commands::cmd_ai_chat(&app, &["  ".to_string()]).await.is_err());
    assert_eq!(server.requests().len(), before);
}

// ========== Offline Command Tests ==========

#[test]
fn test_cmd_categories_offline() {
    commands::cmd_categories(None, false).unwrap();
    commands::cmd_categories(Some("Netflix subscription"), true).unwrap();
    commands::cmd_categories(Some("   "), false).unwrap();
}

// ========== Config Resolution Tests ==========

#[test]
fn test_open_app_flags_override_config_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        "api_url = \"http://from-file:8000\"\ntimeout_secs = 5\n",
    )
    .unwrap();
    let session_path = dir.path().join("s.json");

    let app = commands::open_app(
        Some(&config_path),
        Some("http://from-flag:9000/"),
        Some(&session_path),
        true,
    )
    .unwrap();

    assert_eq!(app.client.base_url(), "http://from-flag:9000");
    assert!(app.json);
}

#[test]
fn test_open_app_bad_config_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, "unknown_key = 1\n").unwrap();

    assert!(commands::open_app(Some(&config_path), None, None, false).is_err());
}
