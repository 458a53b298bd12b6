//! Shared command context and output helpers
//!
//! This module contains:
//! - `App` - API client plus session, passed to every command
//! - `open_app` - Resolve configuration and build the `App`
//! - `print_json` - Raw JSON output for `--json`

use std::path::Path;

use anyhow::{Context, Result};
use finsight_core::{ApiClient, ClientConfig, Session};
use serde::Serialize;
use tracing::debug;

/// Everything a command needs to talk to the finance API
pub struct App {
    pub client: ApiClient,
    pub session: Session,
    /// Print raw JSON instead of formatted output
    pub json: bool,
}

impl App {
    pub fn new(client: ApiClient, session: Session, json: bool) -> Self {
        Self {
            client,
            session,
            json,
        }
    }
}

/// Resolve configuration (file < env < flags) and build the app context
pub fn open_app(
    config_path: Option<&Path>,
    api_url: Option<&str>,
    session_file: Option<&Path>,
    json: bool,
) -> Result<App> {
    let mut config = match config_path {
        Some(path) => {
            let mut config = ClientConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            config.apply_env();
            config
        }
        None => ClientConfig::load().context("Failed to load config")?,
    };

    if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
        config = config.with_api_url(url.trim());
    }
    if let Some(path) = session_file {
        config = config.with_session_file(path);
    }

    debug!(
        "Using API {} with session file {}",
        config.api_url,
        config.session_file.display()
    );

    let client = ApiClient::from_config(&config).context("Failed to create HTTP client")?;
    let session = Session::with_file(config.session_file.clone());
    Ok(App::new(client, session, json))
}

/// Pretty-print any serializable value as JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Attach a user-facing message to an API result, with a login hint on 401
pub fn api_result<T>(result: finsight_core::Result<T>, action: &str) -> Result<T> {
    result.map_err(|err| {
        let message = if err.is_unauthorized() {
            format!("{} (not logged in or session expired; run 'finsight login')", action)
        } else {
            action.to_string()
        };
        anyhow::Error::new(err).context(message)
    })
}
