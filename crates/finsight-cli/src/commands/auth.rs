//! Authentication command implementations (login, register, logout, whoami)

use anyhow::{Context, Result};
use finsight_core::Registration;

use super::{api_result, print_json, App};

pub async fn cmd_login(app: &App, email: &str, password: &str) -> Result<()> {
    api_result(
        app.client
            .login_and_store(&app.session, email.trim(), password)
            .await,
        "Login failed. Please check your credentials and try again",
    )?;

    println!("✅ Logged in as {}", email.trim());
    Ok(())
}

pub async fn cmd_register(app: &App, email: &str, password: &str, full_name: &str) -> Result<()> {
    let registration = Registration {
        email: email.trim().to_string(),
        password: password.to_string(),
        full_name: full_name.trim().to_string(),
    };

    let response = api_result(
        app.client.register(&app.session, &registration).await,
        "Registration failed. Please check your information and try again",
    )?;

    match response.user_id {
        Some(id) => println!("✅ Account created (user {})", id),
        None => println!("✅ Account created"),
    }

    // Log straight in with the new credentials
    api_result(
        app.client
            .login_and_store(&app.session, &registration.email, password)
            .await,
        "Account created, but automatic login failed",
    )?;
    println!("   Logged in as {}", registration.email);

    Ok(())
}

pub fn cmd_logout(app: &App) -> Result<()> {
    let had_token = app
        .session
        .is_authenticated()
        .context("Failed to read session")?;
    app.session.clear().context("Failed to clear session")?;

    if had_token {
        println!("👋 Logged out");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

pub async fn cmd_whoami(app: &App) -> Result<()> {
    let user = api_result(
        app.client.current_user(&app.session).await,
        "Failed to load current user",
    )?;

    if app.json {
        return print_json(&user);
    }

    println!();
    println!("👤 {}", user.full_name);
    println!("   Email: {}", user.email);
    println!("   ID:    {}", user.id);
    if let Some(created) = &user.created_at {
        println!("   Since: {}", created);
    }
    Ok(())
}
