//! Account commands: register, login, whoami, logout.

use anyhow::{Context, Result};
use clap::Args;

use storyfeed_core::Credentials;

use super::anonymous_service;
use crate::cli::Settings;
use crate::output;
use crate::session::{self, StoredSession};

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Email address
    #[arg(long)]
    pub email: String,

    /// Password (at least 8 characters)
    #[arg(long)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Email address
    #[arg(long)]
    pub email: String,

    /// Password
    #[arg(long)]
    pub password: String,
}

pub async fn register(args: RegisterArgs, settings: &Settings) -> Result<()> {
    if args.password.chars().count() < 8 {
        anyhow::bail!("Password must be at least 8 characters");
    }

    let service = anonymous_service(settings)?;
    output::progress("Registering...");

    let message = service
        .register(&args.name, &args.email, &args.password)
        .await
        .context("Failed to register")?;

    output::success(&message);
    Ok(())
}

pub async fn login(args: LoginArgs, settings: &Settings) -> Result<()> {
    let service = anonymous_service(settings)?;
    let credentials = Credentials::new(args.email, args.password);
    output::progress("Logging in...");

    let login = service
        .login(&credentials)
        .await
        .context("Failed to login")?;

    let session = StoredSession::new(login, settings.api_url.clone());
    session::save(settings, &session).context("Failed to save session")?;

    output::success("Logged in successfully");
    println!();
    output::field("Name", &session.name);
    output::field("User ID", &session.user_id);
    output::field("API", session.api_url.as_str());

    Ok(())
}

pub fn whoami(settings: &Settings) -> Result<()> {
    let session = session::require(settings)?;

    output::field("Name", &session.name);
    output::field("User ID", &session.user_id);
    output::field("API", session.api_url.as_str());

    Ok(())
}

pub fn logout(settings: &Settings) -> Result<()> {
    if session::clear(settings)? {
        output::success("Logged out");
    } else {
        output::progress("No active session.");
    }
    Ok(())
}
