//! Subcommand implementations.

mod account;
mod feed;
mod map;
mod upload;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Subcommand;

use storyfeed::{ClientConfig, LoadState, StoryService};
use storyfeed_core::Error;

use crate::cli::Settings;
use crate::session;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account
    Register(account::RegisterArgs),

    /// Log in and store the session
    Login(account::LoginArgs),

    /// Display the active session
    Whoami,

    /// Remove the stored session
    Logout,

    /// Show the cached feed, fetching pages as needed
    Feed(feed::FeedArgs),

    /// Page through the feed without touching the cache
    List(feed::ListArgs),

    /// Show every story that has a location
    Map(map::MapArgs),

    /// Post a new story with a photo
    Upload(upload::UploadArgs),
}

pub async fn handle(command: Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::Register(args) => account::register(args, settings).await,
        Commands::Login(args) => account::login(args, settings).await,
        Commands::Whoami => account::whoami(settings),
        Commands::Logout => account::logout(settings),
        Commands::Feed(args) => feed::feed(args, settings).await,
        Commands::List(args) => feed::list(args, settings).await,
        Commands::Map(args) => map::run(args, settings).await,
        Commands::Upload(args) => upload::run(args, settings).await,
    }
}

/// A client without a token, for account commands.
fn anonymous_service(settings: &Settings) -> Result<StoryService> {
    StoryService::new(ClientConfig::new(settings.api_url.clone()))
        .context("Failed to create HTTP client")
}

/// A client carrying the stored session's token.
fn authed_service(settings: &Settings) -> Result<StoryService> {
    let session = session::require(settings)?;
    Ok(anonymous_service(settings)?.with_token(session.token))
}

/// Turn a failed load into an error for the user.
fn check(state: &LoadState, what: &str) -> Result<()> {
    match state {
        LoadState::Error(cause) => {
            let message = match hint_for(cause) {
                Some(hint) => format!("{what}. {hint}"),
                None => what.to_string(),
            };
            Err(Arc::clone(cause)).context(message)
        }
        _ => Ok(()),
    }
}

/// Suggest logging in again when the server rejected the token.
fn hint_for(error: &Error) -> Option<&'static str> {
    match error {
        Error::Server(e) if e.is_auth_error() => Some("Run 'storyfeed login' again."),
        _ => None,
    }
}
