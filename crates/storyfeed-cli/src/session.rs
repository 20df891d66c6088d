//! Session storage for persisting login state.

use std::fs;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use storyfeed::LoginResult;
use storyfeed_core::{AccessToken, ApiUrl};

use crate::cli::Settings;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// The logged-in account, as stored on disk.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub user_id: String,
    pub name: String,
    pub token: AccessToken,
    pub api_url: ApiUrl,
}

impl StoredSession {
    pub fn new(login: LoginResult, api_url: ApiUrl) -> Self {
        Self {
            user_id: login.user_id,
            name: login.name,
            token: login.token,
            api_url,
        }
    }
}

/// Save a session to disk, readable by the owner only.
pub fn save(settings: &Settings, session: &StoredSession) -> Result<()> {
    fs::create_dir_all(&settings.data_dir).context("Failed to create data directory")?;

    let path = settings.session_path();
    let json = serde_json::to_string_pretty(session)?;
    fs::write(&path, json).context("Failed to write session file")?;

    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    Ok(())
}

/// Load the stored session, if any.
pub fn load(settings: &Settings) -> Result<Option<StoredSession>> {
    let path = settings.session_path();
    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(&path).context("Failed to read session file")?;
    let session = serde_json::from_str(&json).context("Invalid session file")?;
    Ok(Some(session))
}

/// Load the stored session or explain how to create one.
pub fn require(settings: &Settings) -> Result<StoredSession> {
    let session = load(settings)?.context("No active session. Run 'storyfeed login' first.")?;

    if session.api_url != settings.api_url {
        tracing::warn!(
            session = %session.api_url,
            requested = %settings.api_url,
            "Session was created against a different API"
        );
    }

    Ok(session)
}

/// Remove the stored session. Returns false if there was none.
pub fn clear(settings: &Settings) -> Result<bool> {
    let path = settings.session_path();
    if !path.exists() {
        return Ok(false);
    }

    fs::remove_file(&path).context("Failed to remove session file")?;
    Ok(true)
}
