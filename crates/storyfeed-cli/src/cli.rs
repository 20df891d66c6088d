//! CLI argument definitions.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;

use storyfeed::DEFAULT_API_URL;
use storyfeed_core::ApiUrl;

use crate::commands::Commands;

/// Browse and post to the story feed.
#[derive(Parser, Debug)]
#[command(name = "storyfeed")]
#[command(author, version = env!("STORYFEED_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Story API base URL
    #[arg(long, global = true, env = "STORYFEED_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: ApiUrl,

    /// Directory for the session and the feed cache
    #[arg(long, global = true, env = "STORYFEED_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn settings(&self) -> Result<Settings> {
        let data_dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => ProjectDirs::from("", "", "storyfeed")
                .context("Could not determine data directory")?
                .data_dir()
                .to_path_buf(),
        };

        Ok(Settings {
            api_url: self.api_url.clone(),
            data_dir,
        })
    }
}

/// Resolved global options shared by every command.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: ApiUrl,
    pub data_dir: PathBuf,
}

impl Settings {
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache")
    }
}
