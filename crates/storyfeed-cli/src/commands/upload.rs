//! Upload command: post a story with a photo.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use storyfeed::{NewStory, Photo};

use super::authed_service;
use crate::cli::Settings;
use crate::output;

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Story text
    #[arg(long)]
    pub description: String,

    /// Photo to attach (jpg, png, gif or webp)
    #[arg(long)]
    pub photo: PathBuf,

    /// Latitude of the story
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude of the story
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

pub async fn run(args: UploadArgs, settings: &Settings) -> Result<()> {
    let service = authed_service(settings)?;
    let mime_type = mime_type(&args.photo)?;

    let bytes = tokio::fs::read(&args.photo)
        .await
        .with_context(|| format!("Failed to read {}", args.photo.display()))?;
    let file_name = args
        .photo
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());

    let location = args.lat.zip(args.lon);
    let story = NewStory {
        description: args.description,
        photo: Photo {
            file_name,
            mime_type: mime_type.to_string(),
            bytes,
        },
        location,
    };

    output::progress("Uploading...");
    let message = service
        .add_story(story)
        .await
        .context("Failed to upload story")?;

    output::success(&message);
    Ok(())
}

fn mime_type(path: &Path) -> Result<&'static str> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        _ => anyhow::bail!(
            "Unsupported photo type '{}'. Use jpg, png, gif or webp.",
            path.display()
        ),
    }
}
