//! Map command: stories that carry a location.

use std::pin::pin;

use anyhow::{Context, Result};
use clap::Args;
use futures_util::StreamExt;

use storyfeed::{Resource, stories_with_location};
use storyfeed_core::Story;

use super::{authed_service, hint_for};
use crate::cli::Settings;
use crate::output;

#[derive(Args, Debug)]
pub struct MapArgs {
    /// Print the stories as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: MapArgs, settings: &Settings) -> Result<()> {
    let service = authed_service(settings)?;
    let mut states = pin!(stories_with_location(service));

    while let Some(state) = states.next().await {
        match state {
            Resource::Loading => output::progress("Loading stories with location..."),
            Resource::Success(stories) => return print(&stories, args.json),
            Resource::Error(cause) => {
                let message = match hint_for(&cause) {
                    Some(hint) => format!("Failed to load stories with location. {hint}"),
                    None => "Failed to load stories with location".to_string(),
                };
                return Err(cause).context(message);
            }
        }
    }

    Ok(())
}

fn print(stories: &[Story], json: bool) -> Result<()> {
    if json {
        return output::json(&stories);
    }

    if stories.is_empty() {
        output::progress("No stories with a location.");
    }
    for (index, story) in stories.iter().enumerate() {
        output::story(index + 1, story);
    }
    Ok(())
}
