//! Output formatting helpers.

use anyhow::Result;
use chrono::DateTime;
use colored::Colorize;
use serde::Serialize;

use storyfeed::{LoadState, LoadStates};
use storyfeed_core::Story;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a progress note to stderr.
pub fn progress(msg: &str) {
    eprintln!("{}", msg.dimmed());
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print one story as a numbered entry.
pub fn story(position: usize, story: &Story) {
    println!(
        "{:>3}. {} {}",
        position,
        story.name.bold(),
        format_timestamp(&story.created_at).dimmed()
    );
    println!("     {}", story.description);
    if let Some((lat, lon)) = story.location() {
        println!("     {}", format!("at {lat:.5}, {lon:.5}").dimmed());
    }
}

/// Print the state of every load boundary.
pub fn load_states(states: &LoadStates) {
    eprintln!(
        "{} refresh {} · prepend {} · append {}",
        "load:".dimmed(),
        state(&states.refresh),
        state(&states.prepend),
        state(&states.append)
    );
}

fn state(state: &LoadState) -> String {
    match state {
        LoadState::Loading => "loading".yellow().to_string(),
        LoadState::Loaded {
            end_of_pagination_reached: true,
        } => "end".cyan().to_string(),
        LoadState::Loaded { .. } => "idle".green().to_string(),
        LoadState::Error(_) => "error".red().to_string(),
    }
}

/// Load states as they appear in `--json` output.
#[derive(Debug, Serialize)]
pub struct LoadStatesJson {
    pub refresh: String,
    pub prepend: String,
    pub append: String,
}

impl From<&LoadStates> for LoadStatesJson {
    fn from(states: &LoadStates) -> Self {
        Self {
            refresh: states.refresh.to_string(),
            prepend: states.prepend.to_string(),
            append: states.append.to_string(),
        }
    }
}

/// A feed as it appears in `--json` output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedJson<'a> {
    pub stories: &'a [Story],
    pub load_states: LoadStatesJson,
}

fn format_timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
