//! Feed commands: the cache-backed feed and the memory-only list.

use anyhow::{Context, Result};
use clap::Args;

use storyfeed::{LocalStore, Pager, PagingConfig};
use storyfeed_core::FeedStore;

use super::{authed_service, check};
use crate::cli::Settings;
use crate::output::{self, FeedJson};

#[derive(Args, Debug)]
pub struct FeedArgs {
    /// Pages to load in this run
    #[arg(long, default_value_t = 1)]
    pub pages: u32,

    /// Stories per page
    #[arg(long, default_value_t = PagingConfig::DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Discard the cache and start from the first page
    #[arg(long)]
    pub refresh: bool,

    /// Print the feed as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Pages to load
    #[arg(long, default_value_t = 1)]
    pub pages: u32,

    /// Stories per page
    #[arg(long, default_value_t = PagingConfig::DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Print the feed as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn feed(args: FeedArgs, settings: &Settings) -> Result<()> {
    let service = authed_service(settings)?;
    let store = LocalStore::open(settings.cache_dir()).context("Failed to open feed cache")?;

    // A warm cache is shown as is and extended from its remote keys, as
    // long as those keys were recorded with the same page size.
    let warm = !store.stories().await?.is_empty();
    let resized = store
        .page_size()
        .await?
        .is_some_and(|recorded| recorded != args.page_size);
    if warm && resized {
        output::progress("Page size changed; refetching from the first page.");
    }
    let refresh = args.refresh || !warm || resized;
    let config = PagingConfig::new(args.page_size)?.with_initial_refresh(refresh);

    let mut pager = Pager::cached(config, service, store);

    if refresh {
        output::progress("Refreshing feed...");
    }
    check(&pager.start().await, "Failed to refresh feed")?;

    let appends = if refresh {
        args.pages.saturating_sub(1)
    } else {
        args.pages
    };
    append_pages(&mut pager, appends).await?;

    print_feed(&pager, args.json)
}

pub async fn list(args: ListArgs, settings: &Settings) -> Result<()> {
    let service = authed_service(settings)?;
    let config = PagingConfig::new(args.page_size)?;
    let mut pager = Pager::memory(config, service);

    output::progress("Loading stories...");
    check(&pager.start().await, "Failed to load stories")?;
    append_pages(&mut pager, args.pages.saturating_sub(1)).await?;

    print_feed(&pager, args.json)
}

async fn append_pages(pager: &mut Pager, pages: u32) -> Result<()> {
    for _ in 0..pages {
        let state = pager.append().await;
        check(&state, "Failed to load next page")?;
        if state.end_of_pagination_reached() {
            break;
        }
    }
    Ok(())
}

fn print_feed(pager: &Pager, json: bool) -> Result<()> {
    if json {
        return output::json(&FeedJson {
            stories: pager.items(),
            load_states: pager.load_states().into(),
        });
    }

    if pager.items().is_empty() {
        output::progress("No stories yet.");
    }
    for (index, story) in pager.items().iter().enumerate() {
        output::story(index + 1, story);
    }
    output::load_states(pager.load_states());
    Ok(())
}
