//! Running a pager on its own task.

use futures_util::StreamExt;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use storyfeed_core::{Result, Story, StoryStream};

use super::Pager;
use crate::snapshot::FeedSnapshot;

const COMMAND_BUFFER: usize = 32;

#[derive(Debug)]
enum Command {
    Refresh,
    Prepend,
    Append,
    Retry,
    ScrolledTo(usize),
}

/// The feed task is gone; every handle's commands go nowhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("feed task has stopped")]
pub struct FeedClosed;

/// Cheap, cloneable control of a spawned [`Pager`].
///
/// Commands are queued and run one at a time in order. Dropping the last
/// handle stops the task; a load already committed to the store stays
/// committed.
#[derive(Debug, Clone)]
pub struct FeedHandle {
    commands: mpsc::Sender<Command>,
    updates: watch::Receiver<FeedSnapshot>,
}

impl FeedHandle {
    pub async fn refresh(&self) -> std::result::Result<(), FeedClosed> {
        self.send(Command::Refresh).await
    }

    pub async fn prepend(&self) -> std::result::Result<(), FeedClosed> {
        self.send(Command::Prepend).await
    }

    pub async fn append(&self) -> std::result::Result<(), FeedClosed> {
        self.send(Command::Append).await
    }

    pub async fn retry(&self) -> std::result::Result<(), FeedClosed> {
        self.send(Command::Retry).await
    }

    /// Report the item the reader is at.
    pub async fn scrolled_to(&self, index: usize) -> std::result::Result<(), FeedClosed> {
        self.send(Command::ScrolledTo(index)).await
    }

    /// A receiver that sees every published snapshot.
    pub fn updates(&self) -> watch::Receiver<FeedSnapshot> {
        self.updates.clone()
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> FeedSnapshot {
        self.updates.borrow().clone()
    }

    async fn send(&self, command: Command) -> std::result::Result<(), FeedClosed> {
        self.commands.send(command).await.map_err(|_| FeedClosed)
    }
}

impl Pager {
    /// Move the pager onto a tokio task and return a handle to it.
    ///
    /// The task starts the feed, then serves commands. A cache-backed feed
    /// also follows commits other writers make to its store.
    pub fn spawn(mut self) -> FeedHandle {
        let (commands, mut inbox) = mpsc::channel(COMMAND_BUFFER);
        let updates = self.subscribe();
        let mut changes = self.observe_store();

        tokio::spawn(async move {
            self.start().await;

            loop {
                tokio::select! {
                    command = inbox.recv() => match command {
                        Some(command) => self.handle(command).await,
                        None => break,
                    },
                    change = next_change(&mut changes) => match change {
                        Some(Ok(stories)) => self.apply_store_change(stories),
                        Some(Err(e)) => warn!(error = %e, "Failed to read store change"),
                        None => changes = None,
                    },
                }
            }

            debug!(mode = ?self.mode(), "Feed task stopped");
        });

        FeedHandle { commands, updates }
    }

    async fn handle(&mut self, command: Command) {
        debug!(?command, "Feed command");
        match command {
            Command::Refresh => {
                self.refresh().await;
            }
            Command::Prepend => {
                self.prepend().await;
            }
            Command::Append => {
                self.append().await;
            }
            Command::Retry => {
                self.retry().await;
            }
            Command::ScrolledTo(index) => self.scrolled_to(index).await,
        }
    }
}

async fn next_change(changes: &mut Option<StoryStream>) -> Option<Result<Vec<Story>>> {
    match changes {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use storyfeed_core::FeedStore;
    use storyfeed_store::LocalStore;
    use tokio::time::timeout;

    use crate::config::PagingConfig;
    use crate::pager::Pager;
    use crate::snapshot::FeedSnapshot;
    use crate::testing::{FakeApi, story};

    async fn wait_for(
        handle: &super::FeedHandle,
        mut done: impl FnMut(&FeedSnapshot) -> bool,
    ) -> FeedSnapshot {
        let mut updates = handle.updates();
        timeout(Duration::from_secs(5), updates.wait_for(|s| done(s)))
            .await
            .expect("timed out waiting for feed")
            .expect("feed task stopped")
            .clone()
    }

    #[tokio::test]
    async fn spawned_feed_starts_and_appends() {
        let api = Arc::new(FakeApi::with_stories(12));
        let handle = Pager::cached(PagingConfig::default(), api, LocalStore::in_memory()).spawn();

        wait_for(&handle, |s| s.len() == 5).await;
        handle.append().await.unwrap();
        handle.append().await.unwrap();
        let snapshot = wait_for(&handle, |s| s.len() == 12).await;
        assert!(!snapshot.load_states.append.is_error());
    }

    #[tokio::test]
    async fn scrolling_prefetches_next_page() {
        let api = Arc::new(FakeApi::with_stories(12));
        let handle = Pager::memory(PagingConfig::default(), api).spawn();

        wait_for(&handle, |s| s.len() == 12).await;
        handle.scrolled_to(11).await.unwrap();
        handle.scrolled_to(11).await.unwrap();
        handle.scrolled_to(11).await.unwrap();
        wait_for(&handle, |s| s.load_states.append.end_of_pagination_reached()).await;
    }

    #[tokio::test]
    async fn retry_after_failure() {
        let api = Arc::new(FakeApi::with_stories(12));
        api.set_failing(true);
        let handle =
            Pager::cached(PagingConfig::default(), Arc::clone(&api), LocalStore::in_memory())
                .spawn();

        wait_for(&handle, |s| s.load_states.refresh.is_error()).await;

        api.set_failing(false);
        handle.retry().await.unwrap();
        let snapshot = wait_for(&handle, |s| s.len() == 5).await;
        assert!(!snapshot.load_states.refresh.is_error());
    }

    #[tokio::test]
    async fn follows_commits_from_other_writers() {
        let api = Arc::new(FakeApi::with_stories(12));
        let store = LocalStore::in_memory();
        let handle = Pager::cached(PagingConfig::default(), api, store.clone()).spawn();
        wait_for(&handle, |s| s.len() == 5).await;

        store
            .transaction(|tables| {
                tables.stories.insert_or_replace(vec![story("external")]);
                Ok(())
            })
            .await
            .unwrap();

        let snapshot = wait_for(&handle, |s| s.len() == 6).await;
        assert_eq!(snapshot.items[5].id.as_str(), "external");
    }

    #[tokio::test]
    async fn dropping_handles_stops_task() {
        let api = Arc::new(FakeApi::with_stories(12));
        let handle = Pager::memory(PagingConfig::default(), api).spawn();
        let mut updates = handle.updates();
        wait_for(&handle, |s| s.len() == 12).await;

        drop(handle);
        // The sender lives in the task; it closes once the task exits.
        timeout(Duration::from_secs(5), async {
            while updates.changed().await.is_ok() {}
        })
        .await
        .expect("feed task did not stop");
    }
}
