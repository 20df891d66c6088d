//! Local story cache with atomic commits.

use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use storyfeed_core::Result;
use storyfeed_core::cache::FeedTables;
use storyfeed_core::error::{Error, StoreError};
use storyfeed_core::traits::{FeedStore, StoryStream};
use storyfeed_core::types::{RemoteKey, Story, StoryId};

use crate::snapshot::SnapshotFile;

/// The story cache and remote key store behind a cache-backed feed.
///
/// Readers always see a complete committed state: a transaction works on
/// a staged copy of both tables, persists it (in durable mode), and only
/// then swaps it in. Commits run on the blocking pool and finish even if
/// the task awaiting them is cancelled.
///
/// The store is cheap to clone; clones share the same tables.
///
/// # Example
///
/// ```no_run
/// use storyfeed_core::FeedStore;
/// use storyfeed_store::LocalStore;
///
/// # async fn example() -> storyfeed_core::Result<()> {
/// let store = LocalStore::open("/var/lib/storyfeed")?;
/// let cached = store.stories().await?;
/// println!("{} stories cached", cached.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    tables: RwLock<Arc<FeedTables>>,
    writer: Mutex<()>,
    snapshot: Option<SnapshotFile>,
    version: watch::Sender<u64>,
}

impl LocalStore {
    /// Open a durable store rooted at `root`, loading any previous snapshot.
    #[instrument(skip(root), fields(root = %root.as_ref().display()))]
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let snapshot = SnapshotFile::new(root);
        let tables = snapshot.load()?.unwrap_or_default();

        debug!(stories = tables.stories.len(), "Opened local store");

        Ok(Self::with_tables(tables, Some(snapshot)))
    }

    /// Create a store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::with_tables(FeedTables::new(), None)
    }

    fn with_tables(tables: FeedTables, snapshot: Option<SnapshotFile>) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            inner: Arc::new(StoreInner {
                tables: RwLock::new(Arc::new(tables)),
                writer: Mutex::new(()),
                snapshot,
                version,
            }),
        }
    }

    /// Returns the root directory of a durable store.
    pub fn root(&self) -> Option<&Path> {
        self.inner.snapshot.as_ref().map(SnapshotFile::root)
    }

    /// Returns true if commits are written to disk.
    pub fn is_durable(&self) -> bool {
        self.inner.snapshot.is_some()
    }

    /// Number of commits since the store was opened.
    pub fn version(&self) -> u64 {
        *self.inner.version.borrow()
    }

    /// A consistent copy-on-write view of both tables.
    pub fn tables(&self) -> Result<Arc<FeedTables>> {
        self.inner.current()
    }
}

impl StoreInner {
    fn current(&self) -> Result<Arc<FeedTables>> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        Ok(Arc::clone(&tables))
    }

    fn commit<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut FeedTables) -> Result<R>,
    {
        // One writer at a time; readers are never blocked by the disk write.
        let _writer = self.writer.lock().map_err(|_| StoreError::Poisoned)?;

        let mut staged = FeedTables::clone(&*self.current()?);
        let output = f(&mut staged)?;

        if let Some(snapshot) = &self.snapshot {
            snapshot.write(&staged)?;
        }

        {
            let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;
            *tables = Arc::new(staged);
        }
        self.version.send_modify(|version| *version += 1);

        Ok(output)
    }
}

#[async_trait]
impl FeedStore for LocalStore {
    async fn remote_key(&self, id: &StoryId) -> Result<Option<RemoteKey>> {
        let tables = self.inner.current()?;
        Ok(tables.remote_keys.get(id).cloned())
    }

    async fn stories(&self) -> Result<Vec<Story>> {
        let tables = self.inner.current()?;
        Ok(tables.stories.as_slice().to_vec())
    }

    async fn page_size(&self) -> Result<Option<u32>> {
        Ok(self.inner.current()?.page_size)
    }

    fn observe(&self) -> StoryStream {
        let inner = Arc::clone(&self.inner);
        let mut changes = inner.version.subscribe();

        let stream = async_stream::stream! {
            loop {
                let _ = changes.borrow_and_update();
                yield inner
                    .current()
                    .map(|tables| tables.stories.as_slice().to_vec());

                if changes.changed().await.is_err() {
                    break;
                }
            }
        };

        Box::pin(stream)
    }

    #[instrument(skip(self, f), fields(durable = self.is_durable()))]
    async fn transaction<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut FeedTables) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let result = tokio::task::spawn_blocking(move || inner.commit(f))
            .await
            .map_err(|e| {
                Error::from(StoreError::Worker {
                    message: e.to_string(),
                })
            })?;

        match &result {
            Ok(_) => debug!(version = self.version(), "Committed transaction"),
            Err(e) => warn!(error = %e, "Transaction rolled back"),
        }

        result
    }
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("root", &self.root())
            .field("version", &self.version())
            .finish()
    }
}
