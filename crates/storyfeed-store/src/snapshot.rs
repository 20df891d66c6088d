//! On-disk snapshot of the feed tables.
//!
//! ## Directory Structure
//!
//! ```text
//! $ROOT/feed/
//! ├── snapshot.json
//! └── snapshot.lock
//! ```
//!
//! Both tables live in one file so a commit is a single rename.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use storyfeed_core::Result;
use storyfeed_core::cache::{FeedTables, RemoteKeyTable, StoryTable};
use storyfeed_core::error::StoreError;

const FORMAT_VERSION: u32 = 1;

/// Borrowed form written on commit.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotOut<'a> {
    version: u32,
    saved_at: String,
    stories: &'a StoryTable,
    remote_keys: &'a RemoteKeyTable,
    page_size: Option<u32>,
}

/// Owned form read on open.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotIn {
    version: u32,
    stories: StoryTable,
    remote_keys: RemoteKeyTable,
    #[serde(default)]
    page_size: Option<u32>,
}

/// The snapshot file pair under a store root.
#[derive(Debug, Clone)]
pub(crate) struct SnapshotFile {
    root: PathBuf,
}

impl SnapshotFile {
    pub(crate) fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    fn feed_dir(&self) -> PathBuf {
        self.root.join("feed")
    }

    pub(crate) fn path(&self) -> PathBuf {
        self.feed_dir().join("snapshot.json")
    }

    fn lock_path(&self) -> PathBuf {
        self.feed_dir().join("snapshot.lock")
    }

    fn open_lock(&self) -> Result<File> {
        fs::create_dir_all(self.feed_dir()).map_err(StoreError::from)?;
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(StoreError::from)?;
        Ok(lock)
    }

    /// Read the snapshot, or `None` if nothing was ever committed.
    pub(crate) fn load(&self) -> Result<Option<FeedTables>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }

        let lock = self.open_lock()?;
        lock.lock_shared().map_err(StoreError::from)?;
        let content = fs::read_to_string(&path).map_err(StoreError::from);
        lock.unlock().map_err(StoreError::from)?;
        let content = content?;

        let snapshot: SnapshotIn =
            serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        if snapshot.version != FORMAT_VERSION {
            return Err(StoreError::Corrupt {
                path: path.display().to_string(),
                message: format!("unsupported snapshot version {}", snapshot.version),
            }
            .into());
        }

        debug!(
            stories = snapshot.stories.len(),
            keys = snapshot.remote_keys.len(),
            "Loaded feed snapshot"
        );

        Ok(Some(FeedTables {
            stories: snapshot.stories,
            remote_keys: snapshot.remote_keys,
            page_size: snapshot.page_size,
        }))
    }

    /// Replace the snapshot with `tables`.
    ///
    /// Writes a temp file, syncs it and renames it over the snapshot while
    /// holding the exclusive lock.
    pub(crate) fn write(&self, tables: &FeedTables) -> Result<()> {
        let lock = self.open_lock()?;
        lock.lock_exclusive().map_err(StoreError::from)?;
        let written = self.write_locked(tables);
        lock.unlock().map_err(StoreError::from)?;
        written
    }

    fn write_locked(&self, tables: &FeedTables) -> Result<()> {
        let path = self.path();
        let temp_path = path.with_extension("tmp");

        let snapshot = SnapshotOut {
            version: FORMAT_VERSION,
            saved_at: Utc::now().to_rfc3339(),
            stories: &tables.stories,
            remote_keys: &tables.remote_keys,
            page_size: tables.page_size,
        };
        let content = serde_json::to_vec(&snapshot).map_err(|e| StoreError::Io {
            message: e.to_string(),
        })?;

        let mut file = File::create(&temp_path).map_err(StoreError::from)?;
        file.write_all(&content).map_err(StoreError::from)?;
        file.sync_all().map_err(StoreError::from)?;
        fs::rename(&temp_path, &path).map_err(StoreError::from)?;

        debug!(path = %path.display(), bytes = content.len(), "Wrote feed snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyfeed_core::{PageToken, RemoteKey, Story, StoryId};
    use tempfile::TempDir;

    fn tables() -> FeedTables {
        let id = StoryId::new("story-1").unwrap();
        let mut tables = FeedTables::new();
        tables.stories.insert_or_replace(vec![Story {
            id: id.clone(),
            name: "Dimas".to_string(),
            description: "hello".to_string(),
            photo_url: "https://example.com/1.jpg".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            lat: Some(1.5),
            lon: None,
        }]);
        tables
            .remote_keys
            .insert_all(vec![RemoteKey::for_page(id, PageToken::FIRST, false)]);
        tables
    }

    #[test]
    fn missing_snapshot_loads_as_none() {
        let tmp = TempDir::new().unwrap();
        let file = SnapshotFile::new(tmp.path());
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn write_then_load() {
        let tmp = TempDir::new().unwrap();
        let file = SnapshotFile::new(tmp.path());

        file.write(&tables()).unwrap();
        assert!(tmp.path().join("feed/snapshot.json").exists());
        assert!(!tmp.path().join("feed/snapshot.tmp").exists());

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded, tables());
    }

    #[test]
    fn unknown_version_is_corrupt() {
        let tmp = TempDir::new().unwrap();
        let file = SnapshotFile::new(tmp.path());
        fs::create_dir_all(tmp.path().join("feed")).unwrap();
        fs::write(
            file.path(),
            r#"{"version": 99, "stories": [], "remoteKeys": []}"#,
        )
        .unwrap();

        let err = file.load().unwrap_err();
        assert!(err.to_string().contains("unsupported snapshot version 99"));
    }
}
