use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::{fs, io};

use async_trait::async_trait;
use chrono::Utc;
use spdlog::info;
use tempfile::NamedTempFile;

use crate::content::{ContentChanges, ContentId, ContentItem, NewContent};
use crate::error::{StoreError, StoreResult};
use crate::store::{ContentFilter, ContentStore, StoreData, Subscriber, SubscriberStore};

/// Keeps everything in one JSON document on disk.
///
/// The whole document is rewritten after each mutation, through a temporary
/// file in the same directory renamed over the old one. Writes happen on the
/// calling worker and block it. Meant for a single process: other processes
/// writing the same file are not seen and get overwritten.
pub struct JsonFileStore {
    path: PathBuf,
    data: RwLock<StoreData>,
}

impl JsonFileStore {
    /// Opens the file, starting empty if it does not exist yet.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let data = match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => StoreData::default(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == ErrorKind::NotFound => StoreData::default(),
            Err(e) => return Err(io::Error::new(
                e.kind(), format!("Error opening data file {}: {}", path.display(), e)).into()),
        };
        info!("Content store {} opened with {} items and {} subscribers",
            path.display(), data.content.len(), data.subscribers.len());

        Ok(JsonFileStore {
            path: path.to_path_buf(),
            data: RwLock::new(data),
        })
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreData>> {
        self.data.read().map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, StoreData>> {
        self.data.write().map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    fn persist(&self, data: &StoreData) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(tmp.as_file_mut(), data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Applies `op` and writes the result. Nothing is written when `op` fails.
    fn mutate<T>(&self, op: impl FnOnce(&mut StoreData) -> StoreResult<T>) -> StoreResult<T> {
        let mut data = self.write()?;
        let mut changed = data.clone();
        let res = op(&mut changed)?;
        self.persist(&changed)?;
        *data = changed;
        Ok(res)
    }
}

#[async_trait]
impl ContentStore for JsonFileStore {
    async fn get(&self, id: ContentId) -> StoreResult<Option<ContentItem>> {
        Ok(self.read()?.get(id))
    }

    async fn find_by_external_url(&self, url: &str) -> StoreResult<Option<ContentItem>> {
        Ok(self.read()?.find_by_external_url(url))
    }

    async fn insert(&self, new: NewContent) -> StoreResult<ContentItem> {
        self.mutate(|data| data.insert(new, Utc::now()))
    }

    async fn update(&self, id: ContentId, changes: ContentChanges) -> StoreResult<ContentItem> {
        self.mutate(|data| data.update(id, changes, Utc::now()))
    }

    async fn update_by_external_url(&self, url: &str, changes: ContentChanges) -> StoreResult<ContentItem> {
        self.mutate(|data| data.update_by_external_url(url, changes, Utc::now()))
    }

    async fn delete(&self, id: ContentId) -> StoreResult<bool> {
        self.mutate(|data| Ok(data.delete(id)))
    }

    async fn list(&self, filter: &ContentFilter) -> StoreResult<Vec<ContentItem>> {
        Ok(self.read()?.list(filter))
    }
}

#[async_trait]
impl SubscriberStore for JsonFileStore {
    async fn add_subscriber(&self, email: &str) -> StoreResult<Subscriber> {
        self.mutate(|data| data.add_subscriber(email, Utc::now()))
    }

    async fn subscribers(&self) -> StoreResult<Vec<Subscriber>> {
        Ok(self.read()?.subscribers.clone())
    }
}
