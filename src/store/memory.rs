use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::content::{ContentChanges, ContentId, ContentItem, NewContent};
use crate::error::{StoreError, StoreResult};
use crate::store::{ContentFilter, ContentStore, StoreData, Subscriber, SubscriberStore};

/// Keeps everything in memory. Used when no data file is configured, and by tests.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<StoreData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Default::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreData>> {
        self.data.read().map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, StoreData>> {
        self.data.write().map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn get(&self, id: ContentId) -> StoreResult<Option<ContentItem>> {
        Ok(self.read()?.get(id))
    }

    async fn find_by_external_url(&self, url: &str) -> StoreResult<Option<ContentItem>> {
        Ok(self.read()?.find_by_external_url(url))
    }

    async fn insert(&self, new: NewContent) -> StoreResult<ContentItem> {
        self.write()?.insert(new, Utc::now())
    }

    async fn update(&self, id: ContentId, changes: ContentChanges) -> StoreResult<ContentItem> {
        self.write()?.update(id, changes, Utc::now())
    }

    async fn update_by_external_url(&self, url: &str, changes: ContentChanges) -> StoreResult<ContentItem> {
        self.write()?.update_by_external_url(url, changes, Utc::now())
    }

    async fn delete(&self, id: ContentId) -> StoreResult<bool> {
        Ok(self.write()?.delete(id))
    }

    async fn list(&self, filter: &ContentFilter) -> StoreResult<Vec<ContentItem>> {
        Ok(self.read()?.list(filter))
    }
}

#[async_trait]
impl SubscriberStore for MemoryStore {
    async fn add_subscriber(&self, email: &str) -> StoreResult<Subscriber> {
        self.write()?.add_subscriber(email, Utc::now())
    }

    async fn subscribers(&self) -> StoreResult<Vec<Subscriber>> {
        Ok(self.read()?.subscribers.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use crate::content::{ContentStatus, ContentType};

    use super::*;

    fn link(url: &str) -> NewContent {
        NewContent {
            title: "Link".to_string(),
            description: String::new(),
            content_type: ContentType::Video,
            content_html: None,
            external_url: Some(url.to_string()),
            thumbnail_url: None,
            category: None,
            tags: vec![],
            status: ContentStatus::Draft,
            published_at: None,
            author_id: None,
            metadata: Value::Null,
        }
    }

    #[tokio::test]
    async fn test_insert_get_delete() -> StoreResult<()> {
        let store = MemoryStore::new();
        let item = store.insert(link("https://youtu.be/abc")).await?;

        assert_eq!(store.get(item.id).await?, Some(item.clone()));
        assert_eq!(store.find_by_external_url("https://youtu.be/abc").await?.map(|i| i.id), Some(item.id));
        assert_eq!(store.find_by_external_url("https://youtu.be/other").await?, None);

        assert!(store.delete(item.id).await?);
        assert!(!store.delete(item.id).await?);
        assert_eq!(store.get(item.id).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing() {
        let store = MemoryStore::new();
        let res = store.update(ContentId::new(), ContentChanges::default()).await;
        assert!(matches!(res, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_subscribers() -> StoreResult<()> {
        let store = MemoryStore::new();
        store.add_subscriber("lp@example.com").await?;
        assert!(store.add_subscriber("LP@example.com").await.is_err());
        assert_eq!(store.subscribers().await?.len(), 1);
        Ok(())
    }
}
