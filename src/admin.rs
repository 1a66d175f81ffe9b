use std::sync::Arc;

use chrono::Utc;
use spdlog::{error, info};

use crate::content::{ContentChanges, ContentId, ContentItem, ContentStatus, NewContent};
use crate::error::{StoreError, StoreResult};
use crate::store::{ContentFilter, ContentOrder, ContentStore};

const COPY_SUFFIX: &str = " (Copy)";

/// Editorial operations behind the admin API.
///
/// `published_at` follows the status: moving to published stamps it (an
/// existing stamp is kept), any other status clears it.
pub struct ContentManager {
    store: Arc<dyn ContentStore>,
}

fn logged<T>(action: &str, res: StoreResult<T>) -> StoreResult<T> {
    match res {
        Ok(val) => {
            info!("Content {} successfully", action);
            Ok(val)
        }
        Err(e) => {
            error!("Error while content was being {}: {}", action, e);
            Err(e)
        }
    }
}

impl ContentManager {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        ContentManager { store }
    }

    /// Every item regardless of status, newest first.
    pub async fn list_all(&self) -> StoreResult<Vec<ContentItem>> {
        let filter = ContentFilter {
            order: ContentOrder::CreatedDesc,
            ..Default::default()
        };
        self.store.list(&filter).await
    }

    pub async fn get(&self, id: ContentId) -> StoreResult<ContentItem> {
        self.store.get(id).await?
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    pub async fn create(&self, mut new: NewContent) -> StoreResult<ContentItem> {
        new.published_at = match new.status {
            ContentStatus::Published => Some(Utc::now()),
            _ => None,
        };
        logged("created", self.store.insert(new).await)
    }

    pub async fn update(&self, id: ContentId, mut changes: ContentChanges) -> StoreResult<ContentItem> {
        if let Some(status) = changes.status {
            changes.published_at = match status {
                ContentStatus::Published => {
                    let current = self.get(id).await?;
                    Some(current.published_at.or_else(|| Some(Utc::now())))
                }
                _ => Some(None),
            };
        }
        logged("updated", self.store.update(id, changes).await)
    }

    pub async fn delete(&self, id: ContentId) -> StoreResult<bool> {
        logged("deleted", self.store.delete(id).await)
    }

    /// Publishes with a fresh timestamp, even when already published.
    pub async fn publish(&self, id: ContentId) -> StoreResult<ContentItem> {
        let changes = ContentChanges {
            status: Some(ContentStatus::Published),
            published_at: Some(Some(Utc::now())),
            ..Default::default()
        };
        logged("published", self.store.update(id, changes).await)
    }

    pub async fn archive(&self, id: ContentId) -> StoreResult<ContentItem> {
        self.update(id, ContentChanges {
            status: Some(ContentStatus::Archived),
            ..Default::default()
        }).await
    }

    /// Copies an item as a new draft. The copy has no link, so a later sync
    /// never matches it.
    pub async fn duplicate(&self, id: ContentId) -> StoreResult<ContentItem> {
        let original = self.get(id).await?;
        let copy = NewContent {
            title: format!("{}{}", original.title, COPY_SUFFIX),
            description: original.description,
            content_type: original.content_type,
            content_html: original.content_html,
            external_url: None,
            thumbnail_url: original.thumbnail_url,
            category: original.category,
            tags: original.tags,
            status: ContentStatus::Draft,
            published_at: None,
            author_id: original.author_id,
            metadata: original.metadata,
        };
        logged("duplicated", self.store.insert(copy).await)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::content::ContentType;
    use crate::store::MemoryStore;

    use super::*;

    fn manager() -> ContentManager {
        ContentManager::new(Arc::new(MemoryStore::new()))
    }

    fn video(status: ContentStatus) -> NewContent {
        video_at(status, "https://youtu.be/demo-day")
    }

    fn video_at(status: ContentStatus, url: &str) -> NewContent {
        NewContent {
            title: "Demo day recap".to_string(),
            description: "Highlights".to_string(),
            content_type: ContentType::Video,
            content_html: None,
            external_url: Some(url.to_string()),
            thumbnail_url: Some("https://img.example.com/demo.png".to_string()),
            category: Some("Startups".to_string()),
            tags: vec!["demo".to_string()],
            status,
            published_at: None,
            author_id: Some("admin".to_string()),
            metadata: json!({"duration": 600}),
        }
    }

    #[tokio::test]
    async fn test_create_stamps_only_published() -> StoreResult<()> {
        let manager = manager();
        let draft = manager.create(video(ContentStatus::Draft)).await?;
        assert_eq!(draft.published_at, None);

        let published = manager.create(video_at(ContentStatus::Published, "https://youtu.be/demo-day-2")).await?;
        assert!(published.published_at.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_status_transitions() -> StoreResult<()> {
        let manager = manager();
        let item = manager.create(video(ContentStatus::Published)).await?;
        let stamp = item.published_at;

        let republished = manager.update(item.id, ContentChanges {
            status: Some(ContentStatus::Published),
            title: Some("Demo day".to_string()),
            ..Default::default()
        }).await?;
        assert_eq!(republished.published_at, stamp);
        assert_eq!(republished.title, "Demo day");

        let archived = manager.archive(item.id).await?;
        assert_eq!(archived.status, ContentStatus::Archived);
        assert_eq!(archived.published_at, None);

        let published = manager.publish(item.id).await?;
        assert!(published.is_published());
        assert!(published.published_at.is_some());

        let untouched = manager.update(item.id, ContentChanges {
            description: Some("New".to_string()),
            ..Default::default()
        }).await?;
        assert_eq!(untouched.published_at, published.published_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate() -> StoreResult<()> {
        let manager = manager();
        let item = manager.create(video(ContentStatus::Published)).await?;

        let copy = manager.duplicate(item.id).await?;
        assert_ne!(copy.id, item.id);
        assert_eq!(copy.title, "Demo day recap (Copy)");
        assert_eq!(copy.status, ContentStatus::Draft);
        assert_eq!(copy.published_at, None);
        assert_eq!(copy.external_url, None);
        assert_eq!(copy.tags, item.tags);
        assert_eq!(copy.metadata, item.metadata);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_all_and_delete() -> StoreResult<()> {
        let manager = manager();
        let first = manager.create(video(ContentStatus::Draft)).await?;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = manager.create(video_at(ContentStatus::Archived, "https://youtu.be/demo-day-2")).await?;

        let ids: Vec<ContentId> = manager.list_all().await?.iter().map(|i| i.id).collect();
        assert_eq!(ids, [second.id, first.id]);

        assert!(manager.delete(first.id).await?);
        assert!(!manager.delete(first.id).await?);
        assert!(matches!(manager.get(first.id).await, Err(StoreError::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_link_belongs_to_one_item() -> StoreResult<()> {
        let manager = manager();
        let item = manager.create(video(ContentStatus::Published)).await?;
        let other = manager.create(video_at(ContentStatus::Draft, "https://youtu.be/keynote")).await?;

        let again = manager.create(video(ContentStatus::Draft)).await;
        assert!(matches!(again, Err(StoreError::Duplicate { field: "external_url", .. })));

        let moved = manager.update(other.id, ContentChanges {
            external_url: Some("https://youtu.be/demo-day".to_string()),
            ..Default::default()
        }).await;
        assert!(matches!(moved, Err(StoreError::Duplicate { .. })));

        let items = manager.list_all().await?;
        assert_eq!(items.len(), 2);
        let owners: Vec<ContentId> = items.iter()
            .filter(|i| i.external_url.as_deref() == Some("https://youtu.be/demo-day"))
            .map(|i| i.id)
            .collect();
        assert_eq!(owners, [item.id]);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_item() {
        let manager = manager();
        assert!(matches!(manager.publish(ContentId::new()).await, Err(StoreError::NotFound { .. })));
        assert!(matches!(manager.duplicate(ContentId::new()).await, Err(StoreError::NotFound { .. })));
    }
}
