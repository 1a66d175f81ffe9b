//! Persistence for content items and newsletter subscribers.
//!
//! The traits only promise point lookups, single inserts and single
//! updates. Nothing spans a lookup and the write that follows it, so two
//! concurrent writers matching the same key resolve as last write wins.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::content::{ContentChanges, ContentId, ContentItem, ContentStatus, ContentType, NewContent};
use crate::error::{StoreError, StoreResult};

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentOrder {
    /// Newest `published_at` first, unpublished last.
    #[default]
    PublishedDesc,
    CreatedDesc,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentFilter {
    pub status: Option<ContentStatus>,
    pub content_type: Option<ContentType>,
    pub category: Option<String>,
    pub order: ContentOrder,
}

impl ContentFilter {
    pub fn published() -> Self {
        ContentFilter {
            status: Some(ContentStatus::Published),
            ..Default::default()
        }
    }

    pub fn matches(&self, item: &ContentItem) -> bool {
        if let Some(status) = self.status {
            if item.status != status {
                return false;
            }
        }
        if let Some(content_type) = self.content_type {
            if item.content_type != content_type {
                return false;
            }
        }
        if let Some(ref category) = self.category {
            if item.category.as_ref() != Some(category) {
                return false;
            }
        }
        true
    }

    pub fn compare(&self, a: &ContentItem, b: &ContentItem) -> Ordering {
        match self.order {
            ContentOrder::PublishedDesc => b.published_at.cmp(&a.published_at)
                .then_with(|| b.created_at.cmp(&a.created_at)),
            ContentOrder::CreatedDesc => b.created_at.cmp(&a.created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get(&self, id: ContentId) -> StoreResult<Option<ContentItem>>;

    async fn find_by_external_url(&self, url: &str) -> StoreResult<Option<ContentItem>>;

    async fn insert(&self, new: NewContent) -> StoreResult<ContentItem>;

    async fn update(&self, id: ContentId, changes: ContentChanges) -> StoreResult<ContentItem>;

    /// Updates the first record whose `external_url` equals `url`.
    async fn update_by_external_url(&self, url: &str, changes: ContentChanges) -> StoreResult<ContentItem>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: ContentId) -> StoreResult<bool>;

    async fn list(&self, filter: &ContentFilter) -> StoreResult<Vec<ContentItem>>;
}

#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Fails with `StoreError::Duplicate` when the address is already present.
    async fn add_subscriber(&self, email: &str) -> StoreResult<Subscriber>;

    async fn subscribers(&self) -> StoreResult<Vec<Subscriber>>;
}

/// Everything the stores keep. `JsonFileStore` writes it out as one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub content: Vec<ContentItem>,
    #[serde(default)]
    pub subscribers: Vec<Subscriber>,
}

impl StoreData {
    pub fn get(&self, id: ContentId) -> Option<ContentItem> {
        self.content.iter().find(|item| item.id == id).cloned()
    }

    pub fn find_by_external_url(&self, url: &str) -> Option<ContentItem> {
        self.content.iter()
            .find(|item| item.external_url.as_deref() == Some(url))
            .cloned()
    }

    /// `external_url` is the natural key: no two records may share one.
    fn check_url_free(&self, url: Option<&str>, owner: Option<ContentId>) -> StoreResult<()> {
        let Some(url) = url.map(str::trim).filter(|url| !url.is_empty()) else {
            return Ok(());
        };
        let taken = self.content.iter()
            .any(|item| item.external_url.as_deref() == Some(url) && Some(item.id) != owner);
        if taken {
            return Err(StoreError::Duplicate { field: "external_url", value: url.to_string() });
        }
        Ok(())
    }

    pub fn insert(&mut self, new: NewContent, now: DateTime<Utc>) -> StoreResult<ContentItem> {
        self.check_url_free(new.external_url.as_deref(), None)?;
        let item = ContentItem::from_new(new, now);
        self.content.push(item.clone());
        Ok(item)
    }

    fn update_at(&mut self, index: usize, changes: ContentChanges, now: DateTime<Utc>) -> StoreResult<ContentItem> {
        self.check_url_free(changes.external_url.as_deref(), Some(self.content[index].id))?;
        let item = &mut self.content[index];
        item.apply(changes, now);
        Ok(item.clone())
    }

    pub fn update(&mut self, id: ContentId, changes: ContentChanges, now: DateTime<Utc>) -> StoreResult<ContentItem> {
        let index = self.content.iter()
            .position(|item| item.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        self.update_at(index, changes, now)
    }

    pub fn update_by_external_url(&mut self, url: &str, changes: ContentChanges, now: DateTime<Utc>) -> StoreResult<ContentItem> {
        let index = self.content.iter()
            .position(|item| item.external_url.as_deref() == Some(url))
            .ok_or_else(|| StoreError::NotFound { id: url.to_string() })?;
        self.update_at(index, changes, now)
    }

    pub fn delete(&mut self, id: ContentId) -> bool {
        let before = self.content.len();
        self.content.retain(|item| item.id != id);
        self.content.len() != before
    }

    pub fn list(&self, filter: &ContentFilter) -> Vec<ContentItem> {
        let mut items: Vec<ContentItem> = self.content.iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();
        items.sort_by(|a, b| filter.compare(a, b));
        items
    }

    pub fn add_subscriber(&mut self, email: &str, now: DateTime<Utc>) -> StoreResult<Subscriber> {
        let email = email.trim().to_lowercase();
        if self.subscribers.iter().any(|s| s.email == email) {
            return Err(StoreError::Duplicate { field: "email", value: email });
        }
        let subscriber = Subscriber {
            email,
            subscribed_at: now,
        };
        self.subscribers.push(subscriber.clone());
        Ok(subscriber)
    }
}

/// One backend seen through both traits.
#[derive(Clone)]
pub struct Stores {
    pub content: Arc<dyn ContentStore>,
    pub subscribers: Arc<dyn SubscriberStore>,
}

impl Stores {
    pub fn shared<S: ContentStore + SubscriberStore + 'static>(store: S) -> Self {
        let store = Arc::new(store);
        Stores {
            content: store.clone(),
            subscribers: store,
        }
    }
}

/// The JSON file store when a data file is configured, memory otherwise.
pub fn open_stores(config: &config::Store) -> StoreResult<Stores> {
    match config.data_file {
        Some(ref path) => Ok(Stores::shared(JsonFileStore::open(path)?)),
        None => Ok(Stores::shared(MemoryStore::new())),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use serde_json::Value;

    use super::*;

    fn new_content(title: &str, content_type: ContentType, category: &str, status: ContentStatus) -> NewContent {
        NewContent {
            title: title.to_string(),
            description: String::new(),
            content_type,
            content_html: None,
            external_url: Some(format!("https://example.com/{}", title)),
            thumbnail_url: None,
            category: Some(category.to_string()),
            tags: vec![],
            status,
            published_at: None,
            author_id: None,
            metadata: Value::Null,
        }
    }

    #[test]
    fn test_list_filters_and_orders() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut data = StoreData::default();

        let mut older = new_content("older", ContentType::BlogPost, "Fintech", ContentStatus::Published);
        older.published_at = Some(t0);
        let mut newer = new_content("newer", ContentType::BlogPost, "Fintech", ContentStatus::Published);
        newer.published_at = Some(t0 + Duration::days(3));
        let mut podcast = new_content("podcast", ContentType::Podcast, "Fintech", ContentStatus::Published);
        podcast.published_at = Some(t0 + Duration::days(1));

        data.insert(older, t0).unwrap();
        data.insert(newer, t0).unwrap();
        data.insert(podcast, t0).unwrap();
        data.insert(new_content("draft", ContentType::BlogPost, "Fintech", ContentStatus::Draft), t0).unwrap();
        data.insert(new_content("web3", ContentType::BlogPost, "Web3", ContentStatus::Published), t0).unwrap();

        let published = data.list(&ContentFilter::published());
        let titles: Vec<&str> = published.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["newer", "podcast", "older", "web3"]);

        let filter = ContentFilter {
            content_type: Some(ContentType::BlogPost),
            category: Some("Fintech".to_string()),
            ..ContentFilter::published()
        };
        let titles: Vec<String> = data.list(&filter).into_iter().map(|i| i.title).collect();
        assert_eq!(titles, ["newer", "older"]);
    }

    #[test]
    fn test_update_by_external_url_keeps_key() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut data = StoreData::default();
        let item = data.insert(new_content("a", ContentType::BlogPost, "Fintech", ContentStatus::Draft), now).unwrap();

        let updated = data.update_by_external_url("https://example.com/a", ContentChanges {
            title: Some("b".to_string()),
            ..Default::default()
        }, now + Duration::hours(1)).unwrap();

        assert_eq!(updated.id, item.id);
        assert_eq!(updated.title, "b");
        assert_eq!(updated.external_url.as_deref(), Some("https://example.com/a"));
        assert_eq!(updated.updated_at, now + Duration::hours(1));

        assert!(matches!(
            data.update_by_external_url("https://example.com/missing", ContentChanges::default(), now),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_external_url_stays_unique() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut data = StoreData::default();
        let a = data.insert(new_content("a", ContentType::BlogPost, "Fintech", ContentStatus::Draft), now).unwrap();
        let b = data.insert(new_content("b", ContentType::BlogPost, "Fintech", ContentStatus::Draft), now).unwrap();

        let res = data.insert(new_content("a", ContentType::Video, "Fintech", ContentStatus::Draft), now);
        assert!(matches!(res, Err(StoreError::Duplicate { field: "external_url", .. })));

        let steal = ContentChanges {
            external_url: Some("https://example.com/a".to_string()),
            ..Default::default()
        };
        assert!(matches!(data.update(b.id, steal.clone(), now), Err(StoreError::Duplicate { .. })));
        assert_eq!(data.get(b.id).unwrap().external_url.as_deref(), Some("https://example.com/b"));

        // Re-sending its own link is fine.
        assert!(data.update(a.id, steal, now).is_ok());

        let mut no_link = new_content("c", ContentType::Book, "Books", ContentStatus::Draft);
        no_link.external_url = None;
        data.insert(no_link.clone(), now).unwrap();
        data.insert(no_link, now).unwrap();
        assert_eq!(data.content.len(), 4);
    }

    #[tokio::test]
    async fn test_shared_stores_see_the_same_data() -> StoreResult<()> {
        let stores = open_stores(&config::Store::default())?;
        stores.subscribers.add_subscriber("a@b.com").await?;
        stores.content.insert(new_content("a", ContentType::Book, "Books", ContentStatus::Draft)).await?;
        assert_eq!(stores.content.list(&ContentFilter::default()).await?.len(), 1);
        assert_eq!(stores.subscribers.subscribers().await?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_subscribers_are_unique_ignoring_case() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut data = StoreData::default();
        data.add_subscriber("Founder@Example.com ", now).unwrap();
        assert!(matches!(data.add_subscriber("founder@example.com", now), Err(StoreError::Duplicate { .. })));
        assert_eq!(data.subscribers.len(), 1);
        assert_eq!(data.subscribers[0].email, "founder@example.com");
    }
}
