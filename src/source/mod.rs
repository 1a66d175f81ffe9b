use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use spdlog::{debug, info, warn};

use crate::category::CategoryEntry;
use crate::config::Source;
use crate::error::{SourceError, SyncError};
use crate::source::endpoint::{default_category_endpoints, default_post_endpoints, Endpoint};
use crate::source::fetch::{HttpFetch, ReqwestFetch};

pub mod endpoint;
pub mod fetch;
pub mod payload;
pub mod post;

/// The external blog, seen as two collections.
#[async_trait]
pub trait BlogSource: Send + Sync {
    /// Raw post entries in source order. Fails with `SourceUnavailable` when
    /// no endpoint variant produced recognizable posts.
    async fn fetch_posts(&self) -> Result<Vec<Value>, SyncError>;

    /// The category directory. Fails with `CategoryUnavailable`.
    async fn fetch_categories(&self) -> Result<Vec<CategoryEntry>, SyncError>;
}

pub struct WordPressSource<F = ReqwestFetch> {
    fetch: F,
    posts_endpoints: Vec<Endpoint>,
    categories_endpoints: Vec<Endpoint>,
    max_pages: u32,
}

impl WordPressSource<ReqwestFetch> {
    pub fn from_config(source: &Source) -> Result<Self, SourceError> {
        let fetch = ReqwestFetch::new(Duration::from_secs(source.timeout_secs))?;
        let posts_endpoints = if source.posts_endpoints.is_empty() {
            default_post_endpoints(&source.site, source.per_page)?
        } else {
            source.posts_endpoints.clone()
        };
        let categories_endpoints = if source.categories_endpoints.is_empty() {
            default_category_endpoints(&source.site, source.per_page)?
        } else {
            source.categories_endpoints.clone()
        };
        Ok(WordPressSource::new(fetch, posts_endpoints, categories_endpoints, source.max_pages))
    }
}

fn looks_like_post(entry: &Value) -> bool {
    post::SourcePost::from_value(entry).is_ok()
}

impl<F: HttpFetch> WordPressSource<F> {
    pub fn new(fetch: F, posts_endpoints: Vec<Endpoint>, categories_endpoints: Vec<Endpoint>, max_pages: u32) -> Self {
        WordPressSource {
            fetch,
            posts_endpoints,
            categories_endpoints,
            max_pages: max_pages.max(1),
        }
    }

    async fn fetch_entries(&self, endpoint: &Endpoint, container: &str, page: u32) -> Result<Vec<Value>, SourceError> {
        let url = endpoint.page_url(page)?;
        let payload = self.fetch.get_json(&url).await?;
        endpoint.shape
            .entries(payload, container)
            .ok_or(SourceError::Unrecognized { url })
    }

    async fn remaining_pages(&self, endpoint: &Endpoint, posts: &mut Vec<Value>) {
        for page in 2..=self.max_pages {
            match self.fetch_entries(endpoint, "posts", page).await {
                Ok(more) if !more.is_empty() => posts.extend(more),
                Ok(_) => break,
                Err(e) => {
                    debug!("Stopping pagination at page {}: {}", page, e);
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl<F: HttpFetch> BlogSource for WordPressSource<F> {
    async fn fetch_posts(&self) -> Result<Vec<Value>, SyncError> {
        let mut attempts = vec![];

        for endpoint in self.posts_endpoints.iter() {
            let attempt = match self.fetch_entries(endpoint, "posts", 1).await {
                Ok(entries) if entries.is_empty() => format!("{}: no posts", endpoint.url),
                Ok(entries) if !entries.iter().any(looks_like_post) => format!("{}: no recognizable posts", endpoint.url),
                Ok(mut posts) => {
                    self.remaining_pages(endpoint, &mut posts).await;
                    info!("Fetched {} posts from {}", posts.len(), endpoint.url);
                    return Ok(posts);
                }
                Err(e) => e.to_string(),
            };
            warn!("Posts endpoint skipped: {}", attempt);
            attempts.push(attempt);
        }

        Err(SyncError::SourceUnavailable { resource: "posts", attempts })
    }

    async fn fetch_categories(&self) -> Result<Vec<CategoryEntry>, SyncError> {
        let mut attempts = vec![];

        for endpoint in self.categories_endpoints.iter() {
            let attempt = match self.fetch_entries(endpoint, "categories", 1).await {
                Ok(entries) => {
                    let categories: Vec<CategoryEntry> = entries.into_iter()
                        .filter_map(|entry| serde_json::from_value(entry).ok())
                        .collect();
                    if !categories.is_empty() {
                        info!("Fetched {} categories from {}", categories.len(), endpoint.url);
                        return Ok(categories);
                    }
                    format!("{}: no categories", endpoint.url)
                }
                Err(e) => e.to_string(),
            };
            warn!("Categories endpoint skipped: {}", attempt);
            attempts.push(attempt);
        }

        Err(SyncError::CategoryUnavailable { attempts })
    }
}
