//! Pulls posts from the blog source and reconciles them into the content store.
//!
//! Each post is keyed by its link: a link already in the store updates that
//! record, otherwise a new one is inserted. A run over an unchanged source
//! leaves the store as it was, apart from `updated_at`. Fields edited by hand
//! on a synced record are overwritten by the next run.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use spdlog::{error, info, warn};

use crate::category::CategoryTable;
use crate::config;
use crate::error::{SourceError, SyncError};
use crate::source::post::SourcePost;
use crate::source::{BlogSource, WordPressSource};
use crate::store::ContentStore;

pub mod normalize;

use normalize::normalize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub success_count: usize,
    pub error_count: usize,
    pub total_posts: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reconciled {
    Inserted,
    Updated,
}

pub struct ContentSync {
    source: Arc<dyn BlogSource>,
    store: Arc<dyn ContentStore>,
    fallback: CategoryTable,
    excerpt_length: usize,
}

impl ContentSync {
    pub fn new(source: Arc<dyn BlogSource>, store: Arc<dyn ContentStore>, fallback: CategoryTable, excerpt_length: usize) -> Self {
        ContentSync {
            source,
            store,
            fallback,
            excerpt_length,
        }
    }

    /// WordPress source and fallback categories from the `[source]` section.
    pub fn from_config(config: &config::Source, store: Arc<dyn ContentStore>) -> Result<Self, SourceError> {
        let source = WordPressSource::from_config(config)?;
        Ok(ContentSync::new(Arc::new(source), store, config.fallback_table(), config.excerpt_length))
    }

    /// Runs one full pass. Fails only when no posts could be fetched, in which
    /// case nothing was written. Per-post failures are counted in the report.
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        info!("Starting content sync");

        let posts = self.source.fetch_posts().await?;
        let categories = match self.source.fetch_categories().await {
            Ok(entries) => CategoryTable::from_entries(entries),
            Err(e) => {
                warn!("{}. Using fallback categories", e);
                CategoryTable::new()
            }
        };

        info!("Found {} posts to process", posts.len());
        let mut report = SyncReport {
            total_posts: posts.len(),
            ..Default::default()
        };
        let (mut inserted, mut updated) = (0, 0);

        for entry in posts.iter() {
            match self.sync_post(entry, &categories).await {
                Ok(Reconciled::Inserted) => inserted += 1,
                Ok(Reconciled::Updated) => updated += 1,
                Err(e) => {
                    error!("Error processing post {}: {}", post_label(entry), e);
                    report.error_count += 1;
                    continue;
                }
            }
            report.success_count += 1;
        }

        info!("Sync completed. Success: {} ({} new, {} updated), Errors: {}",
            report.success_count, inserted, updated, report.error_count);
        Ok(report)
    }

    async fn sync_post(&self, entry: &Value, categories: &CategoryTable) -> Result<Reconciled, SyncError> {
        let post = SourcePost::from_value(entry)?;
        let content = normalize(&post, categories, &self.fallback, self.excerpt_length)?;

        let url = content.external_url.clone();
        let reconcile = |source| SyncError::Reconcile { url: url.clone(), source };

        let existing = self.store.find_by_external_url(&url).await.map_err(reconcile)?;
        if existing.is_some() {
            info!("Updating existing post: {}", content.title);
            self.store.update_by_external_url(&url, content.into_changes()).await.map_err(reconcile)?;
            Ok(Reconciled::Updated)
        } else {
            info!("Inserting new post: {}", content.title);
            self.store.insert(content.into_new_content()).await.map_err(reconcile)?;
            Ok(Reconciled::Inserted)
        }
    }
}

fn post_label(entry: &Value) -> String {
    let mut id = "<unidentified>".to_string();
    for key in ["link", "URL", "id", "ID"] {
        match entry.get(key) {
            Some(Value::String(s)) => { id = s.clone(); break; }
            Some(Value::Number(n)) => { id = n.to_string(); break; }
            _ => {}
        }
    }
    let title = entry.get("title")
        .and_then(|t| t.get("rendered").or(Some(t)))
        .and_then(|t| t.as_str());
    match title {
        Some(title) => format!("'{}' ({})", title, id),
        None => id,
    }
}

/// Body returned by the sync trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<SyncReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<SyncReport, SyncError>> for SyncResponse {
    fn from(result: Result<SyncReport, SyncError>) -> Self {
        match result {
            Ok(report) => SyncResponse {
                success: true,
                message: Some(format!("Successfully processed {} posts with {} errors",
                    report.success_count, report.error_count)),
                stats: Some(report),
                error: None,
            },
            Err(e) => SyncResponse {
                success: false,
                message: None,
                stats: None,
                error: Some(e.to_string()),
            },
        }
    }
}
