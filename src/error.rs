use std::io;

use thiserror::Error;

/// Failures talking to the external blog.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unrecognized payload from {url}")]
    Unrecognized { url: String },

    #[error("invalid endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),
}

/// Failures of the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("content not found: {id}")]
    NotFound { id: String },

    #[error("duplicate {field}: {value}")]
    Duplicate { field: &'static str, value: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Errors raised by a sync run.
///
/// Only `SourceUnavailable` ever leaves [`crate::sync::ContentSync::run`]. The other
/// variants are absorbed by the run: category failures degrade to the fallback
/// table, per-post failures end up in the error tally.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no {resource} endpoint returned usable data (tried: {})", attempts.join("; "))]
    SourceUnavailable {
        resource: &'static str,
        attempts: Vec<String>,
    },

    #[error("categories unavailable (tried: {})", attempts.join("; "))]
    CategoryUnavailable { attempts: Vec<String> },

    #[error("malformed post: {reason}")]
    MalformedPost { reason: String },

    #[error("could not reconcile {url}: {source}")]
    Reconcile {
        url: String,
        #[source]
        source: StoreError,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;
