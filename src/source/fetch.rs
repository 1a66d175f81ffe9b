use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use spdlog::debug;

use crate::error::SourceError;

/// GET a URL and decode the body as JSON.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value, SourceError>;
}

pub struct ReqwestFetch {
    client: reqwest::Client,
}

impl ReqwestFetch {
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("outlier-content/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SourceError::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetch {
    async fn get_json(&self, url: &str) -> Result<Value, SourceError> {
        debug!("GET {}", url);
        let resp = self.client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| SourceError::Http { url: url.to_string(), source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text()
            .await
            .map_err(|source| SourceError::Http { url: url.to_string(), source })?;
        serde_json::from_str(&body)
            .map_err(|source| SourceError::Json { url: url.to_string(), source })
    }
}
