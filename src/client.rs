//! Transport for archive searches.
//!
//! The orchestrator builds the request URL with [`search_url`] and hands it to
//! a [`Fetch`] implementation. [`ArchiveClient`] is the HTTP one.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::SearchError;
use crate::types::SearchParams;

const USER_AGENT: &str = concat!("stargaze/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait Fetch: Send + Sync {
    /// GET `url` and decode the body as JSON. No retries.
    async fn fetch_json(&self, url: &Url) -> Result<Value, SearchError>;
}

/// `{endpoint}?keywords=..&media_type=..&year_start=..`
pub fn search_url(endpoint: &Url, params: &SearchParams) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("keywords", &params.keywords)
        .append_pair("media_type", params.media_type.as_str())
        .append_pair("year_start", &params.year_start.to_string());
    url
}

pub struct ArchiveClient {
    http: reqwest::Client,
}

impl ArchiveClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("building HTTP client")?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Fetch for ArchiveClient {
    async fn fetch_json(&self, url: &Url) -> Result<Value, SearchError> {
        debug!(url = %url, "archive search request");
        let resp = self
            .http
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| SearchError::Transport { url: url.to_string(), reason: e.to_string() })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SearchError::Status { url: url.to_string(), status: status.as_u16() });
        }
        let body = resp
            .bytes()
            .await
            .map_err(|e| SearchError::Transport { url: url.to_string(), reason: e.to_string() })?;
        serde_json::from_slice(&body).map_err(|e| SearchError::Decode { url: url.to_string(), reason: e.to_string() })
    }
}
