pub mod client;
pub mod config;
pub mod describe;
pub mod error;
pub mod media;
pub mod pager;
pub mod render;
pub mod search;
pub mod storage;
pub mod types;
pub mod validate;
pub mod view;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{SearchError, ValidationError};
    pub use crate::media::{RenderPlan, VideoStage};
    pub use crate::search::{SearchState, Snapshot, Submission};
    pub use crate::types::{MediaType, ResultItem, SearchParams};
    pub use crate::view::{ItemView, ResultsView, ViewAction};
    pub use crate::Stargaze;
}

use std::sync::Arc;

use anyhow::Result;

use crate::client::{ArchiveClient, Fetch};
use crate::config::Config;
use crate::pager::PageState;
use crate::search::{Orchestrator, Snapshot};
use crate::storage::{MemoryCache, Storage};
use crate::types::SearchParams;
use crate::view::ResultsView;

/// Archive search session: HTTP client, response cache and the orchestrator.
pub struct Stargaze {
    config: Config,
    cache: Arc<MemoryCache>,
    orchestrator: Orchestrator,
}

impl Stargaze {
    /// Build a session that talks to the configured endpoint over HTTP.
    pub fn new(config: Config) -> Result<Self> {
        let client = ArchiveClient::new(config.request_timeout())?;
        Self::from_parts(config, Arc::new(client))
    }

    /// Build a session around any transport.
    pub fn from_parts(config: Config, fetcher: Arc<dyn Fetch>) -> Result<Self> {
        let endpoint = config.endpoint_url()?;
        let cache = Arc::new(MemoryCache::new(config.cache_capacity));
        let orchestrator = Orchestrator::new(fetcher, cache.clone(), endpoint, config.cache_ttl_secs);
        Ok(Self { config, cache, orchestrator })
    }

    /// Submit a search; `refresh` skips the cache for this request.
    pub async fn search(&self, params: SearchParams, refresh: bool) -> Snapshot {
        self.orchestrator.submit(params, refresh).await
    }

    pub fn snapshot(&self) -> Snapshot { self.orchestrator.snapshot() }

    /// Drop all cached responses. Returns how many were removed.
    pub async fn clear_cache(&self) -> Result<u64> { self.cache.clear_cache().await }

    pub fn cached_responses(&self) -> usize { self.cache.len() }

    pub fn config(&self) -> &Config { &self.config }

    /// Fresh view-model sized from the config.
    pub fn view(&self) -> ResultsView { ResultsView::new(PageState::default(), self.config.preview_length) }
}
