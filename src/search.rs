use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::client::{search_url, Fetch};
use crate::error::{SearchError, LOADING_MESSAGE};
use crate::storage::Storage;
use crate::types::{ResultItem, SearchParams};
use crate::validate;

/// Lifecycle of the current search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    /// Nothing submitted yet.
    Idle,
    Loading,
    Error(SearchError),
    /// Validated, non-empty result set.
    Ready(Arc<Vec<ResultItem>>),
}

impl SearchState {
    /// Status line for states that have one.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            SearchState::Loading => Some(LOADING_MESSAGE),
            SearchState::Error(e) => Some(e.user_message()),
            SearchState::Idle | SearchState::Ready(_) => None,
        }
    }

    pub fn items(&self) -> &[ResultItem] {
        match self {
            SearchState::Ready(items) => items.as_slice(),
            _ => &[],
        }
    }
}

/// An accepted SearchParams value. Ids grow with every submission, identical
/// params included, and serve as the query identity downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: u64,
    pub params: SearchParams,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub submission: Option<Submission>,
    pub state: SearchState,
}

struct Session {
    next_id: u64,
    current: Option<Submission>,
    state: SearchState,
}

/// Drives one search at a time: URL construction, fetch (through the cache),
/// validation, and the Idle/Loading/Error/Ready state machine. When searches
/// overlap, only the most recently submitted one may set the state.
pub struct Orchestrator {
    fetcher: Arc<dyn Fetch>,
    cache: Arc<dyn Storage>,
    endpoint: Url,
    cache_ttl_secs: i64,
    session: Mutex<Session>,
}

impl Orchestrator {
    pub fn new(fetcher: Arc<dyn Fetch>, cache: Arc<dyn Storage>, endpoint: Url, cache_ttl_secs: i64) -> Self {
        Self {
            fetcher,
            cache,
            endpoint,
            cache_ttl_secs,
            session: Mutex::new(Session { next_id: 1, current: None, state: SearchState::Idle }),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let session = self.lock();
        Snapshot { submission: session.current.clone(), state: session.state.clone() }
    }

    /// Submit and wait for the outcome. `refresh` skips the cache read.
    pub async fn submit(&self, params: SearchParams, refresh: bool) -> Snapshot {
        let submission = self.begin(params);
        let outcome = self.run(&submission.params, refresh).await;
        self.finish(submission.id, outcome)
    }

    /// Records a new submission and moves to `Loading`.
    pub fn begin(&self, params: SearchParams) -> Submission {
        let mut session = self.lock();
        let submission = Submission { id: session.next_id, params };
        session.next_id += 1;
        session.current = Some(submission.clone());
        session.state = SearchState::Loading;
        submission
    }

    /// Applies an outcome unless a newer submission has replaced `id`.
    pub fn finish(&self, id: u64, outcome: Result<Arc<Vec<ResultItem>>, SearchError>) -> Snapshot {
        let mut session = self.lock();
        if session.current.as_ref().map(|s| s.id) == Some(id) {
            session.state = match outcome {
                Ok(items) => SearchState::Ready(items),
                Err(e) => SearchState::Error(e),
            };
        } else {
            debug!(stale = id, "discarding superseded search result");
        }
        Snapshot { submission: session.current.clone(), state: session.state.clone() }
    }

    async fn run(&self, params: &SearchParams, refresh: bool) -> Result<Arc<Vec<ResultItem>>, SearchError> {
        let url = search_url(&self.endpoint, params);
        let raw = self.fetch_cached(params, &url, refresh).await?;
        let response = validate::decode(&raw).map_err(|e| {
            validate::log_rejection(&e, &raw);
            SearchError::from(e)
        })?;
        if response.collection.items.is_empty() {
            info!(keywords = %params.keywords, media_type = %params.media_type, "search returned no results");
            return Err(SearchError::Empty);
        }
        Ok(Arc::new(response.collection.items))
    }

    // Only bodies that arrived with a success status are cached; validation
    // runs again on every read.
    async fn fetch_cached(&self, params: &SearchParams, url: &Url, refresh: bool) -> Result<Value, SearchError> {
        let key = params.cache_key();
        let now = current_epoch();
        if !refresh {
            match self.cache.get_cache(&key, now).await {
                Ok(Some(payload)) => match serde_json::from_str::<Value>(&payload) {
                    Ok(raw) => {
                        debug!(key = %key, "search cache hit");
                        return Ok(raw);
                    }
                    Err(e) => debug!(key = %key, error = %e, "unreadable cached payload"),
                },
                Ok(None) => debug!(key = %key, "search cache miss"),
                Err(e) => debug!(key = %key, error = %e, "search cache read failed"),
            }
        }

        let raw = self.fetcher.fetch_json(url).await.inspect_err(|e| {
            let status = match e {
                SearchError::Status { status, .. } => Some(*status),
                _ => None,
            };
            warn!(url = %url, status = ?status, error = %e, "archive request failed");
        })?;

        if let Ok(payload) = serde_json::to_string(&raw) {
            if let Err(e) = self.cache.put_cache(&key, &payload, now + self.cache_ttl_secs).await {
                debug!(error = %e, "search cache write failed");
            }
        }
        Ok(raw)
    }

    fn lock(&self) -> MutexGuard<'_, Session> { self.session.lock().unwrap_or_else(|e| e.into_inner()) }
}

fn current_epoch() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::error::{GENERIC_MESSAGE, NO_RESULTS_MESSAGE};
    use crate::storage::MemoryCache;
    use crate::types::MediaType;

    /// Canned responses keyed by the `keywords` query parameter.
    struct StubFetch {
        responses: HashMap<String, (u64, Result<Value, SearchError>)>,
        calls: AtomicUsize,
    }

    impl StubFetch {
        fn new(entries: Vec<(&str, u64, Result<Value, SearchError>)>) -> Self {
            let responses = entries.into_iter().map(|(k, d, r)| (k.to_string(), (d, r))).collect();
            Self { responses, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl Fetch for StubFetch {
        async fn fetch_json(&self, url: &Url) -> Result<Value, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let keywords = url.query_pairs().find(|(k, _)| k == "keywords").map(|(_, v)| v.into_owned()).unwrap_or_default();
            let (delay, outcome) = self.responses.get(&keywords).cloned().expect("unexpected query");
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            outcome
        }
    }

    fn items(n: usize, prefix: &str) -> Value {
        let list: Vec<Value> = (0..n)
            .map(|i| json!({ "href": "h", "data": [{ "title": format!("{prefix} {i}"), "media_type": "image" }], "links": [{ "href": "a.jpg" }] }))
            .collect();
        json!({ "collection": { "items": list } })
    }

    fn orchestrator(fetch: Arc<StubFetch>) -> Orchestrator {
        let endpoint = Url::parse("http://archive.test/search").unwrap();
        Orchestrator::new(fetch, Arc::new(MemoryCache::new(8)), endpoint, 300)
    }

    fn params(keywords: &str) -> SearchParams { SearchParams::new(keywords, MediaType::Image, None) }

    #[tokio::test]
    async fn starts_idle() {
        let orch = orchestrator(Arc::new(StubFetch::new(vec![])));
        let snap = orch.snapshot();
        assert_eq!(snap.state, SearchState::Idle);
        assert!(snap.submission.is_none());
        assert_eq!(snap.state.message(), None);
    }

    #[tokio::test]
    async fn valid_results_become_ready() {
        let orch = orchestrator(Arc::new(StubFetch::new(vec![("apollo", 0, Ok(items(25, "apollo")))])));
        let snap = orch.submit(params("apollo"), false).await;
        assert_eq!(snap.state.items().len(), 25);
        assert_eq!(snap.state.items()[0].title(), "apollo 0");
        assert_eq!(snap.submission.unwrap().params.keywords, "apollo");
    }

    #[tokio::test]
    async fn begin_moves_to_loading() {
        let orch = orchestrator(Arc::new(StubFetch::new(vec![])));
        let sub = orch.begin(params("apollo"));
        let snap = orch.snapshot();
        assert_eq!(snap.state, SearchState::Loading);
        assert_eq!(snap.state.message(), Some(LOADING_MESSAGE));
        assert_eq!(snap.submission, Some(sub));
    }

    #[tokio::test]
    async fn empty_collection_is_no_results() {
        let orch = orchestrator(Arc::new(StubFetch::new(vec![("void", 0, Ok(json!({ "collection": { "items": [] } })))])));
        let snap = orch.submit(params("void"), false).await;
        assert_eq!(snap.state, SearchState::Error(SearchError::Empty));
        assert_eq!(snap.state.message(), Some(NO_RESULTS_MESSAGE));
    }

    #[tokio::test]
    async fn missing_collection_is_generic_error() {
        let orch = orchestrator(Arc::new(StubFetch::new(vec![("odd", 0, Ok(json!({ "error": "oops" })))])));
        let snap = orch.submit(params("odd"), false).await;
        let SearchState::Error(SearchError::Validation(v)) = &snap.state else {
            panic!("expected validation error, got {:?}", snap.state);
        };
        assert!(v.violations.contains(&"Missing 'collection' property".to_string()));
        assert_eq!(snap.state.message(), Some(GENERIC_MESSAGE));
    }

    #[tokio::test]
    async fn http_failure_is_not_retried() {
        let fetch = Arc::new(StubFetch::new(vec![(
            "down",
            0,
            Err(SearchError::Status { url: "http://archive.test/search".into(), status: 503 }),
        )]));
        let orch = orchestrator(fetch.clone());
        let snap = orch.submit(params("down"), false).await;
        assert_eq!(snap.state.message(), Some(GENERIC_MESSAGE));
        assert_eq!(fetch.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn later_submission_wins_over_slow_earlier_one() {
        let fetch = Arc::new(StubFetch::new(vec![
            ("slow", 80, Ok(items(3, "slow"))),
            ("fast", 0, Ok(items(2, "fast"))),
        ]));
        let orch = orchestrator(fetch);
        let (first, second) = tokio::join!(orch.submit(params("slow"), false), orch.submit(params("fast"), false));

        assert_eq!(second.state.items()[0].title(), "fast 0");
        // the slow response arrived last but must not overwrite the newer search
        assert_eq!(first.submission.as_ref().unwrap().params.keywords, "fast");
        let snap = orch.snapshot();
        assert_eq!(snap.state.items().len(), 2);
        assert_eq!(snap.submission.unwrap().params.keywords, "fast");
    }

    #[tokio::test]
    async fn identical_resubmission_gets_new_identity_and_uses_cache() {
        let fetch = Arc::new(StubFetch::new(vec![("moon", 0, Ok(items(4, "moon")))]));
        let orch = orchestrator(fetch.clone());
        let a = orch.submit(params("moon"), false).await;
        let b = orch.submit(params("moon"), false).await;
        assert_ne!(a.submission.unwrap().id, b.submission.unwrap().id);
        assert_eq!(fetch.calls.load(Ordering::SeqCst), 1);

        orch.submit(params("moon"), true).await;
        assert_eq!(fetch.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_requests_are_not_cached() {
        let fetch = Arc::new(StubFetch::new(vec![(
            "down",
            0,
            Err(SearchError::Transport { url: "http://archive.test/search".into(), reason: "refused".into() }),
        )]));
        let orch = orchestrator(fetch.clone());
        orch.submit(params("down"), false).await;
        orch.submit(params("down"), false).await;
        assert_eq!(fetch.calls.load(Ordering::SeqCst), 2);
    }

    struct BrokenCache;

    #[async_trait]
    impl Storage for BrokenCache {
        async fn get_cache(&self, _key: &str, _now: i64) -> anyhow::Result<Option<String>> {
            Err(anyhow::anyhow!("cache offline"))
        }
        async fn put_cache(&self, _key: &str, _payload: &str, _expires_at: i64) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("cache offline"))
        }
        async fn clear_cache(&self) -> anyhow::Result<u64> { Ok(0) }
    }

    #[tokio::test]
    async fn cache_failures_fall_through_to_fetch() {
        let fetch = Arc::new(StubFetch::new(vec![("apollo", 0, Ok(items(3, "apollo")))]));
        let endpoint = Url::parse("http://archive.test/search").unwrap();
        let orch = Orchestrator::new(fetch.clone(), Arc::new(BrokenCache), endpoint, 300);
        assert_eq!(orch.submit(params("apollo"), false).await.state.items().len(), 3);
        assert_eq!(orch.submit(params("apollo"), false).await.state.items().len(), 3);
        assert_eq!(fetch.calls.load(Ordering::SeqCst), 2);
    }
}
