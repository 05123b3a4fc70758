//! Error taxonomy for a single search.
//!
//! Every variant is recoverable: the orchestrator stores it in its `Error`
//! state and the presentation layer shows [`SearchError::user_message`].

/// Shown for transport and validation failures.
pub const GENERIC_MESSAGE: &str = "Oops, something went wrong";
/// Shown when a valid response contains no items.
pub const NO_RESULTS_MESSAGE: &str = "Results not found. Try broadening your search.";
/// Shown while a request is in flight.
pub const LOADING_MESSAGE: &str = "Loading results, please wait...";

/// Structural problems found in an archive response, in detection order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid archive response: {}", .violations.join("; "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The request never produced a response.
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The archive answered with a non-success status.
    #[error("HTTP error {status} for URL: {url}")]
    Status { url: String, status: u16 },

    /// The body was not JSON.
    #[error("response from {url} is not valid JSON: {reason}")]
    Decode { url: String, reason: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no results found")]
    Empty,
}

impl SearchError {
    pub fn is_no_results(&self) -> bool { matches!(self, SearchError::Empty) }

    pub fn user_message(&self) -> &'static str {
        if self.is_no_results() { NO_RESULTS_MESSAGE } else { GENERIC_MESSAGE }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_empty_maps_to_no_results() {
        assert_eq!(SearchError::Empty.user_message(), NO_RESULTS_MESSAGE);
        let status = SearchError::Status { url: "http://x/search".into(), status: 500 };
        assert_eq!(status.user_message(), GENERIC_MESSAGE);
        let invalid = SearchError::from(ValidationError { violations: vec!["Missing 'collection' property".into()] });
        assert_eq!(invalid.user_message(), GENERIC_MESSAGE);
    }

    #[test]
    fn validation_display_lists_every_violation() {
        let e = ValidationError { violations: vec!["a".into(), "b".into()] };
        assert_eq!(e.to_string(), "invalid archive response: a; b");
    }
}
