//! Structural validation of archive responses.
//!
//! [`decode`] either yields a typed [`SearchResponse`] or the full list of
//! violations. A response is accepted or rejected as a whole; invalid items are
//! never dropped or repaired.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::ValidationError;
use crate::types::SearchResponse;

pub fn decode(raw: &Value) -> Result<SearchResponse, ValidationError> {
    let violations = violations(raw);
    if !violations.is_empty() {
        return Err(ValidationError { violations });
    }
    SearchResponse::deserialize(raw)
        .map_err(|e| ValidationError { violations: vec![format!("Undecodable response: {}", e)] })
}

/// Boolean gate over [`decode`]; logs the violations when it rejects.
pub fn validate(raw: &Value) -> bool {
    match decode(raw) {
        Ok(_) => true,
        Err(e) => {
            log_rejection(&e, raw);
            false
        }
    }
}

pub(crate) fn log_rejection(e: &ValidationError, raw: &Value) {
    error!(errors = ?e.violations, "Validation errors");
    debug!(received = %raw, "rejected archive response");
}

fn violations(raw: &Value) -> Vec<String> {
    let mut out = Vec::new();

    if raw.is_null() {
        out.push("Data is null or undefined".to_string());
    } else if !raw.is_object() {
        out.push("Data is not an object".to_string());
    }

    let collection = raw.get("collection").filter(|c| !c.is_null());
    if collection.is_none() {
        out.push("Missing 'collection' property".to_string());
    }

    let Some(items) = collection.and_then(|c| c.get("items")).and_then(Value::as_array) else {
        out.push("'items' is not an array".to_string());
        return out;
    };

    for (index, item) in items.iter().enumerate() {
        match item.get("data").and_then(Value::as_array).filter(|d| !d.is_empty()) {
            None => out.push(format!("Item {}: Missing or empty 'data' array", index)),
            Some(data) => {
                if !data[0].get("title").is_some_and(Value::is_string) {
                    out.push(format!("Item {}: Invalid or missing title", index));
                }
            }
        }
    }
    out
}
