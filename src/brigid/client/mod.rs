//! # Remote Access Layer
//!
//! Everything above this module talks to the remote API through the [`ApiClient`]
//! trait. The trait is deliberately small: one method per HTTP verb the remote
//! exposes, plus [`ApiClient::action`] for the `POST <resource>/<id>/<action>/`
//! endpoints (import, sync).
//!
//! ## Implementations
//!
//! - [`http::HttpClient`]: production transport over `reqwest`'s blocking client.
//!   One request per call, bearer auth, per-request timeout, no retries.
//! - [`memory::InMemoryClient`]: an in-process fake used by tests. It records every
//!   call so tests can assert that an operation made no remote request at all.
//!
//! ## Error Vocabulary
//!
//! Implementations translate HTTP statuses into [`ClientError`]: 404 is
//! [`ClientError::NotFound`], a 400 carrying a field map is [`ClientError::Invalid`],
//! every other non-success status is [`ClientError::Failed`]. The command layer then
//! maps these onto [`crate::error::BrigidError`] with the object name attached.

use crate::model::FieldErrors;
use serde_json::Value;
use thiserror::Error;

pub mod http;
pub mod memory;

/// Ordered request parameters. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.push((key.into(), value.into()));
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Query {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut query = Query::new();
        for (k, v) in iter {
            query.push(k, v);
        }
        query
    }
}

/// One page of a list response.
///
/// `count` is the server's total when it sent a paginated envelope; a bare array
/// carries no total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub results: Vec<Value>,
    pub count: Option<usize>,
}

impl Page {
    /// Server-reported total, else the size of this page.
    pub fn total(&self) -> usize {
        self.count.unwrap_or(self.results.len())
    }
}

/// Outcome of an action endpoint. Import endpoints distinguish 201 (created) from
/// 200 (updated), so the status is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResponse {
    pub status: u16,
    pub body: Value,
}

impl ActionResponse {
    pub fn created(&self) -> bool {
        self.status == 201
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    NotFound(String),

    #[error("Invalid request")]
    Invalid(FieldErrors),

    #[error("Request failed ({status}): {message}")]
    Failed {
        status: u16,
        message: String,
        errors: FieldErrors,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Abstract interface to the remote REST API.
///
/// `path` is the resource's URL segment (`software`, `releases`); implementations add
/// the base URL and trailing slashes.
pub trait ApiClient {
    /// List records matching `query`. An empty result is not an error.
    fn list(&self, path: &str, query: &Query) -> ClientResult<Page>;

    fn retrieve(&self, path: &str, id: i64, query: &Query) -> ClientResult<Value>;

    fn create(&mut self, path: &str, body: &Value) -> ClientResult<Value>;

    fn partial_update(&mut self, path: &str, id: i64, body: &Value) -> ClientResult<Value>;

    fn delete(&mut self, path: &str, id: i64) -> ClientResult<()>;

    /// `POST <path>/<action>/` or, with an id, `POST <path>/<id>/<action>/`.
    fn action(
        &mut self,
        path: &str,
        id: Option<i64>,
        action: &str,
        body: &Value,
    ) -> ClientResult<ActionResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_keeps_insertion_order_and_duplicates() {
        let query = Query::new()
            .with("limit", "100")
            .with("expand", "release.software")
            .with("limit", "5");
        assert_eq!(query.get("limit"), Some("100"));
        assert_eq!(query.params().len(), 3);
        assert_eq!(query.params()[1].0, "expand");
    }

    #[test]
    fn query_from_pairs() {
        let query: Query = vec![("machine_name", "brigid")].into_iter().collect();
        assert_eq!(query.get("machine_name"), Some("brigid"));
        assert!(Query::new().is_empty());
    }
}
