//! Request context for propagating inbound request metadata
//!
//! This module provides a `RequestContext` struct that carries the metadata
//! of the inbound HTTP request (request id, query string) into the outbound
//! call. The chaos decision logic reads the override marker from it.
//!
//! # Examples
//!
//! ```
//! use application::RequestContext;
//!
//! let ctx = RequestContext::new().with_query_param("user", "test");
//!
//! assert_eq!(ctx.query_param("User"), Some("test"));
//! assert!(!ctx.request_id().is_nil());
//! ```

use uuid::Uuid;

/// Metadata of a single inbound request
///
/// Created by the HTTP layer once per inbound request and shared read-only
/// with every outbound attempt it triggers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    query: Vec<(String, String)>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    /// Create a new request context
    ///
    /// Generates a new time-ordered request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(Uuid::now_v7())
    }

    /// Create a request context with a specific request ID
    ///
    /// Useful when the request ID is provided by an upstream service
    /// or needs to be correlated with external systems.
    ///
    /// # Examples
    ///
    /// ```
    /// use application::RequestContext;
    /// use uuid::Uuid;
    ///
    /// let request_id = Uuid::new_v4();
    /// let ctx = RequestContext::with_request_id(request_id);
    /// assert_eq!(ctx.request_id(), request_id);
    /// ```
    #[must_use]
    pub fn with_request_id(request_id: Uuid) -> Self {
        Self {
            request_id,
            query: Vec::new(),
        }
    }

    /// Replace the query parameters
    ///
    /// Pairs are kept in order, repeated keys included.
    #[must_use]
    pub fn with_query(mut self, query: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query = query.into_iter().collect();
        self
    }

    /// Append a single query parameter
    #[must_use]
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Get the unique request identifier
    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// All values given for `key`, matched ASCII case-insensitively
    pub fn query_values<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> {
        self.query
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a query parameter of the inbound request
    ///
    /// Keys match ASCII case-insensitively. Returns `None` when the key is
    /// absent or was given more than once.
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<&str> {
        let mut values = self.query_values(key);
        let first = values.next()?;
        values.next().is_none().then_some(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_unique_request_id() {
        let ctx1 = RequestContext::new();
        let ctx2 = RequestContext::new();

        assert_ne!(ctx1.request_id(), ctx2.request_id());
    }

    #[test]
    fn query_param_lookup() {
        let query = vec![("user".to_string(), "test".to_string())];
        let ctx = RequestContext::new().with_query(query);

        assert_eq!(ctx.query_param("user"), Some("test"));
        assert_eq!(ctx.query_param("other"), None);
    }

    #[test]
    fn query_keys_ignore_ascii_case() {
        let ctx = RequestContext::new().with_query_param("User", "test");

        assert_eq!(ctx.query_param("user"), Some("test"));
        assert_eq!(ctx.query_param("USER"), Some("test"));
    }

    #[test]
    fn repeated_key_keeps_every_value() {
        let ctx = RequestContext::new()
            .with_query_param("user", "alice")
            .with_query_param("USER", "test");

        assert_eq!(ctx.query_values("user").collect::<Vec<_>>(), ["alice", "test"]);
        assert_eq!(ctx.query_param("user"), None);
    }

    #[test]
    fn debug_format_contains_fields() {
        let ctx = RequestContext::new();
        let debug = format!("{ctx:?}");

        assert!(debug.contains("RequestContext"));
        assert!(debug.contains("request_id"));
        assert!(debug.contains("query"));
    }
}
