//! Request-scoped context and parameter delivery.
//!
//! The multiplexer extracts path parameters during the trie walk and needs
//! to hand them to an arbitrary downstream handler without a direct
//! call-return channel. [`RequestContext`] is that channel: a per-request
//! value the multiplexer fills under its configured [`ContextKey`] and the
//! handler reads back with a typed accessor.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// An identifier under which one multiplexer stores its parameters.
///
/// Keys are compared by name. Pick a name unique to the application so two
/// multiplexers sharing a context cannot clobber each other's parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextKey {
    name: &'static str,
}

impl ContextKey {
    /// Creates a key.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty. Parameter delivery depends on the key, so
    /// a missing name is a configuration error surfaced at setup, never at
    /// request time.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        assert!(!name.is_empty(), "context key name must not be empty");
        Self { name }
    }

    /// The key's name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.name
    }
}

/// Path parameters captured for one request.
///
/// Pairs are kept in capture order. The literal substrings of the path are
/// stored as-is; percent-decoding is the transport layer's concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    items: Vec<(String, String)>,
}

impl PathParams {
    /// Creates an empty parameter map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.items.push((name.into(), value.into()));
    }

    /// Returns the value captured under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over `(name, value)` pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no parameter was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Serialize for PathParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for (name, value) in &self.items {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Per-request context carrying extracted path parameters.
///
/// Each dispatch builds a fresh context owned by that request; nothing is
/// shared across requests.
#[derive(Debug, Default)]
pub struct RequestContext {
    request_id: u64,
    params: HashMap<ContextKey, PathParams>,
}

impl RequestContext {
    /// Creates a context for one request.
    #[must_use]
    pub fn new(request_id: u64) -> Self {
        Self {
            request_id,
            params: HashMap::new(),
        }
    }

    /// A per-multiplexer sequence number, useful in logs.
    #[must_use]
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Stores parameters under `key`, replacing any previous set.
    pub fn set_params(&mut self, key: ContextKey, params: PathParams) {
        self.params.insert(key, params);
    }

    /// Returns the parameters stored under `key`.
    ///
    /// Returns an empty map when none were set; this accessor never fails.
    #[must_use]
    pub fn params(&self, key: ContextKey) -> PathParams {
        self.params.get(&key).cloned().unwrap_or_default()
    }

    /// Returns a single parameter stored under `key`.
    #[must_use]
    pub fn param(&self, key: ContextKey, name: &str) -> Option<&str> {
        self.params.get(&key).and_then(|params| params.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "context key name must not be empty")]
    fn empty_key_name_fails_at_setup() {
        let _ = ContextKey::new("");
    }

    #[test]
    fn params_accessor_never_fails() {
        let ctx = RequestContext::new(1);
        let key = ContextKey::new("params");
        assert!(ctx.params(key).is_empty());
        assert_eq!(ctx.param(key, "id"), None);
    }

    #[test]
    fn params_round_trip_through_the_context() {
        let key = ContextKey::new("params");
        let mut params = PathParams::new();
        params.insert("id", "42");
        params.insert("section", "news");

        let mut ctx = RequestContext::new(9);
        ctx.set_params(key, params);

        assert_eq!(ctx.request_id(), 9);
        assert_eq!(ctx.param(key, "id"), Some("42"));
        assert_eq!(ctx.param(key, "section"), Some("news"));
        assert_eq!(ctx.params(key).len(), 2);

        // A different key sees nothing.
        let other = ContextKey::new("other");
        assert!(ctx.params(other).is_empty());
    }

    #[test]
    fn path_params_serialize_as_a_map() {
        let mut params = PathParams::new();
        params.insert("id", "42");
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"id":"42"}"#);
    }
}
