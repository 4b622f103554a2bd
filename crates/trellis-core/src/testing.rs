//! Test utilities: request construction and call recording.
//!
//! These helpers back the crate's own tests and are exported for users
//! writing tests against a multiplexer.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::context::{ContextKey, PathParams, RequestContext};
use crate::method::Method;
use crate::middleware::{ArcHandler, Handler};
use crate::request::{Body, Request};
use crate::response::{Response, StatusCode};

/// Fluent builder for [`Request`] values in tests.
///
/// # Example
///
/// ```
/// use trellis_core::testing::RequestBuilder;
///
/// let req = RequestBuilder::get("/users/42")
///     .header("accept", "application/json")
///     .build();
/// assert_eq!(req.path(), "/users/42");
/// ```
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    path: String,
    query: Option<String>,
    headers: Vec<(String, Vec<u8>)>,
    body: Body,
}

impl RequestBuilder {
    /// Starts a request with the given method and path.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    /// Starts a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Starts a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Sets the query string.
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = Body::Bytes(bytes.into());
        self
    }

    /// Builds the request.
    #[must_use]
    pub fn build(self) -> Request {
        let mut req = Request::new(self.method, self.path);
        req.set_query(self.query);
        for (name, value) in self.headers {
            req.headers_mut().insert(name, value);
        }
        req.set_body(self.body);
        req
    }
}

/// One observed handler invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Path of the dispatched request.
    pub path: String,
    /// Request id assigned by the multiplexer.
    pub request_id: u64,
    /// Parameters visible under the recorder's context key, if configured.
    pub params: PathParams,
}

/// A handler that records every invocation.
///
/// The Rust counterpart of a mock handler plus a response recorder: tests
/// register it as an endpoint, dispatch requests, then assert on the calls
/// it observed. Clones share the same call log.
#[derive(Debug, Clone)]
pub struct RecordingHandler {
    status: StatusCode,
    key: Option<ContextKey>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl RecordingHandler {
    /// Creates a recorder responding with the given status.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            key: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a recorder responding 200 OK.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// Also records the parameters stored under `key`.
    #[must_use]
    pub fn with_key(mut self, key: ContextKey) -> Self {
        self.key = Some(key);
        self
    }

    /// Wraps this recorder as a shared handler.
    #[must_use]
    pub fn handler(&self) -> ArcHandler {
        Arc::new(self.clone())
    }

    /// Snapshots the observed calls, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of observed calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Handler for RecordingHandler {
    fn call(&self, ctx: &RequestContext, req: &mut Request) -> Response {
        self.calls.lock().push(RecordedCall {
            path: req.path().to_string(),
            request_id: ctx.request_id(),
            params: self.key.map(|key| ctx.params(key)).unwrap_or_default(),
        });
        Response::new(self.status)
    }
}
