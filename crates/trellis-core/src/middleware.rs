//! Handlers and the middleware chain.
//!
//! A middleware is an adapter from a handler to a handler. Chaining wraps
//! the endpoint right-to-left, so the first-declared middleware sees the
//! request first. A middleware short-circuits simply by producing a
//! response without invoking the next handler.

use std::sync::Arc;

use crate::context::RequestContext;
use crate::request::Request;
use crate::response::Response;

/// Handles one request, producing a response.
///
/// Handlers are shared across worker threads, hence `Send + Sync`; calls
/// borrow them immutably, so per-request state belongs in the request or
/// the context, not the handler.
pub trait Handler: Send + Sync {
    /// Handles one request.
    fn call(&self, ctx: &RequestContext, req: &mut Request) -> Response;
}

impl<F> Handler for F
where
    F: Fn(&RequestContext, &mut Request) -> Response + Send + Sync,
{
    fn call(&self, ctx: &RequestContext, req: &mut Request) -> Response {
        self(ctx, req)
    }
}

/// A shared, type-erased handler.
pub type ArcHandler = Arc<dyn Handler>;

/// Wraps a plain function or closure as an [`ArcHandler`].
pub fn handler_fn<F>(f: F) -> ArcHandler
where
    F: Fn(&RequestContext, &mut Request) -> Response + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A middleware adapter: given the next handler, returns the wrapping one.
pub type Middleware = Arc<dyn Fn(ArcHandler) -> ArcHandler + Send + Sync>;

/// Wraps a closure as a [`Middleware`].
pub fn middleware<F>(f: F) -> Middleware
where
    F: Fn(ArcHandler) -> ArcHandler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Composes `fns` around `endpoint` into a single handler.
///
/// The first middleware in the slice becomes the outermost wrapper and
/// therefore runs first. The composed handler is immutable; changing the
/// middleware list later does not affect chains already built.
#[must_use]
pub fn chain(fns: &[Middleware], endpoint: ArcHandler) -> ArcHandler {
    fns.iter().rev().fold(endpoint, |next, mw| mw(next))
}
