//! trellis — an HTTP request multiplexer with radix-tree dispatch.
//!
//! Routes live in one compressed prefix tree per HTTP method, so resolving
//! a path touches at most one node per shared prefix regardless of how many
//! routes are registered. Dynamic segments are captured as named parameters
//! and delivered to handlers through a request-scoped context.
//!
//! - **Radix-tree dispatch** — sub-linear lookup with edge splitting on
//!   insertion
//! - **Named parameters** — `/users/:id` captures `id`; the marker byte is
//!   configurable
//! - **Middleware chains** — per-route composition, first-declared runs
//!   first, short-circuiting by not calling the next handler
//! - **Sub-routers** — share the parent's routing tables, prepend its mount
//!   path, inherit a snapshot of its middleware
//!
//! # Quick Start
//!
//! ```
//! use trellis::{ContextKey, Mux, Response};
//! use trellis::testing::RequestBuilder;
//!
//! let key = ContextKey::new("params");
//! let mux = Mux::new("/", key);
//!
//! mux.get("/ping", |_ctx, _req| Response::ok().body_text("pong"));
//! mux.get("/greet/:name", move |ctx, _req| {
//!     let name = ctx.params(key).get("name").unwrap_or("world").to_string();
//!     Response::ok().body_text(format!("hello, {name}"))
//! });
//!
//! let mut req = RequestBuilder::get("/greet/gopher").build();
//! let res = mux.dispatch(&mut req);
//! assert_eq!(res.body().as_bytes(), b"hello, gopher");
//! ```
//!
//! # Sub-routing
//!
//! ```
//! use trellis::{ContextKey, Mux, Response};
//! use trellis::testing::RequestBuilder;
//!
//! let mux = Mux::new("/api", ContextKey::new("params"));
//! let v1 = mux.router("/v1");
//! v1.get("/ping", |_ctx, _req| Response::ok());
//!
//! // The sub-router registered into the shared tables, so the parent
//! // resolves the route too.
//! let mut req = RequestBuilder::get("/api/v1/ping").build();
//! assert!(mux.dispatch(&mut req).status().is_success());
//! ```
//!
//! # Crate Structure
//!
//! - [`trellis_core`] — core types (Request, Response, context, middleware)
//! - [`trellis_radix`] — the radix tree
//! - this crate — the [`Mux`] tying them together
//!
//! Registration is expected to finish, single-threaded, before serving
//! begins; dispatch is then safe to run concurrently. The shared routing
//! tables are lock-guarded, so late registration is possible, but routes
//! appear atomically rather than being coordinated with in-flight requests.

#![forbid(unsafe_code)]

mod mux;

pub use mux::Mux;

// Re-export crates
pub use trellis_core as core;
pub use trellis_radix as radix;

// Re-export commonly used types
pub use trellis_core::{
    ArcHandler, Body, ContextKey, Handler, Headers, LogEntry, LogLevel, Logger, Method,
    MethodParseError, Middleware, PathParams, Request, RequestContext, Response, StatusCode,
    chain, handler_fn, middleware,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        ContextKey, Handler, Method, Middleware, Mux, PathParams, Request, RequestContext,
        Response, StatusCode, handler_fn, middleware,
    };
}

/// Testing utilities module.
pub mod testing {
    pub use trellis_core::testing::{RecordedCall, RecordingHandler, RequestBuilder};
}
