//! Core types and traits for trellis.
//!
//! This crate provides the building blocks the multiplexer is assembled
//! from:
//!
//! - [`Request`], [`Response`] and [`Method`]
//! - [`RequestContext`] and [`ContextKey`] for parameter delivery
//! - The [`Handler`] trait plus middleware chaining
//! - Structured logging for configuration-time diagnostics
//! - Test tooling ([`testing`])
//!
//! # Design Principles
//!
//! - Handlers are plain synchronous functions; dispatch is pure in-memory
//!   work with no suspension points
//! - All shared types are `Send + Sync`
//! - Per-request state is exclusively owned by that request

#![forbid(unsafe_code)]

mod context;
pub mod logging;
mod method;
mod middleware;
mod request;
mod response;
pub mod testing;

pub use context::{ContextKey, PathParams, RequestContext};
pub use logging::{LogEntry, LogLevel, Logger};
pub use method::{Method, MethodParseError};
pub use middleware::{ArcHandler, Handler, Middleware, chain, handler_fn, middleware};
pub use request::{Body, Headers, Request};
pub use response::{Response, StatusCode};
