//! Radix tree with placeholder captures.
//!
//! This crate provides the compressed prefix tree behind the trellis
//! multiplexer. Values are stored under byte-string keys; chains of
//! single-child nodes are merged into multi-byte edge labels, so lookups
//! touch at most one node per shared prefix.
//!
//! # Features
//!
//! - Incremental insertion with edge splitting
//! - Dynamic segments via a configurable placeholder byte (`:` by default)
//! - Priority-ordered sibling traversal (most-used branches are tried first)
//! - Diagnostic rendering of the whole tree via [`Display`](std::fmt::Display)
//!
//! # Example
//!
//! ```
//! use trellis_radix::Tree;
//!
//! let mut tree = Tree::new();
//! tree.add("/users/:id", 1);
//!
//! let found = tree.find("/users/42").unwrap();
//! assert_eq!(*found.value, 1);
//! assert_eq!(found.captures.get("id"), Some("42"));
//! ```

#![forbid(unsafe_code)]

mod node;
mod tree;

pub use tree::{Captures, Found, Tree};

/// Default placeholder marker for dynamic segments.
pub const PLACEHOLDER: u8 = b':';

/// Default segment delimiter.
pub const DELIMITER: u8 = b'/';
