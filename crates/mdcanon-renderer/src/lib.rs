//! Canonical Markdown re-serializer.
//!
//! Markdown is parsed with pulldown-cmark into an arena [`Document`], then
//! written back out in one normalized form:
//!
//! - ATX headings, `* ` bullets, ordered items numbered from 1
//! - one empty line between top-level blocks, none inside containers
//! - link titles dropped, autolinks written per [`AutolinkStyle`]
//! - fenced code with bare backtick fences, content byte for byte
//! - everything unrecognized copied from the source verbatim
//!
//! # Architecture
//!
//! - [`parse`] / [`parse_str`]: bytes to [`Document`] (nodes reference the
//!   source through byte [`Span`]s)
//! - [`Renderer`]: walks the tree into an [`OutputSink`]
//! - [`Canonicalizer`]: reads a document from a [`Storage`](mdcanon_storage::Storage)
//!   and runs both steps
//!
//! # Example
//!
//! ```
//! use mdcanon_renderer::{ParseOptions, RenderOptions, canonicalize_str};
//!
//! let out = canonicalize_str(
//!     "Title\n=====\n\n- [docs](https://docs.rs \"Docs\")",
//!     &ParseOptions::default(),
//!     &RenderOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(out, "# Title\n\n* [docs](https://docs.rs)");
//! ```

mod canonicalize;
mod error;
mod format;
mod parse;
mod renderer;
mod sink;
mod tree;
mod util;

pub use canonicalize::{Canonicalizer, canonicalize_str};
pub use error::{CanonicalizeError, ParseError, RenderError};
pub use parse::{ParseOptions, parse, parse_str};
pub use renderer::{AutolinkStyle, DEFAULT_MAX_DEPTH, RenderOptions, Renderer};
pub use sink::OutputSink;
pub use tree::{Document, DocumentBuilder, Node, NodeId, NodeKind, Span};
