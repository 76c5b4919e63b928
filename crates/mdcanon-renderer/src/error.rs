//! Error types for parsing, rendering and canonicalization.

use std::path::PathBuf;

use mdcanon_storage::StorageError;

use crate::tree::NodeId;

/// Errors produced while turning raw bytes into a [`Document`](crate::Document).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The source is not valid UTF-8.
    #[error("Source is not valid UTF-8 (invalid byte at offset {valid_up_to})")]
    InvalidUtf8 { valid_up_to: usize },
}

/// Errors produced while rendering a document.
///
/// Documents built by [`parse`](crate::parse) never trigger the span errors;
/// they guard trees assembled by hand with [`DocumentBuilder`](crate::DocumentBuilder).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// A node span reaches past the end of the source.
    #[error("Span {start}..{end} is outside the source ({len} bytes)")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },
    /// A node span cuts through a multi-byte character.
    #[error("Span {start}..{end} does not fall on character boundaries")]
    SpanNotCharBoundary { start: usize, end: usize },
    /// The tree is nested deeper than the configured limit.
    #[error("Document nesting exceeds {limit} levels")]
    NestingTooDeep { limit: usize },
    /// A child reference points outside the arena.
    #[error("Node {} is not part of the document", .0.index())]
    UnknownNode(NodeId),
}

/// Errors from the locator-to-text pipeline.
///
/// Every variant carries the locator of the failing document.
#[derive(Debug, thiserror::Error)]
pub enum CanonicalizeError {
    #[error("Error reading file {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    #[error("Error parsing file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Error rendering file {}: {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: RenderError,
    },
}

impl CanonicalizeError {
    /// Locator of the document that failed.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::SourceRead { path, .. } | Self::Parse { path, .. } | Self::Render { path, .. } => {
                path
            }
        }
    }
}
