//! Arena document model consumed by the renderer.
//!
//! Nodes live in a flat `Vec` owned by [`Document`] and refer to each other
//! by [`NodeId`]. Text is never copied out of the source: nodes carry byte
//! [`Span`]s that are resolved through [`Document::resolve`] at render time.

use std::ops::Range;
use std::sync::Arc;

use crate::error::RenderError;

/// Index of a node within a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The root node ID (always 0).
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Half-open byte range into the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// What a node represents.
///
/// The set is closed: anything the parser produces that has no dedicated
/// variant becomes [`NodeKind::Block`] or [`NodeKind::Inline`] and is copied
/// from the source verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Root of the tree.
    Document,
    /// ATX or setext heading, level 1-6.
    Heading { level: u8 },
    Paragraph,
    List { ordered: bool },
    ListItem,
    Blockquote,
    /// Fenced code; one span per content line, newline included.
    FencedCodeBlock { lines: Vec<Span> },
    /// Inline or reference link. The title is kept for completeness but is
    /// never rendered.
    Link {
        destination: String,
        title: Option<String>,
    },
    /// `<scheme:...>` or `<user@host>` autolink.
    AutoLink { url: String },
    /// Inline text; content is the node span.
    Text,
    /// Inline content with no verbatim counterpart in the source.
    StringLiteral(String),
    Table,
    /// A table row. The header row is the one followed by the separator line.
    TableRow { header: bool },
    TableCell,
    /// Unrecognized block construct, copied line by line.
    Block { lines: Vec<Span> },
    /// Unrecognized inline construct. Delimiters come from the source, children
    /// are rendered normally.
    Inline,
}

impl NodeKind {
    /// Whether the node is a block-level construct.
    #[must_use]
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Self::Document
                | Self::Heading { .. }
                | Self::Paragraph
                | Self::List { .. }
                | Self::ListItem
                | Self::Blockquote
                | Self::FencedCodeBlock { .. }
                | Self::Table
                | Self::TableRow { .. }
                | Self::Block { .. }
        )
    }

    /// Short name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Heading { .. } => "heading",
            Self::Paragraph => "paragraph",
            Self::List { .. } => "list",
            Self::ListItem => "list_item",
            Self::Blockquote => "blockquote",
            Self::FencedCodeBlock { .. } => "fenced_code_block",
            Self::Link { .. } => "link",
            Self::AutoLink { .. } => "autolink",
            Self::Text => "text",
            Self::StringLiteral(_) => "string",
            Self::Table => "table",
            Self::TableRow { .. } => "table_row",
            Self::TableCell => "table_cell",
            Self::Block { .. } => "block",
            Self::Inline => "inline",
        }
    }
}

/// A node in the document arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// Source bytes covered by the whole construct, markers included.
    pub span: Span,
    children: Vec<NodeId>,
}

impl Node {
    /// Children in document order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Immutable parsed document: source buffer plus node arena.
///
/// The source is reference counted so that a document can be handed to
/// another thread without copying the text.
#[derive(Debug, Clone)]
pub struct Document {
    source: Arc<str>,
    nodes: Vec<Node>,
}

impl Document {
    /// The root node ID.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Children of a node; empty for unknown IDs.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or_default()
    }

    /// Total number of nodes, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The full source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Resolve a span to source text.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::SpanOutOfBounds`] if the span does not fit the
    /// source, or [`RenderError::SpanNotCharBoundary`] if it splits a UTF-8
    /// sequence.
    pub fn resolve(&self, span: Span) -> Result<&str, RenderError> {
        if span.start > span.end || span.end > self.source.len() {
            return Err(RenderError::SpanOutOfBounds {
                start: span.start,
                end: span.end,
                len: self.source.len(),
            });
        }
        self.source
            .get(span.range())
            .ok_or(RenderError::SpanNotCharBoundary {
                start: span.start,
                end: span.end,
            })
    }

    /// Concatenated text of all `Text` and `StringLiteral` descendants of a
    /// node, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if a descendant span cannot be resolved.
    pub fn text_content(&self, id: NodeId) -> Result<String, RenderError> {
        let mut text = String::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();

        while let Some(current) = stack.pop() {
            let node = self.node(current).ok_or(RenderError::UnknownNode(current))?;
            match &node.kind {
                NodeKind::Text => text.push_str(self.resolve(node.span)?),
                NodeKind::StringLiteral(value) => text.push_str(value),
                _ => stack.extend(node.children.iter().rev()),
            }
        }

        Ok(text)
    }
}

/// Incremental construction of a [`Document`].
///
/// Nodes are appended to their parent in call order, which becomes document
/// order. The root `Document` node exists from the start and spans the whole
/// source.
#[derive(Debug)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    /// Start a document over the given source.
    #[must_use]
    pub fn new(source: impl Into<Arc<str>>) -> Self {
        let source = source.into();
        let root = Node {
            kind: NodeKind::Document,
            span: Span::new(0, source.len()),
            children: Vec::new(),
        };
        Self {
            document: Document {
                source,
                nodes: vec![root],
            },
        }
    }

    /// Source the document is built over.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.document.source
    }

    /// Append a new node as the last child of `parent`.
    ///
    /// An unknown `parent` leaves the node detached; rendering never reaches it.
    pub fn push(&mut self, parent: NodeId, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.document.nodes.len());
        self.document.nodes.push(Node {
            kind,
            span,
            children: Vec::new(),
        });
        if let Some(parent) = self.document.nodes.get_mut(parent.0) {
            parent.children.push(id);
        }
        id
    }

    /// Get a node by ID.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.document.node(id)
    }

    /// Mutable access to a node's kind, used to fill line spans of code and
    /// passthrough blocks as their content arrives.
    pub fn kind_mut(&mut self, id: NodeId) -> Option<&mut NodeKind> {
        self.document.nodes.get_mut(id.0).map(|node| &mut node.kind)
    }

    /// Finish construction.
    #[must_use]
    pub fn finish(self) -> Document {
        self.document
    }
}
