//! Tree walker that turns a [`Document`] into canonical Markdown.

use crate::error::RenderError;
use crate::sink::OutputSink;
use crate::tree::{Document, Node, NodeId, NodeKind};

/// Default nesting limit for [`RenderOptions::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// How autolinks (`<https://example.com>`) are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AutolinkStyle {
    /// The bare URL, with no delimiters.
    #[default]
    Bare,
    /// An inline link with empty text: `[](url)`.
    Bracketed,
    /// Angle-bracket autolink syntax: `<url>`.
    Angle,
}

impl AutolinkStyle {
    /// Config and CLI spelling of the style.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bare => "bare",
            Self::Bracketed => "bracketed",
            Self::Angle => "angle",
        }
    }
}

/// Renderer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub autolink: AutolinkStyle,
    /// Deepest node nesting accepted before rendering fails.
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            autolink: AutolinkStyle::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Canonical Markdown renderer.
///
/// Stateless apart from its options; one renderer can serve any number of
/// documents, from any number of threads.
///
/// # Example
///
/// ```
/// use mdcanon_renderer::{AutolinkStyle, ParseOptions, Renderer, parse_str};
///
/// let doc = parse_str("- one\n- two", &ParseOptions::default());
/// let out = Renderer::new()
///     .with_autolink(AutolinkStyle::Angle)
///     .render_to_string(&doc)
///     .unwrap();
///
/// assert_eq!(out, "* one\n* two");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    /// Create a renderer with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Set how autolinks are written.
    #[must_use]
    pub fn with_autolink(mut self, style: AutolinkStyle) -> Self {
        self.options.autolink = style;
        self
    }

    /// Set the nesting limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.options.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render the whole document into `sink`.
    ///
    /// Output is not trimmed; use [`render_to_string`](Self::render_to_string)
    /// for the final text.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the tree nests deeper than
    /// [`RenderOptions::max_depth`] or a node span cannot be resolved.
    pub fn render(&self, document: &Document, sink: &mut OutputSink) -> Result<(), RenderError> {
        RenderPass {
            document,
            options: &self.options,
            single_line: false,
        }
        .node(document.root(), sink, 0)
    }

    /// Render the document and trim surrounding whitespace.
    ///
    /// # Errors
    ///
    /// See [`render`](Self::render).
    pub fn render_to_string(&self, document: &Document) -> Result<String, RenderError> {
        let mut sink = OutputSink::with_capacity(document.source().len());
        self.render(document, &mut sink)?;
        Ok(sink.finish())
    }
}

/// One rendering traversal over a document.
///
/// Node formatters live in [`crate::format`].
#[derive(Clone, Copy)]
pub(crate) struct RenderPass<'a> {
    pub(crate) document: &'a Document,
    pub(crate) options: &'a RenderOptions,
    /// Line breaks render as spaces, as inside a heading.
    pub(crate) single_line: bool,
}

impl RenderPass<'_> {
    /// Render one node and its subtree.
    pub(crate) fn node(
        &self,
        id: NodeId,
        sink: &mut OutputSink,
        depth: usize,
    ) -> Result<(), RenderError> {
        if depth > self.options.max_depth {
            return Err(RenderError::NestingTooDeep {
                limit: self.options.max_depth,
            });
        }
        let node = self.lookup(id)?;

        match &node.kind {
            NodeKind::Document => self.document_body(node, sink, depth),
            NodeKind::Heading { level } => self.heading(*level, node, sink, depth),
            NodeKind::Paragraph => self.paragraph(node, sink, depth),
            NodeKind::List { ordered } => self.list(*ordered, node, sink, depth),
            NodeKind::ListItem | NodeKind::TableCell => self.children(node, sink, depth),
            NodeKind::Blockquote => self.blockquote(node, sink, depth),
            NodeKind::FencedCodeBlock { lines } => self.fenced_code(lines, sink),
            NodeKind::Link { destination, .. } => self.link(id, destination, sink),
            NodeKind::AutoLink { url } => {
                self.autolink(url, sink);
                Ok(())
            }
            NodeKind::Text => {
                sink.push_str(self.document.resolve(node.span)?);
                Ok(())
            }
            NodeKind::StringLiteral(value) => {
                if self.single_line && value.ends_with('\n') {
                    sink.push(' ');
                } else {
                    sink.push_str(value);
                }
                Ok(())
            }
            NodeKind::Table => self.table(node, sink, depth),
            NodeKind::TableRow { header } => self.table_row(*header, node, sink, depth),
            NodeKind::Block { lines } => self.passthrough_block(node, lines, sink),
            NodeKind::Inline => self.passthrough_inline(node, sink, depth),
        }
    }

    /// Render children in order. A block child that follows inline content
    /// starts on a fresh line. A verbatim block is separated from its
    /// siblings by an empty line.
    pub(crate) fn children(
        &self,
        node: &Node,
        sink: &mut OutputSink,
        depth: usize,
    ) -> Result<(), RenderError> {
        let mut after_verbatim = false;
        for &child in node.children() {
            let kind = &self.lookup(child)?.kind;
            let verbatim = matches!(kind, NodeKind::Block { .. });
            if kind.is_block() {
                if !sink.is_empty() && (verbatim || after_verbatim) {
                    sink.blank_line();
                } else {
                    sink.ensure_newline();
                }
            }
            after_verbatim = verbatim;
            self.node(child, sink, depth + 1)?;
        }
        Ok(())
    }

    pub(crate) fn lookup(&self, id: NodeId) -> Result<&Node, RenderError> {
        self.document.node(id).ok_or(RenderError::UnknownNode(id))
    }
}
