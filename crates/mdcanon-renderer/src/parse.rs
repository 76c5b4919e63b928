//! Build a [`Document`] from Markdown source with pulldown-cmark.
//!
//! The parser's offset iterator is folded into the arena with an explicit
//! stack of open containers, so arbitrarily deep input never recurses here.
//! Text nodes keep the exact source bytes pulldown-cmark points at; backslash
//! escapes and entity references therefore survive rendering unchanged.

use std::ops::Range;

use pulldown_cmark::{CodeBlockKind, Event, LinkType, Options, Parser, Tag};

use crate::error::ParseError;
use crate::tree::{Document, DocumentBuilder, NodeId, NodeKind, Span};
use crate::util::{LinePrefix, container_lines, heading_level_to_num, line_start, skip_prefixes};

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Recognize GitHub-flavored tables and strikethrough.
    pub gfm: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { gfm: true }
    }
}

impl ParseOptions {
    /// Toggle GitHub-flavored extensions.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// pulldown-cmark options for this configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
        } else {
            Options::empty()
        }
    }
}

/// Parse raw bytes into a document.
///
/// # Errors
///
/// Returns [`ParseError::InvalidUtf8`] if `bytes` is not valid UTF-8.
pub fn parse(bytes: &[u8], options: &ParseOptions) -> Result<Document, ParseError> {
    let source = std::str::from_utf8(bytes).map_err(|e| ParseError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })?;
    Ok(parse_str(source, options))
}

/// Parse Markdown text into a document.
#[must_use]
pub fn parse_str(source: &str, options: &ParseOptions) -> Document {
    let mut builder = TreeBuilder::new(source);
    for (event, range) in Parser::new_ext(source, options.parser_options()).into_offset_iter() {
        builder.event(event, range);
    }

    let document = builder.finish();
    tracing::debug!(
        bytes = source.len(),
        nodes = document.node_count(),
        "Parsed document"
    );
    document
}

/// Folds pulldown-cmark events into a [`DocumentBuilder`].
struct TreeBuilder<'src> {
    source: &'src str,
    builder: DocumentBuilder,
    /// Open containers; the root is never popped.
    stack: Vec<NodeId>,
    /// Line prefix of each open container, parallel to `stack`.
    prefixes: Vec<LinePrefix>,
    /// Nesting depth inside a block that is copied verbatim. Events inside
    /// it are dropped.
    opaque_depth: usize,
    /// End of the furthest inline construct seen so far.
    inline_end: usize,
}

impl<'src> TreeBuilder<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            builder: DocumentBuilder::new(source),
            stack: vec![NodeId::ROOT],
            prefixes: vec![LinePrefix::None],
            opaque_depth: 0,
            inline_end: 0,
        }
    }

    fn finish(mut self) -> Document {
        while self.stack.len() > 1 {
            self.close();
        }
        self.builder.finish()
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(NodeId::ROOT)
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        let span = Span::from(range);

        if self.opaque_depth > 0 {
            match event {
                Event::Start(_) => self.opaque_depth += 1,
                Event::End(_) => {
                    self.opaque_depth -= 1;
                    if self.opaque_depth == 0 {
                        self.close();
                    }
                }
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start(tag, span),
            Event::End(_) => self.close(),
            Event::Text(_) => self.text(span),
            Event::Html(_) => self.html(span),
            Event::Code(_) => self.code(span),
            Event::InlineHtml(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_)
            | Event::FootnoteReference(_)
            | Event::TaskListMarker(_) => {
                self.leaf(NodeKind::Inline, span);
            }
            Event::SoftBreak => {
                self.leaf(NodeKind::StringLiteral("\n".to_owned()), span);
            }
            Event::HardBreak => {
                self.leaf(NodeKind::StringLiteral("\\\n".to_owned()), span);
            }
            Event::Rule => {
                let lines = container_lines(self.source, span, &self.prefixes);
                self.builder
                    .push(self.current(), NodeKind::Block { lines }, span);
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>, span: Span) {
        let kind = match tag {
            Tag::Paragraph => NodeKind::Paragraph,
            Tag::Heading { level, .. } => NodeKind::Heading {
                level: heading_level_to_num(level),
            },
            Tag::BlockQuote(_) => NodeKind::Blockquote,
            Tag::CodeBlock(CodeBlockKind::Fenced(_)) => NodeKind::FencedCodeBlock {
                lines: Vec::new(),
            },
            Tag::CodeBlock(CodeBlockKind::Indented) | Tag::HtmlBlock => NodeKind::Block {
                lines: Vec::new(),
            },
            Tag::List(start) => NodeKind::List {
                ordered: start.is_some(),
            },
            Tag::Item => NodeKind::ListItem,
            Tag::Table(_) => NodeKind::Table,
            Tag::TableHead => NodeKind::TableRow { header: true },
            Tag::TableRow => NodeKind::TableRow { header: false },
            Tag::TableCell => NodeKind::TableCell,
            Tag::Link {
                link_type: LinkType::Autolink | LinkType::Email,
                dest_url,
                ..
            } => NodeKind::AutoLink {
                url: dest_url.into_string(),
            },
            Tag::Link {
                dest_url, title, ..
            } => NodeKind::Link {
                destination: dest_url.into_string(),
                title: (!title.is_empty()).then(|| title.into_string()),
            },
            Tag::Emphasis
            | Tag::Strong
            | Tag::Strikethrough
            | Tag::Superscript
            | Tag::Subscript
            | Tag::Image { .. } => NodeKind::Inline,
            Tag::FootnoteDefinition(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::MetadataBlock(_) => {
                self.opaque_depth = 1;
                NodeKind::Block { lines: Vec::new() }
            }
        };

        let prefix = match kind {
            NodeKind::Blockquote => LinePrefix::Quote,
            NodeKind::ListItem => self.item_prefix(span),
            _ => LinePrefix::None,
        };

        let id = self.builder.push(self.current(), kind, span);
        self.stack.push(id);
        self.prefixes.push(prefix);
    }

    /// Content position and continuation indent of a list item whose span
    /// starts at (or just before) its marker.
    fn item_prefix(&self, span: Span) -> LinePrefix {
        let bytes = self.source.as_bytes();
        let mut marker = span.start;
        while bytes.get(marker) == Some(&b' ') {
            marker += 1;
        }

        let digits = bytes
            .get(marker..)
            .unwrap_or_default()
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        let marker_len = match bytes.get(marker + digits) {
            Some(b'.' | b')') if digits > 0 => digits + 1,
            Some(b'-' | b'+' | b'*') if digits == 0 => 1,
            _ => return LinePrefix::None,
        };

        let after = marker + marker_len;
        let spaces = bytes
            .get(after..)
            .unwrap_or_default()
            .iter()
            .take_while(|&&b| b == b' ')
            .count();
        let blank = matches!(bytes.get(after + spaces), None | Some(b'\n' | b'\r'));
        let gap = if blank || !(1..=4).contains(&spaces) {
            1
        } else {
            spaces
        };

        let line = line_start(self.source, marker);
        let outer = skip_prefixes(self.source, line, marker, &self.prefixes);
        let lead = bytes
            .get(outer..marker)
            .filter(|indent| indent.iter().all(|&b| b == b' '))
            .map_or(0, <[u8]>::len);

        LinePrefix::Item {
            first: if blank { after } else { after + gap },
            width: lead + marker_len + gap,
        }
    }

    fn close(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(id) = self.stack.pop() else {
            return;
        };
        self.prefixes.pop();
        let Some(span) = self.builder.node(id).map(|node| node.span) else {
            return;
        };

        let source = self.source;
        match self.builder.kind_mut(id) {
            Some(NodeKind::Block { lines }) if lines.is_empty() => {
                *lines = container_lines(source, span, &self.prefixes);
            }
            Some(kind) if !kind.is_block() => {
                self.inline_end = self.inline_end.max(span.end);
            }
            _ => {}
        }
    }

    fn text(&mut self, span: Span) {
        let parent = self.current();
        let source = self.source;
        match self.builder.kind_mut(parent) {
            Some(NodeKind::FencedCodeBlock { lines }) => lines.push(span),
            Some(NodeKind::Block { lines }) => {
                lines.extend(container_lines(source, span, &self.prefixes));
            }
            _ => {
                let span = self.with_escape(span);
                self.leaf(NodeKind::Text, span);
            }
        }
    }

    fn html(&mut self, span: Span) {
        let source = self.source;
        match self.builder.kind_mut(self.current()) {
            Some(NodeKind::Block { lines }) => {
                lines.extend(container_lines(source, span, &self.prefixes));
            }
            _ => {
                self.leaf(NodeKind::Inline, span);
            }
        }
    }

    /// Code spans become an inline node whose delimiters are the backtick
    /// runs, with the content as a text child so link text can see it.
    fn code(&mut self, span: Span) {
        let raw = self.source.as_bytes().get(span.range()).unwrap_or_default();
        let ticks = raw.iter().take_while(|&&b| b == b'`').count();

        let id = self.leaf(NodeKind::Inline, span);
        if ticks > 0 && span.len() > ticks * 2 {
            self.builder.push(
                id,
                NodeKind::Text,
                Span::new(span.start + ticks, span.end - ticks),
            );
        }
    }

    fn leaf(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.inline_end = self.inline_end.max(span.end);
        self.builder.push(self.current(), kind, span)
    }

    /// pulldown-cmark starts the text of `\*` after the backslash. Pull the
    /// backslash back in unless an earlier inline node already owns it.
    fn with_escape(&self, span: Span) -> Span {
        let escaped = span.start > 0
            && self.inline_end < span.start
            && self.source.as_bytes().get(span.start - 1) == Some(&b'\\');
        if escaped {
            Span::new(span.start - 1, span.end)
        } else {
            span
        }
    }
}
