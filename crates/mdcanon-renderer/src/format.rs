//! Per-node formatting rules.
//!
//! Every block formatter leaves the sink at the start of a line, so the next
//! sibling never has to guess whether a newline is owed.

use crate::error::RenderError;
use crate::renderer::{AutolinkStyle, RenderPass};
use crate::sink::OutputSink;
use crate::tree::{Node, NodeId, Span};
use crate::util::{code_fence, single_line};

impl RenderPass<'_> {
    /// Top-level children, separated by one empty line.
    pub(crate) fn document_body(
        &self,
        node: &Node,
        sink: &mut OutputSink,
        depth: usize,
    ) -> Result<(), RenderError> {
        for (i, &child) in node.children().iter().enumerate() {
            if i > 0 {
                sink.blank_line();
            }
            self.node(child, sink, depth + 1)?;
        }
        Ok(())
    }

    /// `## text` on one line. Line breaks inside the heading become spaces.
    pub(crate) fn heading(
        &self,
        level: u8,
        node: &Node,
        sink: &mut OutputSink,
        depth: usize,
    ) -> Result<(), RenderError> {
        let mut content = OutputSink::new();
        RenderPass {
            single_line: true,
            ..*self
        }
        .children(node, &mut content, depth)?;

        sink.push_str(&"#".repeat(usize::from(level)));
        sink.push(' ');
        sink.push_str(&single_line(content.as_str()));
        sink.newline();
        Ok(())
    }

    pub(crate) fn paragraph(
        &self,
        node: &Node,
        sink: &mut OutputSink,
        depth: usize,
    ) -> Result<(), RenderError> {
        self.children(node, sink, depth)?;
        sink.ensure_newline();
        Ok(())
    }

    /// Items are numbered from 1 regardless of the source numbering.
    /// Continuation lines are indented by the marker width.
    pub(crate) fn list(
        &self,
        ordered: bool,
        node: &Node,
        sink: &mut OutputSink,
        depth: usize,
    ) -> Result<(), RenderError> {
        for (i, &item) in node.children().iter().enumerate() {
            let marker = if ordered {
                format!("{}. ", i + 1)
            } else {
                "* ".to_owned()
            };

            let mut content = OutputSink::new();
            self.node(item, &mut content, depth + 1)?;
            sink.push_prefixed(content.as_str(), &marker, &" ".repeat(marker.len()));
            sink.ensure_newline();
        }
        Ok(())
    }

    pub(crate) fn blockquote(
        &self,
        node: &Node,
        sink: &mut OutputSink,
        depth: usize,
    ) -> Result<(), RenderError> {
        let mut content = OutputSink::new();
        self.children(node, &mut content, depth)?;
        sink.push_prefixed(content.as_str(), "> ", "> ");
        sink.ensure_newline();
        Ok(())
    }

    /// Code lines are copied byte for byte. The info string is dropped.
    pub(crate) fn fenced_code(
        &self,
        lines: &[Span],
        sink: &mut OutputSink,
    ) -> Result<(), RenderError> {
        let lines = lines
            .iter()
            .map(|&span| self.document.resolve(span))
            .collect::<Result<Vec<_>, _>>()?;
        let fence = code_fence(lines.iter().copied());

        sink.push_str(&fence);
        sink.newline();
        for line in lines {
            sink.push_str(line);
        }
        sink.ensure_newline();
        sink.push_str(&fence);
        sink.newline();
        Ok(())
    }

    /// `[text](destination)`. The title is never written.
    pub(crate) fn link(
        &self,
        id: NodeId,
        destination: &str,
        sink: &mut OutputSink,
    ) -> Result<(), RenderError> {
        let text = self.document.text_content(id)?;
        sink.push('[');
        sink.push_str(&text);
        sink.push_str("](");
        push_destination(destination, sink);
        sink.push(')');
        Ok(())
    }

    pub(crate) fn autolink(&self, url: &str, sink: &mut OutputSink) {
        match self.options.autolink {
            AutolinkStyle::Bare => sink.push_str(url),
            AutolinkStyle::Bracketed => {
                sink.push_str("[](");
                push_destination(url, sink);
                sink.push(')');
            }
            AutolinkStyle::Angle => {
                sink.push('<');
                sink.push_str(url);
                sink.push('>');
            }
        }
    }

    pub(crate) fn table(
        &self,
        node: &Node,
        sink: &mut OutputSink,
        depth: usize,
    ) -> Result<(), RenderError> {
        for &row in node.children() {
            self.node(row, sink, depth + 1)?;
        }
        Ok(())
    }

    /// `| a | b |`, followed by `|---|---|` when this is the header row.
    pub(crate) fn table_row(
        &self,
        header: bool,
        node: &Node,
        sink: &mut OutputSink,
        depth: usize,
    ) -> Result<(), RenderError> {
        sink.push('|');
        for &cell in node.children() {
            sink.push(' ');
            self.node(cell, sink, depth + 1)?;
            sink.push_str(" |");
        }
        sink.newline();

        if header {
            sink.push('|');
            sink.push_str(&"---|".repeat(node.children().len()));
            sink.newline();
        }
        Ok(())
    }

    /// Unrecognized blocks: source lines, verbatim.
    pub(crate) fn passthrough_block(
        &self,
        node: &Node,
        lines: &[Span],
        sink: &mut OutputSink,
    ) -> Result<(), RenderError> {
        tracing::debug!(
            start = node.span.start,
            end = node.span.end,
            "Copying unrecognized block verbatim"
        );
        for &span in lines {
            sink.push_str(self.document.resolve(span)?);
        }
        sink.ensure_newline();
        Ok(())
    }

    /// Unrecognized inline constructs keep their source delimiters around
    /// the re-rendered children. Leaves are copied whole.
    pub(crate) fn passthrough_inline(
        &self,
        node: &Node,
        sink: &mut OutputSink,
        depth: usize,
    ) -> Result<(), RenderError> {
        let (Some(&first), Some(&last)) = (node.children().first(), node.children().last()) else {
            sink.push_str(self.document.resolve(node.span)?);
            return Ok(());
        };

        let opening = Span::new(node.span.start, self.lookup(first)?.span.start);
        let closing = Span::new(self.lookup(last)?.span.end, node.span.end);

        sink.push_str(self.document.resolve(opening)?);
        self.children(node, sink, depth)?;
        sink.push_str(self.document.resolve(closing)?);
        Ok(())
    }
}

/// Destinations containing spaces need the angle-bracket form to survive a
/// reparse.
fn push_destination(destination: &str, sink: &mut OutputSink) {
    if destination.contains([' ', '\t', '\n']) {
        sink.push('<');
        sink.push_str(destination);
        sink.push('>');
    } else {
        sink.push_str(destination);
    }
}
