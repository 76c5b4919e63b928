//! Shared helpers for building and rendering documents.

use pulldown_cmark::HeadingLevel;

use crate::tree::Span;

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// What an open container occupies at the start of each of its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LinePrefix {
    None,
    /// Up to three spaces, `>`, and one optional space.
    Quote,
    /// A list item. `first` is where content begins on the marker line;
    /// continuation lines are indented by `width` spaces.
    Item { first: usize, width: usize },
}

/// Offset where container content begins on the line starting at
/// `line_start`, never past `limit`.
#[must_use]
pub(crate) fn skip_prefixes(
    source: &str,
    line_start: usize,
    limit: usize,
    prefixes: &[LinePrefix],
) -> usize {
    let bytes = source.as_bytes();
    let limit = limit.min(bytes.len());
    let mut pos = line_start.min(limit);

    for prefix in prefixes {
        match *prefix {
            LinePrefix::None => {}
            LinePrefix::Quote => {
                let mut p = pos;
                while p < limit && p - pos < 3 && bytes[p] == b' ' {
                    p += 1;
                }
                if p < limit && bytes[p] == b'>' {
                    pos = p + 1;
                    if pos < limit && matches!(bytes[pos], b' ' | b'\t') {
                        pos += 1;
                    }
                }
            }
            LinePrefix::Item { first, width } => {
                let marker_line = first >= pos
                    && first <= limit
                    && !bytes[pos..first].contains(&b'\n');
                if marker_line {
                    pos = first;
                } else {
                    let mut p = pos;
                    while p < limit && p - pos < width && bytes[p] == b' ' {
                        p += 1;
                    }
                    pos = p;
                }
            }
        }
    }
    pos
}

/// Start of the line containing `offset`.
#[must_use]
pub(crate) fn line_start(source: &str, offset: usize) -> usize {
    source
        .as_bytes()
        .get(..offset)
        .and_then(|before| before.iter().rposition(|&b| b == b'\n'))
        .map_or(0, |i| i + 1)
}

/// Split a block span into lines with the enclosing container prefixes
/// removed.
///
/// pulldown-cmark starts a block after its indentation; the first line is
/// moved back over whatever whitespace lies between the container content
/// and that start. Later lines keep everything past the container prefix.
#[must_use]
pub(crate) fn container_lines(source: &str, span: Span, prefixes: &[LinePrefix]) -> Vec<Span> {
    let bytes = source.as_bytes();
    let first_line = line_start(source, span.start);
    let content = skip_prefixes(source, first_line, span.start, prefixes);
    let start = if bytes
        .get(content..span.start)
        .is_some_and(|gap| gap.iter().all(|&b| matches!(b, b' ' | b'\t')))
    {
        content
    } else {
        span.start
    };

    line_spans(source, Span::new(start, span.end))
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line
            } else {
                Span::new(skip_prefixes(source, line.start, line.end, prefixes), line.end)
            }
        })
        .collect()
}

/// Join the lines of `text` with single spaces, dropping the whitespace
/// around each line break.
#[must_use]
pub(crate) fn single_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, piece) in text.split('\n').enumerate() {
        let piece = if i > 0 {
            let trimmed = out.trim_end_matches([' ', '\t', '\r']).len();
            out.truncate(trimmed);
            piece.trim_start_matches([' ', '\t'])
        } else {
            piece
        };
        if i > 0 && !out.is_empty() && !piece.is_empty() {
            out.push(' ');
        }
        out.push_str(piece);
    }
    out
}

/// Split a span into one span per line, each keeping its trailing newline.
#[must_use]
pub(crate) fn line_spans(source: &str, span: Span) -> Vec<Span> {
    let Some(text) = source.get(span.range()) else {
        return vec![span];
    };

    let mut offset = span.start;
    text.split_inclusive('\n')
        .map(|line| {
            let line_span = Span::new(offset, offset + line.len());
            offset = line_span.end;
            line_span
        })
        .collect()
}

/// Backtick fence long enough that no content line can close it early.
///
/// Returns three backticks unless a line already starts with a run of three
/// or more.
#[must_use]
pub(crate) fn code_fence<'a>(lines: impl IntoIterator<Item = &'a str>) -> String {
    let longest = lines
        .into_iter()
        .map(|line| {
            line.trim_start_matches([' ', '\t'])
                .bytes()
                .take_while(|&b| b == b'`')
                .count()
        })
        .max()
        .unwrap_or(0);

    let len = if longest >= 3 { longest + 1 } else { 3 };
    "`".repeat(len)
}
