//! Append-only text buffer the renderer writes into.

/// Accumulates rendered Markdown.
///
/// Containers such as list items and blockquotes render their content into a
/// nested sink and splice it back with [`push_prefixed`](Self::push_prefixed),
/// which prepends the container marker to every line.
#[derive(Debug, Default, Clone)]
pub struct OutputSink {
    buf: String,
}

impl OutputSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
        }
    }

    pub fn push_str(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    pub fn push(&mut self, ch: char) {
        self.buf.push(ch);
    }

    /// Terminate the current line unconditionally.
    pub fn newline(&mut self) {
        self.buf.push('\n');
    }

    /// Terminate the current line unless it is already terminated.
    pub fn ensure_newline(&mut self) {
        if !self.at_line_start() {
            self.newline();
        }
    }

    /// Terminate the current line, then add one empty line.
    pub fn blank_line(&mut self) {
        self.ensure_newline();
        self.newline();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Whether the next byte written would start a new line.
    #[must_use]
    pub fn at_line_start(&self) -> bool {
        self.buf.is_empty() || self.buf.ends_with('\n')
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Append `inner` line by line, prefixing the first line with `first` and
    /// every later line with `rest`.
    ///
    /// Prefixes are right-trimmed on empty lines so no line ends in
    /// whitespace it did not have. Empty `inner` produces the trimmed first
    /// prefix alone.
    pub fn push_prefixed(&mut self, inner: &str, first: &str, rest: &str) {
        if inner.is_empty() {
            self.push_str(first.trim_end());
            return;
        }

        for (i, line) in inner.split_inclusive('\n').enumerate() {
            let prefix = if i == 0 { first } else { rest };
            if line == "\n" {
                self.push_str(prefix.trim_end());
            } else {
                self.push_str(prefix);
            }
            self.push_str(line);
        }
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.buf
    }

    /// Final document text, stripped of leading and trailing whitespace.
    #[must_use]
    pub fn finish(self) -> String {
        let trimmed = self.buf.trim();
        if trimmed.len() == self.buf.len() {
            self.buf
        } else {
            trimmed.to_owned()
        }
    }
}
