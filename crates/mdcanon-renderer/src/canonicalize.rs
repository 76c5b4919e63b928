//! Locator-to-text pipeline: read bytes, parse, render.

use std::path::Path;
use std::sync::Arc;

use mdcanon_storage::Storage;

use crate::error::{CanonicalizeError, RenderError};
use crate::parse::{ParseOptions, parse, parse_str};
use crate::renderer::{RenderOptions, Renderer};

/// Canonicalizes documents read from a [`Storage`].
///
/// Holds no per-document state, so a single instance can be shared across
/// threads to process independent documents concurrently.
pub struct Canonicalizer {
    storage: Arc<dyn Storage>,
    parse_options: ParseOptions,
    renderer: Renderer,
}

impl Canonicalizer {
    /// Create a canonicalizer with default parse and render options.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            parse_options: ParseOptions::default(),
            renderer: Renderer::new(),
        }
    }

    #[must_use]
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    #[must_use]
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.renderer = Renderer::with_options(options);
        self
    }

    /// Read the document at `path` and return its canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizeError`] naming `path` if the bytes cannot be
    /// read, are not UTF-8, or the document cannot be rendered.
    pub fn canonicalize(&self, path: &Path) -> Result<String, CanonicalizeError> {
        tracing::debug!(path = %path.display(), "Canonicalizing document");

        let bytes = self
            .storage
            .read(path)
            .map_err(|source| CanonicalizeError::SourceRead {
                path: path.to_path_buf(),
                source,
            })?;

        let document =
            parse(&bytes, &self.parse_options).map_err(|source| CanonicalizeError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let output =
            self.renderer
                .render_to_string(&document)
                .map_err(|source| CanonicalizeError::Render {
                    path: path.to_path_buf(),
                    source,
                })?;

        tracing::debug!(
            path = %path.display(),
            input_bytes = bytes.len(),
            output_bytes = output.len(),
            "Canonicalized document"
        );
        Ok(output)
    }
}

/// Canonicalize Markdown text directly, without a storage.
///
/// # Errors
///
/// Returns [`RenderError`] if the document nests deeper than
/// `render_options.max_depth`.
pub fn canonicalize_str(
    markdown: &str,
    parse_options: &ParseOptions,
    render_options: &RenderOptions,
) -> Result<String, RenderError> {
    let document = parse_str(markdown, parse_options);
    Renderer::with_options(*render_options).render_to_string(&document)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use mdcanon_storage::{FsStorage, MockStorage, StorageErrorKind};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ParseError;
    use crate::renderer::AutolinkStyle;

    const TEST03: &str = "# Header 1

This is a paragraph with a [link](https://example.com).

* List item 1
* List item 2

## Header 2

1. Numbered item 1
2. Numbered item 2

> This is a blockquote.";

    const FIXTURES: &[(&str, &str, &str)] = &[
        ("test01.md", "[name](https://name.com)", "[name](https://name.com)"),
        ("test02.md", "Hello, world!", "Hello, world!"),
        ("test03.md", TEST03, TEST03),
        (
            "test04.md",
            "```\nThis is a code block.\n```",
            "```\nThis is a code block.\n```",
        ),
        ("test05.md", "https://google.com", "https://google.com"),
        (
            "test06.md",
            "[link](https://example.com)",
            "[link](https://example.com)",
        ),
        (
            "test07.md",
            "This is a [link](https://example.com) in some text.",
            "This is a [link](https://example.com) in some text.",
        ),
        (
            "test08.md",
            "[Link 1](https://example1.com) and [Link 2](https://example2.com)",
            "[Link 1](https://example1.com) and [Link 2](https://example2.com)",
        ),
        (
            "test09.md",
            r#"Here's a [link with title](https://example.com "Example Title")."#,
            "Here's a [link with title](https://example.com).",
        ),
        (
            "test10.md",
            r#"[Link 1](https://example1.com) Some text [Link 2](https://example2.com "Title 2")"#,
            "[Link 1](https://example1.com) Some text [Link 2](https://example2.com)",
        ),
        (
            "test11.md",
            r#"Text before [Link 1](https://example1.com "Title 1") text between [Link 2](https://example2.com) text after"#,
            "Text before [Link 1](https://example1.com) text between [Link 2](https://example2.com) text after",
        ),
        (
            "test12.md",
            "hello\n\nhttps://d.com/d.txt\n\n[a](https://b.com/c.txt)\n\n| a | b |\n|---|---|\n\n\n      ",
            "hello\n\nhttps://d.com/d.txt\n\n[a](https://b.com/c.txt)\n\n| a | b |\n|---|---|",
        ),
    ];

    const DENSE_INPUT: &str = "# Header 1\n\
        ## Header 2\n\
        This is a paragraph with a [link](https://example.com).\n\
        \n\
        * List item 1\n\
        * List item 2\n\
        \n\
        1. Ordered item 1\n\
        2. Ordered item 2\n\
        \n\
        ```\n\
        This is a code block.\n\
        ```\n";

    const DENSE_OUTPUT: &str = "# Header 1\n\
        \n\
        ## Header 2\n\
        \n\
        This is a paragraph with a [link](https://example.com).\n\
        \n\
        * List item 1\n\
        * List item 2\n\
        \n\
        1. Ordered item 1\n\
        2. Ordered item 2\n\
        \n\
        ```\n\
        This is a code block.\n\
        ```";

    fn fixture_storage() -> Arc<dyn Storage> {
        let storage = FIXTURES
            .iter()
            .fold(MockStorage::new(), |storage, (name, input, _)| {
                storage.with_file(format!("testdata/{name}"), *input)
            })
            .with_file("testdata/dense.md", DENSE_INPUT);
        Arc::new(storage)
    }

    #[test]
    fn test_fixtures() {
        let canonicalizer = Canonicalizer::new(fixture_storage());

        for (name, _, expected) in FIXTURES {
            let path = PathBuf::from(format!("testdata/{name}"));
            let output = canonicalizer.canonicalize(&path).unwrap();
            assert_eq!(output, *expected, "fixture {name}");
        }
    }

    #[test]
    fn test_dense_document() {
        let canonicalizer = Canonicalizer::new(fixture_storage());

        let output = canonicalizer
            .canonicalize(Path::new("testdata/dense.md"))
            .unwrap();

        assert_eq!(output, DENSE_OUTPUT);
    }

    #[test]
    fn test_mixed_document_with_blockquote() {
        let source = "# Title\nSee [docs](https://d.io \"Docs\") now.\n\n- one\n- two\n\n\
            ## Steps\n\n1) first\n2) second\n\n> quoted\n> lines";

        let output =
            canonicalize_str(source, &ParseOptions::default(), &RenderOptions::default()).unwrap();

        assert_eq!(
            output,
            "# Title\n\nSee [docs](https://d.io) now.\n\n* one\n* two\n\n\
            ## Steps\n\n1. first\n2. second\n\n> quoted\n> lines"
        );
    }

    #[test]
    fn test_output_is_stable() {
        let options = (ParseOptions::default(), RenderOptions::default());

        let once = canonicalize_str(DENSE_INPUT, &options.0, &options.1).unwrap();
        let twice = canonicalize_str(&once, &options.0, &options.1).unwrap();

        assert_eq!(twice, once);
    }

    #[test]
    fn test_stable_with_nesting() {
        let source = "> # Quoted\n> text\n\n1. one\n   * a\n   * b\n2. two\n\n```\ncode\n```";
        let parse_options = ParseOptions::default();
        let render_options = RenderOptions::default();

        let once = canonicalize_str(source, &parse_options, &render_options).unwrap();
        let twice = canonicalize_str(&once, &parse_options, &render_options).unwrap();

        assert_eq!(once, source);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_render_options_applied() {
        let storage = MockStorage::new().with_file("auto.md", "<https://a.io>");
        let canonicalizer =
            Canonicalizer::new(Arc::new(storage)).with_render_options(RenderOptions {
                autolink: AutolinkStyle::Angle,
                ..RenderOptions::default()
            });

        let output = canonicalizer.canonicalize(Path::new("auto.md")).unwrap();

        assert_eq!(output, "<https://a.io>");
    }

    #[test]
    fn test_parse_options_applied() {
        let storage = MockStorage::new().with_file("table.md", "| a |\n|:-:|");
        let canonicalizer = Canonicalizer::new(Arc::new(storage))
            .with_parse_options(ParseOptions::default().with_gfm(false));

        let output = canonicalizer.canonicalize(Path::new("table.md")).unwrap();

        assert_eq!(output, "| a |\n|:-:|");
    }

    #[test]
    fn test_missing_document() {
        let canonicalizer = Canonicalizer::new(Arc::new(MockStorage::new()));

        let err = canonicalizer
            .canonicalize(Path::new("nonexistent.md"))
            .unwrap_err();

        assert!(matches!(&err, CanonicalizeError::SourceRead { source, .. }
            if source.kind() == StorageErrorKind::NotFound));
        assert_eq!(err.path(), Path::new("nonexistent.md"));
    }

    #[test]
    fn test_invalid_utf8() {
        let storage = MockStorage::new().with_bytes("bad.md", vec![b'#', b' ', 0xc3, 0x28]);
        let canonicalizer = Canonicalizer::new(Arc::new(storage));

        let err = canonicalizer.canonicalize(Path::new("bad.md")).unwrap_err();

        assert!(matches!(
            err,
            CanonicalizeError::Parse {
                source: ParseError::InvalidUtf8 { valid_up_to: 2 },
                ..
            }
        ));
    }

    #[test]
    fn test_render_error_carries_path() {
        let storage = MockStorage::new().with_file("deep.md", "> > > > deep");
        let canonicalizer =
            Canonicalizer::new(Arc::new(storage)).with_render_options(RenderOptions {
                max_depth: 2,
                ..RenderOptions::default()
            });

        let err = canonicalizer.canonicalize(Path::new("deep.md")).unwrap_err();

        assert!(matches!(err, CanonicalizeError::Render { .. }));
        assert_eq!(err.path(), Path::new("deep.md"));
    }

    #[test]
    fn test_canonicalize_from_filesystem() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join("readme.md"),
            "Intro\n===\n\n- [a](x \"t\")\n- b\n",
        )
        .unwrap();
        let storage = FsStorage::new(temp_dir.path().to_path_buf());

        let output = Canonicalizer::new(Arc::new(storage))
            .canonicalize(Path::new("readme.md"))
            .unwrap();

        assert_eq!(output, "# Intro\n\n* [a](x)\n* b");
    }

    #[test]
    fn test_concurrent_documents() {
        let canonicalizer = Canonicalizer::new(fixture_storage());

        let outputs: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = FIXTURES
                .iter()
                .map(|(name, _, _)| {
                    let canonicalizer = &canonicalizer;
                    scope.spawn(move || {
                        canonicalizer
                            .canonicalize(&PathBuf::from(format!("testdata/{name}")))
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let expected: Vec<String> = FIXTURES.iter().map(|(_, _, out)| (*out).to_owned()).collect();
        assert_eq!(outputs, expected);
    }
}
