//! `mdcanon render` command implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, ValueEnum};
use mdcanon_config::{CliSettings, Config};
use mdcanon_renderer::{AutolinkStyle, Canonicalizer};
use mdcanon_storage::{FsStorage, Storage};

use crate::error::CliError;
use crate::output::Output;

/// Autolink style accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum AutolinkArg {
    /// Bare URL.
    Bare,
    /// `[](url)`.
    Bracketed,
    /// `<url>`.
    Angle,
}

impl From<AutolinkArg> for AutolinkStyle {
    fn from(arg: AutolinkArg) -> Self {
        match arg {
            AutolinkArg::Bare => Self::Bare,
            AutolinkArg::Bracketed => Self::Bracketed,
            AutolinkArg::Angle => Self::Angle,
        }
    }
}

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown document to render (default: `input.document` from config).
    document: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover mdcanon.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory relative documents are read from (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// How autolinks are written (overrides config).
    #[arg(long, value_enum)]
    autolink: Option<AutolinkArg>,

    /// Enable tables and strikethrough (default: enabled).
    #[arg(long)]
    gfm: Option<bool>,

    /// Disable tables and strikethrough.
    #[arg(long, conflicts_with = "gfm")]
    no_gfm: bool,

    /// Maximum nesting depth (overrides config).
    #[arg(long)]
    max_depth: Option<usize>,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, no document is given, or the
    /// document cannot be read or rendered.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let text = self.render()?;
        if text.is_empty() {
            output.warning("Document rendered to empty output");
        }
        output.document(&text)?;

        Ok(())
    }

    /// Load configuration and canonicalize the selected document.
    fn render(self) -> Result<String, CliError> {
        let gfm = self.resolve_gfm();
        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            document: self.document,
            autolink: self.autolink.map(AutolinkStyle::from),
            gfm,
            max_depth: self.max_depth,
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let document = config.input_resolved.document.as_deref().ok_or_else(|| {
            CliError::Validation(
                "No document given: pass a path or set input.document in mdcanon.toml".to_owned(),
            )
        })?;
        let (source_dir, locator) = split_locator(&config.input_resolved.source_dir, document);

        tracing::info!(
            source_dir = %source_dir.display(),
            document = %locator.display(),
            autolink = config.render.autolink.as_str(),
            gfm = config.render.gfm,
            "Rendering document"
        );

        let storage = FsStorage::new(source_dir.clone());
        if !storage.exists(&locator) {
            return Err(CliError::Validation(format!(
                "Document not found in {}: {}",
                source_dir.display(),
                locator.display()
            )));
        }

        let canonicalizer = Canonicalizer::new(Arc::new(storage))
            .with_parse_options(config.render.parse_options())
            .with_render_options(config.render.render_options());

        Ok(canonicalizer.canonicalize(&locator)?)
    }

    /// Resolve `gfm` from --gfm/--no-gfm flags.
    fn resolve_gfm(&self) -> Option<bool> {
        self.no_gfm.then_some(false).or(self.gfm)
    }
}

/// Split a document path into storage root and locator.
///
/// Relative paths are locators below `source_dir`. Absolute paths are read
/// from their own directory.
fn split_locator(source_dir: &Path, document: &Path) -> (PathBuf, PathBuf) {
    if document.is_absolute()
        && let (Some(parent), Some(name)) = (document.parent(), document.file_name())
    {
        return (parent.to_path_buf(), PathBuf::from(name));
    }
    (source_dir.to_path_buf(), document.to_path_buf())
}
