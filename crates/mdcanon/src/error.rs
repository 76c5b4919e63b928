//! CLI error types.

use mdcanon_config::ConfigError;
use mdcanon_renderer::CanonicalizeError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Canonicalize(#[from] CanonicalizeError),

    #[error("{0}")]
    Validation(String),
}
