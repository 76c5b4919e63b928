//! Configuration management for mdcanon.
//!
//! Parses `mdcanon.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `input.source_dir`
//! - `input.document`

mod expand;

use std::path::{Path, PathBuf};

use mdcanon_renderer::{AutolinkStyle, DEFAULT_MAX_DEPTH, ParseOptions, RenderOptions};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the locator root directory.
    pub source_dir: Option<PathBuf>,
    /// Override the document to render.
    pub document: Option<PathBuf>,
    /// Override the autolink style.
    pub autolink: Option<AutolinkStyle>,
    /// Override GitHub-flavored extensions.
    pub gfm: Option<bool>,
    /// Override the nesting limit.
    pub max_depth: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdcanon.toml";

/// Largest accepted `render.max_depth`.
const MAX_DEPTH_LIMIT: usize = 4096;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input configuration (paths are relative strings from TOML).
    #[serde(default)]
    input: InputConfigRaw,
    /// Rendering configuration.
    pub render: RenderConfig,

    /// Resolved input configuration (set after loading).
    #[serde(skip)]
    pub input_resolved: InputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw input configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct InputConfigRaw {
    source_dir: Option<String>,
    document: Option<String>,
}

/// Resolved input configuration with absolute paths.
#[derive(Debug, Default)]
pub struct InputConfig {
    /// Directory locators are resolved against.
    pub source_dir: PathBuf,
    /// Document rendered when none is given on the command line.
    pub document: Option<PathBuf>,
}

/// Rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// How autolinks are written.
    pub autolink: AutolinkStyle,
    /// Recognize tables and strikethrough.
    pub gfm: bool,
    /// Deepest accepted node nesting.
    pub max_depth: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            autolink: AutolinkStyle::default(),
            gfm: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl RenderConfig {
    /// Parser options for this configuration.
    #[must_use]
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::default().with_gfm(self.gfm)
    }

    /// Renderer options for this configuration.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            autolink: self.autolink,
            max_depth: self.max_depth,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`input.source_dir`").
        field: String,
        /// Error message from the expander.
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdcanon.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The merged result
    /// is validated again.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        tracing::debug!(
            config_path = ?config.config_path,
            source_dir = %config.input_resolved.source_dir.display(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.input_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(document) = &settings.document {
            self.input_resolved.document = Some(document.clone());
        }
        if let Some(autolink) = settings.autolink {
            self.render.autolink = autolink;
        }
        if let Some(gfm) = settings.gfm {
            self.render.gfm = gfm;
        }
        if let Some(max_depth) = settings.max_depth {
            self.render.max_depth = max_depth;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let start = std::env::current_dir().ok()?;
        Self::discover_config_from(&start)
    }

    /// Search for config file in `start` and its parents.
    fn discover_config_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            input: InputConfigRaw::default(),
            render: RenderConfig::default(),
            input_resolved: InputConfig {
                source_dir: base.to_path_buf(),
                document: None,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_input()?;
        self.validate_render()?;
        Ok(())
    }

    fn validate_input(&self) -> Result<(), ConfigError> {
        if let Some(source_dir) = &self.input.source_dir {
            require_non_empty(source_dir, "input.source_dir")?;
        }
        if let Some(document) = &self.input.document {
            require_non_empty(document, "input.document")?;
        }
        Ok(())
    }

    fn validate_render(&self) -> Result<(), ConfigError> {
        let max_depth = self.render.max_depth;
        if max_depth == 0 {
            return Err(ConfigError::Validation(
                "render.max_depth must be greater than 0".to_owned(),
            ));
        }
        if max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::Validation(format!(
                "render.max_depth cannot exceed {MAX_DEPTH_LIMIT}"
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref source_dir) = self.input.source_dir {
            self.input.source_dir = Some(expand::expand_env(source_dir, "input.source_dir")?);
        }
        if let Some(ref document) = self.input.document {
            self.input.document = Some(expand::expand_env(document, "input.document")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    ///
    /// The document stays a locator relative to `source_dir`.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let source_dir = match self.input.source_dir.as_deref() {
            Some(dir) => config_dir.join(dir),
            None => config_dir.to_path_buf(),
        };

        self.input_resolved = InputConfig {
            source_dir,
            document: self.input.document.as_deref().map(PathBuf::from),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));

        assert_eq!(config.input_resolved.source_dir, PathBuf::from("/test"));
        assert!(config.input_resolved.document.is_none());
        assert_eq!(config.render.autolink, AutolinkStyle::Bare);
        assert!(config.render.gfm);
        assert_eq!(config.render.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.render.autolink, AutolinkStyle::Bare);
        assert!(config.render.gfm);
    }

    #[test]
    fn test_parse_render_config() {
        let toml = r#"
[render]
autolink = "angle"
gfm = false
max_depth = 64
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.render.autolink, AutolinkStyle::Angle);
        assert!(!config.render.gfm);
        assert_eq!(config.render.max_depth, 64);
    }

    #[test]
    fn test_parse_unknown_autolink_style() {
        let toml = r#"
[render]
autolink = "fancy"
"#;
        let result: Result<Config, _> = toml::from_str(toml);

        assert!(result.is_err());
    }

    #[test]
    fn test_render_options() {
        let render = RenderConfig {
            autolink: AutolinkStyle::Bracketed,
            gfm: false,
            max_depth: 32,
        };

        assert_eq!(
            render.render_options(),
            RenderOptions {
                autolink: AutolinkStyle::Bracketed,
                max_depth: 32,
            }
        );
        assert_eq!(render.parse_options(), ParseOptions { gfm: false });
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[input]
source_dir = "docs"
document = "guide/intro.md"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.input_resolved.source_dir,
            PathBuf::from("/project/docs")
        );
        assert_eq!(
            config.input_resolved.document,
            Some(PathBuf::from("guide/intro.md"))
        );
    }

    #[test]
    fn test_resolve_paths_defaults_to_config_dir() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.input_resolved.source_dir, PathBuf::from("/project"));
        assert!(config.input_resolved.document.is_none());
    }

    #[test]
    fn test_apply_cli_settings_source_dir() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            source_dir: Some(PathBuf::from("/custom/docs")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(
            config.input_resolved.source_dir,
            PathBuf::from("/custom/docs")
        );
        assert_eq!(config.render.autolink, AutolinkStyle::Bare); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_render() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            autolink: Some(AutolinkStyle::Angle),
            gfm: Some(false),
            max_depth: Some(16),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.render.autolink, AutolinkStyle::Angle);
        assert!(!config.render.gfm);
        assert_eq!(config.render.max_depth, 16);
    }

    #[test]
    fn test_apply_cli_settings_document() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            document: Some(PathBuf::from("README.md")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(
            config.input_resolved.document,
            Some(PathBuf::from("README.md"))
        );
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.input_resolved.source_dir, PathBuf::from("/test"));
        assert!(config.render.gfm);
    }

    #[test]
    fn test_expand_env_vars_input() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::set_var("MDCANON_TEST_SOURCE_DIR", "/srv/docs");
        }

        let toml = r#"
[input]
source_dir = "${MDCANON_TEST_SOURCE_DIR}"
document = "${MDCANON_TEST_DOCUMENT:-index.md}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.input.source_dir.as_deref(), Some("/srv/docs"));
        assert_eq!(config.input.document.as_deref(), Some("index.md"));

        unsafe {
            std::env::remove_var("MDCANON_TEST_SOURCE_DIR");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::remove_var("MISSING_VAR_MDCANON_TEST");
        }

        let toml = r#"
[input]
document = "${MISSING_VAR_MDCANON_TEST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let result = config.expand_env_vars();

        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING_VAR_MDCANON_TEST"));
        assert!(err.to_string().contains("input.document"));
    }

    #[test]
    fn test_expand_env_vars_literal_unchanged() {
        let toml = r#"
[input]
source_dir = "docs"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.input.source_dir.as_deref(), Some("docs"));
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_max_depth_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.render.max_depth = 0;
        assert_validation_error(&config, &["render.max_depth", "greater than 0"]);
    }

    #[test]
    fn test_validate_max_depth_too_high() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.render.max_depth = MAX_DEPTH_LIMIT + 1;
        assert_validation_error(&config, &["render.max_depth", "4096"]);
    }

    #[test]
    fn test_validate_empty_document() {
        let config: Config = toml::from_str("[input]\ndocument = \"\"\n").unwrap();
        assert_validation_error(&config, &["input.document", "cannot be empty"]);
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = create_test_dir();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[input]\nsource_dir = \"docs\"\n\n[render]\nautolink = \"bracketed\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.input_resolved.source_dir, temp_dir.path().join("docs"));
        assert_eq!(config.render.autolink, AutolinkStyle::Bracketed);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let temp_dir = create_test_dir();
        let path = temp_dir.path().join("absent.toml");

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = create_test_dir();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[render\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_rejects_invalid_cli_override() {
        let temp_dir = create_test_dir();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();
        let overrides = CliSettings {
            max_depth: Some(0),
            ..Default::default()
        };

        let err = Config::load(Some(&path), Some(&overrides)).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_discover_config_in_parent() {
        let temp_dir = create_test_dir();
        let nested = temp_dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILENAME), "").unwrap();

        let found = Config::discover_config_from(&nested);

        assert_eq!(found, Some(temp_dir.path().join(CONFIG_FILENAME)));
    }

    #[test]
    fn test_discover_config_prefers_nearest() {
        let temp_dir = create_test_dir();
        let nested = temp_dir.path().join("sub");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILENAME), "").unwrap();
        std::fs::write(nested.join(CONFIG_FILENAME), "").unwrap();

        let found = Config::discover_config_from(&nested);

        assert_eq!(found, Some(nested.join(CONFIG_FILENAME)));
    }
}
