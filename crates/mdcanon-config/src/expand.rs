//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// `field` names the config key in the error when a variable is unset.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_expand_literal() {
        assert_eq!(expand_env("docs/guide.md", "input.document").unwrap(), "docs/guide.md");
    }

    #[test]
    fn test_expand_default_value() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::remove_var("MDCANON_EXPAND_UNSET");
        }

        let expanded = expand_env("${MDCANON_EXPAND_UNSET:-fallback}", "input.source_dir").unwrap();

        assert_eq!(expanded, "fallback");
    }

    #[test]
    fn test_expand_set_variable() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::set_var("MDCANON_EXPAND_SET", "/data");
        }

        let expanded = expand_env("${MDCANON_EXPAND_SET}/docs", "input.source_dir").unwrap();

        assert_eq!(expanded, "/data/docs");

        unsafe {
            std::env::remove_var("MDCANON_EXPAND_SET");
        }
    }

    #[test]
    fn test_expand_missing_variable() {
        // SAFETY: variable names are unique to this test
        unsafe {
            std::env::remove_var("MDCANON_EXPAND_MISSING");
        }

        let err = expand_env("${MDCANON_EXPAND_MISSING}", "input.document").unwrap_err();

        assert_eq!(
            err.to_string(),
            "Environment variable error in input.document: ${MDCANON_EXPAND_MISSING} not set"
        );
    }
}
