//! `mdcanon version` command implementation.

use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Package name reported by `mdcanon version`.
pub(crate) const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");

/// Arguments for the version command.
#[derive(Args)]
pub(crate) struct VersionArgs {
    /// Print only the version number.
    #[arg(short, long)]
    pub(crate) short: bool,
}

impl VersionArgs {
    /// Execute the version command.
    ///
    /// # Errors
    ///
    /// Never fails; returns `Result` for symmetry with the other commands.
    pub(crate) fn execute(&self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        tracing::info!(
            name = PACKAGE_NAME,
            version,
            os = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "Version info"
        );

        if self.short {
            output.info(version);
        } else {
            output.highlight(&format!("{PACKAGE_NAME} {version}"));
            output.info(&format!(
                "Platform: {}/{}",
                std::env::consts::OS,
                std::env::consts::ARCH
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_package_name() {
        assert_eq!(PACKAGE_NAME, "mdcanon");
    }

    #[test]
    fn test_execute_short() {
        let args = VersionArgs { short: true };

        assert!(args.execute("1.2.3").is_ok());
    }
}
