use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "pkgup")]
#[command(version, about = "Install and update packages from a package registry")]
pub struct Cli {
    /// Path to the JSON config file (defaults to the per-user config file)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the versions the registry publishes for a package
    Info { name: String },

    /// Report whether the registry has a version at or above the current one
    Check { name: String, current: String },

    /// Install the first version the registry lists
    Install {
        name: String,
        /// Fail with the underlying error instead of reporting it
        #[arg(long)]
        strict: bool,
    },

    /// Update an installed package
    Update {
        name: String,
        current: String,
        /// Exact version to update to
        #[arg(long = "to")]
        target: Option<String>,
        /// Fail with the underlying error instead of reporting it
        #[arg(long)]
        strict: bool,
    },
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn parses_update_with_target() {
        let cli = Cli::try_parse_from([
            "pkgup", "--config", "/etc/pkgup.json", "update", "Pages", "0.1", "--to", "1.0",
        ])
        .expect("arguments should parse");

        assert_eq!(
            cli.config.as_deref(),
            Some(std::path::Path::new("/etc/pkgup.json"))
        );
        assert!(matches!(
            cli.command,
            Command::Update { ref name, ref current, target: Some(ref target), strict: false }
                if name == "Pages" && current == "0.1" && target == "1.0"
        ));
    }

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from(["pkgup", "install", "Pages", "--strict", "--debug"])
            .expect("arguments should parse");

        assert!(cli.debug);
        assert!(matches!(cli.command, Command::Install { strict: true, .. }));
    }

    #[test]
    fn check_requires_current_version() {
        assert!(Cli::try_parse_from(["pkgup", "check", "Pages"]).is_err());
    }
}
