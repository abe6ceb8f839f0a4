mod cli;
mod logging;

use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use pkgup_core::{FailureMode, Outcome, PackageVersion, Updater, UpdaterConfig};
use pkgup_platform::AppPaths;

use crate::cli::{Cli, Command};

const MAX_LOG_SIZE_BYTES: u64 = 5 * 1024 * 1024;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.debug, MAX_LOG_SIZE_BYTES);

    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            log::error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config_path = match cli.config {
        Some(path) => path,
        None => AppPaths::new()?.config_file(),
    };
    let config = UpdaterConfig::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let mut updater = Updater::new(config)?;

    match cli.command {
        Command::Info { name } => {
            let info = updater.get_info(&name)?;
            for entry in &info.versions {
                println!("{}\t{}", entry.version, entry.file);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { name, current } => {
            let current = PackageVersion::new(current);
            if updater.check_new_version(&name, &current)? {
                println!("{name}: update available (current {current})");
            } else {
                println!("{name}: up to date (current {current})");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Install { name, strict } => {
            let outcome = updater.install(&name, failure_mode(strict))?;
            Ok(report(&name, outcome))
        }
        Command::Update {
            name,
            current,
            target,
            strict,
        } => {
            let current = PackageVersion::new(current);
            let target = target.map(PackageVersion::new);
            let outcome =
                updater.update(&name, &current, target.as_ref(), failure_mode(strict))?;
            Ok(report(&name, outcome))
        }
    }
}

fn failure_mode(strict: bool) -> FailureMode {
    if strict {
        FailureMode::Raise
    } else {
        FailureMode::Report
    }
}

fn report(name: &str, outcome: Outcome) -> ExitCode {
    match outcome {
        Outcome::Installed(version) => {
            println!("{name} {version} installed");
            ExitCode::SUCCESS
        }
        Outcome::Failed(error) => {
            println!("{name} was not installed ({}): {error}", error.kind());
            ExitCode::FAILURE
        }
    }
}
