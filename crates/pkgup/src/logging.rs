use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::OpenOptions;
use std::path::Path;

use pkgup_platform::AppPaths;

fn trim_log_file_if_oversized(log_path: &Path, max_log_size: u64) {
    if let Ok(metadata) = std::fs::metadata(log_path)
        && metadata.len() > max_log_size
        && let Ok(contents) = std::fs::read(log_path)
    {
        let half = contents.len() / 2;
        let keep_from = contents[half..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(half, |pos| half + pos + 1);
        let _ = std::fs::write(log_path, &contents[keep_from..]);
    }
}

fn level_for(debug_enabled: bool) -> LevelFilter {
    if debug_enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Log to stderr and, when the data directory is usable, to the log file.
pub fn init_logging(debug_enabled: bool, max_log_size: u64) {
    let level = level_for(debug_enabled);
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("pkgup")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    let log_path = AppPaths::new()
        .ok()
        .filter(|paths| paths.ensure_dirs().is_ok())
        .map(|paths| paths.log_file());
    if let Some(log_path) = &log_path {
        trim_log_file_if_oversized(log_path, max_log_size);
        if let Ok(file) = OpenOptions::new().create(true).append(true).open(log_path) {
            loggers.push(WriteLogger::new(LevelFilter::Debug, config, file));
        }
    }

    let _ = CombinedLogger::init(loggers);

    if let Some(log_path) = log_path {
        log::debug!("Logging to {}", log_path.display());
    }
}

#[cfg(test)]
mod tests {
    use simplelog::LevelFilter;

    use super::{level_for, trim_log_file_if_oversized};

    #[test]
    fn trim_log_file_keeps_recent_half() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let log_path = temp_dir.path().join("pkgup.log");
        let original = "line-1\nline-2\nline-3\nline-4\nline-5\n";
        std::fs::write(&log_path, original).expect("test log file should be written");

        trim_log_file_if_oversized(&log_path, 10);

        let trimmed =
            std::fs::read_to_string(&log_path).expect("trimmed log file should be readable");
        assert!(trimmed.starts_with("line-4\n") || trimmed.starts_with("line-3\n"));
        assert!(!trimmed.contains("line-1"));
    }

    #[test]
    fn small_log_files_are_left_alone() {
        let temp_dir = tempfile::tempdir().expect("temporary directory should be created");
        let log_path = temp_dir.path().join("pkgup.log");
        std::fs::write(&log_path, "line-1\n").expect("test log file should be written");

        trim_log_file_if_oversized(&log_path, 1024);

        assert_eq!(
            std::fs::read_to_string(&log_path).expect("log file should be readable"),
            "line-1\n"
        );
    }

    #[test]
    fn debug_flag_selects_terminal_level() {
        assert_eq!(level_for(true), LevelFilter::Debug);
        assert_eq!(level_for(false), LevelFilter::Info);
    }
}
