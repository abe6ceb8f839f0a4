use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppPathsError {
    #[error("Could not determine config directory")]
    ConfigDirUnavailable,
    #[error("Could not determine data directory")]
    DataDirUnavailable,
}

/// Per-user locations for the updater's own files.
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Resolve application paths for the current platform.
    ///
    /// # Errors
    /// Returns an error when the user config or data directory cannot be
    /// determined.
    pub fn new() -> Result<Self, AppPathsError> {
        Ok(Self {
            config_dir: dirs::config_dir()
                .ok_or(AppPathsError::ConfigDirUnavailable)?
                .join("pkgup"),
            data_dir: dirs::data_dir()
                .ok_or(AppPathsError::DataDirUnavailable)?
                .join("pkgup"),
        })
    }

    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("pkgup.log")
    }

    /// Ensure the application directories exist on disk.
    ///
    /// # Errors
    /// Returns an error if a directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::AppPaths;

    fn test_paths(root: &Path) -> AppPaths {
        AppPaths {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    #[test]
    fn file_paths_use_expected_filenames() {
        let paths = test_paths(Path::new("/home/user"));

        assert!(
            paths
                .config_file()
                .ends_with(Path::new("config").join("config.json"))
        );
        assert!(
            paths
                .log_file()
                .ends_with(Path::new("data").join("pkgup.log"))
        );
    }

    #[test]
    fn ensure_dirs_creates_all_directories() {
        let root = std::env::temp_dir().join(format!("pkgup-paths-test-{}", std::process::id()));
        let paths = test_paths(&root);

        paths
            .ensure_dirs()
            .expect("ensure_dirs should create application directories");

        assert!(paths.config_dir.is_dir());
        assert!(paths.data_dir.is_dir());

        let _ = std::fs::remove_dir_all(root);
    }
}
