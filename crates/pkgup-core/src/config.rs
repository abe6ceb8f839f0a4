use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("repo_url must not be empty")]
    EmptyRepoUrl,
    #[error("{field} must be an absolute path, got {}", .path.display())]
    RelativePath { field: &'static str, path: PathBuf },
}

/// Registry location and the two directories an updater works in.
///
/// Every way of obtaining a value (constructor, JSON) validates it and
/// normalizes both directories.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct UpdaterConfig {
    repo_url: String,
    install_dir: PathBuf,
    download_dir: PathBuf,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    repo_url: String,
    install_dir: PathBuf,
    download_dir: PathBuf,
}

impl TryFrom<RawConfig> for UpdaterConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        Self::new(raw.repo_url, raw.install_dir, raw.download_dir)
    }
}

impl UpdaterConfig {
    /// Build and validate a configuration.
    ///
    /// # Errors
    /// Returns an error when the registry URL is empty or a directory is not
    /// absolute.
    pub fn new(
        repo_url: impl Into<String>,
        install_dir: impl Into<PathBuf>,
        download_dir: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        Self {
            repo_url: repo_url.into(),
            install_dir: install_dir.into(),
            download_dir: download_dir.into(),
        }
        .validated()
    }

    /// Parse a JSON configuration object. Unknown keys are rejected.
    ///
    /// # Errors
    /// Returns an error when the JSON is malformed, has unknown or missing
    /// keys, or fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        Self::try_from(raw)
    }

    /// Load a JSON configuration file.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or its contents are not
    /// a valid configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&data)
    }

    /// Check field values without touching the filesystem.
    ///
    /// # Errors
    /// Returns the first field that is not acceptable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repo_url.trim().is_empty() {
            return Err(ConfigError::EmptyRepoUrl);
        }
        for (field, path) in [
            ("install_dir", &self.install_dir),
            ("download_dir", &self.download_dir),
        ] {
            if !path.is_absolute() {
                return Err(ConfigError::RelativePath {
                    field,
                    path: path.clone(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    #[must_use]
    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    #[must_use]
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub(crate) fn validated(mut self) -> Result<Self, ConfigError> {
        self.validate()?;
        self.install_dir = normalize_dir(&self.install_dir);
        self.download_dir = normalize_dir(&self.download_dir);
        Ok(self)
    }
}

/// Drop trailing and repeated separators so a later `join` adds exactly one.
pub(crate) fn normalize_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{ConfigError, UpdaterConfig, normalize_dir};
    use crate::error::{ErrorKind, UpdaterError};
    use crate::transport::MockTransport;
    use crate::updater::Updater;

    #[test]
    fn parses_json_config() {
        let config = UpdaterConfig::from_json_str(
            r#"{
                "repo_url": "http://localhost:8000/api/v1/package",
                "install_dir": "/srv/app/modules",
                "download_dir": "/srv/app/runtime/"
            }"#,
        )
        .expect("config should parse");

        assert_eq!(config.repo_url(), "http://localhost:8000/api/v1/package");
        assert_eq!(config.install_dir(), Path::new("/srv/app/modules"));
        assert_eq!(config.download_dir().as_os_str(), "/srv/app/runtime");
    }

    #[test]
    fn rejects_unknown_keys() {
        let result = UpdaterConfig::from_json_str(
            r#"{
                "repo_url": "http://localhost",
                "install_dir": "/a",
                "download_dir": "/b",
                "cache_dir": "/c"
            }"#,
        );

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn rejects_missing_keys() {
        let result = UpdaterConfig::from_json_str(r#"{"repo_url": "http://localhost"}"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn rejects_relative_directories_and_empty_url() {
        assert!(matches!(
            UpdaterConfig::new("http://localhost", "modules", "/tmp/dl"),
            Err(ConfigError::RelativePath {
                field: "install_dir",
                ..
            })
        ));
        assert!(matches!(
            UpdaterConfig::new("  ", "/tmp/in", "/tmp/dl"),
            Err(ConfigError::EmptyRepoUrl)
        ));
    }

    #[test]
    fn deserializing_directly_still_validates_and_normalizes() {
        let config: UpdaterConfig = serde_json::from_str(
            r#"{"repo_url": "http://localhost", "install_dir": "/a/", "download_dir": "/b//"}"#,
        )
        .expect("config should deserialize");
        assert_eq!(config.install_dir().as_os_str(), "/a");
        assert_eq!(config.download_dir().as_os_str(), "/b");

        let relative = serde_json::from_str::<UpdaterConfig>(
            r#"{"repo_url": "http://localhost", "install_dir": "a", "download_dir": "/b"}"#,
        );
        let empty_url = serde_json::from_str::<UpdaterConfig>(
            r#"{"repo_url": "", "install_dir": "/a", "download_dir": "/b"}"#,
        );
        let unknown_key = serde_json::from_str::<UpdaterConfig>(
            r#"{"repo_url": "http://localhost", "install_dir": "/a", "download_dir": "/b", "x": 1}"#,
        );
        assert!(relative.is_err());
        assert!(empty_url.is_err());
        assert!(unknown_key.is_err());
    }

    #[test]
    fn updater_rejects_struct_literal_config_that_skipped_validation() {
        let config = UpdaterConfig {
            repo_url: String::new(),
            install_dir: "relative_install".into(),
            download_dir: "relative_download//".into(),
        };

        let error = Updater::with_transport(config, MockTransport::new())
            .err()
            .expect("unvalidated config should be rejected");

        assert!(matches!(error, UpdaterError::Config(ConfigError::EmptyRepoUrl)));
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
        assert!(!Path::new("relative_install").exists());
    }

    #[test]
    fn updater_normalizes_struct_literal_directories() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let config = UpdaterConfig {
            repo_url: "http://localhost".to_string(),
            install_dir: temp.path().join("install//"),
            download_dir: format!("{}/download/", temp.path().display()).into(),
        };

        let updater =
            Updater::with_transport(config, MockTransport::new()).expect("updater should build");

        assert_eq!(
            updater.download_dir("x"),
            temp.path().join("download").join("x")
        );
        assert_eq!(updater.install_dir("x"), temp.path().join("install").join("x"));
        assert_eq!(updater.config().download_dir(), temp.path().join("download"));
    }

    #[test]
    fn load_reports_missing_file() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let result = UpdaterConfig::load(&temp.path().join("config.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn normalize_dir_strips_trailing_and_doubled_separators() {
        assert_eq!(normalize_dir(Path::new("/tmp/dl/")).as_os_str(), "/tmp/dl");
        assert_eq!(normalize_dir(Path::new("/tmp//dl//")).as_os_str(), "/tmp/dl");
        assert_eq!(normalize_dir(Path::new("/tmp/./dl")).as_os_str(), "/tmp/dl");
        assert_eq!(normalize_dir(Path::new("/")).as_os_str(), "/");
    }
}
