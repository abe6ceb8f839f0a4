use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::UpdaterConfig;
use crate::error::UpdaterError;
use crate::extract::extract_archive;
use crate::registry::{PackageInfo, VersionEntry, query_url};
use crate::transport::{HttpTransport, Transport};
use crate::version::PackageVersion;

const WRITE_PROBE_NAME: &str = ".pkgup-write-probe";

/// How `install`/`update` surface download and extraction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Return the failure as `Err`.
    Raise,
    /// Return the failure as `Ok(Outcome::Failed(..))`.
    #[default]
    Report,
}

/// Result of an install or update that got as far as downloading.
#[derive(Debug)]
pub enum Outcome {
    Installed(PackageVersion),
    Failed(UpdaterError),
}

impl Outcome {
    #[must_use]
    pub fn version(&self) -> Option<&PackageVersion> {
        match self {
            Self::Installed(version) => Some(version),
            Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn is_installed(&self) -> bool {
        matches!(self, Self::Installed(_))
    }

    /// Convert into a plain `Result`, turning a reported failure into `Err`.
    ///
    /// # Errors
    /// Returns the reported failure.
    pub fn into_result(self) -> Result<PackageVersion, UpdaterError> {
        match self {
            Self::Installed(version) => Ok(version),
            Self::Failed(error) => Err(error),
        }
    }
}

/// Fetches package metadata from a registry and installs package archives.
///
/// Registry responses are cached per package name for the lifetime of the
/// updater and never refetched.
pub struct Updater<T: Transport = HttpTransport> {
    config: UpdaterConfig,
    transport: T,
    cache: HashMap<String, PackageInfo>,
}

impl Updater<HttpTransport> {
    /// Create an updater that talks to the registry over HTTP.
    ///
    /// # Errors
    /// Returns an error when the HTTP client cannot be built or either
    /// directory cannot be created or written to.
    pub fn new(config: UpdaterConfig) -> Result<Self, UpdaterError> {
        let transport = HttpTransport::new().map_err(|source| UpdaterError::Network {
            url: config.repo_url().to_string(),
            source,
        })?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> Updater<T> {
    /// Create an updater over a custom transport.
    ///
    /// # Errors
    /// Returns an error when the configuration is invalid, or when the
    /// install or download directory cannot be created or is not writable.
    pub fn with_transport(config: UpdaterConfig, transport: T) -> Result<Self, UpdaterError> {
        let updater = Self {
            config: config.validated()?,
            transport,
            cache: HashMap::new(),
        };
        prepare_directory(&updater.install_dir(""))?;
        prepare_directory(&updater.download_dir(""))?;
        Ok(updater)
    }

    #[must_use]
    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    #[must_use]
    pub fn download_dir(&self, name: &str) -> PathBuf {
        join_dir(self.config.download_dir(), name)
    }

    #[must_use]
    pub fn install_dir(&self, name: &str) -> PathBuf {
        join_dir(self.config.install_dir(), name)
    }

    /// Return version metadata for `name`, querying the registry only on the
    /// first call for that name.
    ///
    /// # Errors
    /// Returns an error when the name is invalid, the registry cannot be
    /// reached, or the response is not valid version metadata.
    pub fn get_info(&mut self, name: &str) -> Result<&PackageInfo, UpdaterError> {
        validate_name(name)?;

        if self.cache.contains_key(name) {
            debug!("Using cached registry info for {name}");
        } else {
            let url = query_url(self.config.repo_url(), name);
            info!("Querying registry for {name}: {url}");
            let body = self
                .transport
                .fetch(&url)
                .map_err(|source| UpdaterError::network(url.clone(), source))?;
            let info = PackageInfo::from_slice(&body)
                .map_err(|source| UpdaterError::Parse { url, source })?;
            debug!("Registry lists {} version(s) for {name}", info.versions.len());
            self.cache.insert(name.to_string(), info);
        }

        Ok(&self.cache[name])
    }

    /// True when the registry lists any version greater than or equal to
    /// `current_version`.
    ///
    /// # Errors
    /// Returns an error when the registry query fails.
    pub fn check_new_version(
        &mut self,
        name: &str,
        current_version: &PackageVersion,
    ) -> Result<bool, UpdaterError> {
        let info = self.get_info(name)?;
        Ok(info
            .versions
            .iter()
            .any(|entry| entry.version >= *current_version))
    }

    /// Install the first version the registry lists for `name`.
    ///
    /// # Errors
    /// Always returns `Err` for registry failures and empty version lists.
    /// Download and extraction failures are `Err` under
    /// [`FailureMode::Raise`] and `Ok(Outcome::Failed(..))` under
    /// [`FailureMode::Report`].
    pub fn install(&mut self, name: &str, mode: FailureMode) -> Result<Outcome, UpdaterError> {
        let entry = self
            .get_info(name)?
            .versions
            .first()
            .cloned()
            .ok_or_else(|| UpdaterError::NoVersions {
                name: name.to_string(),
            })?;

        info!("Installing {name} {}", entry.version);
        self.deploy(name, entry, mode)
    }

    /// Update `name` from `current_version`.
    ///
    /// Without a target, the first version the registry lists is installed.
    /// With a target, the first entry equal to it is installed.
    ///
    /// # Errors
    /// Always returns `Err` when the target is not above `current_version`,
    /// when the target is not listed, and for registry failures. Download
    /// and extraction failures follow `mode`.
    pub fn update(
        &mut self,
        name: &str,
        current_version: &PackageVersion,
        update_to_version: Option<&PackageVersion>,
        mode: FailureMode,
    ) -> Result<Outcome, UpdaterError> {
        if let Some(target) = update_to_version
            && current_version >= target
        {
            return Err(UpdaterError::Downgrade {
                current: current_version.clone(),
                target: target.clone(),
            });
        }

        let info = self.get_info(name)?;
        let entry = match update_to_version {
            None => info.versions.first().cloned().ok_or_else(|| UpdaterError::NoVersions {
                name: name.to_string(),
            })?,
            Some(target) => info
                .versions
                .iter()
                .find(|entry| entry.version == *target)
                .cloned()
                .ok_or_else(|| UpdaterError::VersionNotFound {
                    name: name.to_string(),
                    version: target.clone(),
                })?,
        };

        info!("Updating {name} from {current_version} to {}", entry.version);
        self.deploy(name, entry, mode)
    }

    fn deploy(
        &self,
        name: &str,
        entry: VersionEntry,
        mode: FailureMode,
    ) -> Result<Outcome, UpdaterError> {
        let result = self
            .download(&entry)
            .and_then(|archive| self.unpack(name, &archive));

        match (result, mode) {
            (Ok(()), _) => {
                info!("Installed {name} {}", entry.version);
                Ok(Outcome::Installed(entry.version))
            }
            (Err(error), FailureMode::Raise) => Err(error),
            (Err(error), FailureMode::Report) => {
                warn!("Installing {name} {} failed: {error}", entry.version);
                Ok(Outcome::Failed(error))
            }
        }
    }

    fn download(&self, entry: &VersionEntry) -> Result<PathBuf, UpdaterError> {
        let file_name = entry.artifact_name().ok_or_else(|| UpdaterError::Transfer {
            file: entry.file.clone(),
            path: self.download_dir(""),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "artifact reference has no file name",
            ),
        })?;
        let dest = self.download_dir(file_name);

        info!("Downloading {} to {}", entry.file, dest.display());
        let bytes = self
            .transport
            .fetch(&entry.file)
            .map_err(|source| UpdaterError::network(entry.file.clone(), source))?;
        if bytes.is_empty() {
            return Err(UpdaterError::Transfer {
                file: entry.file.clone(),
                path: dest,
                source: std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "artifact body is empty",
                ),
            });
        }

        std::fs::write(&dest, &bytes).map_err(|source| UpdaterError::Transfer {
            file: entry.file.clone(),
            path: dest.clone(),
            source,
        })?;
        debug!("Wrote {} bytes to {}", bytes.len(), dest.display());
        Ok(dest)
    }

    fn unpack(&self, name: &str, archive: &Path) -> Result<(), UpdaterError> {
        let destination = self.install_dir(name);
        info!(
            "Extracting {} into {}",
            archive.display(),
            destination.display()
        );
        extract_archive(archive, &destination).map_err(|source| UpdaterError::Extraction {
            archive: archive.to_path_buf(),
            destination,
            source,
        })
    }
}

fn join_dir(base: &Path, name: &str) -> PathBuf {
    if name.is_empty() {
        base.to_path_buf()
    } else {
        base.join(name)
    }
}

fn validate_name(name: &str) -> Result<(), UpdaterError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '?', '#', '%'])
        || name.chars().any(|ch| ch.is_control() || ch.is_whitespace());
    if invalid {
        Err(UpdaterError::InvalidPackageName {
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

fn prepare_directory(dir: &Path) -> Result<(), UpdaterError> {
    if !dir.is_dir() {
        debug!("Creating directory {}", dir.display());
        std::fs::create_dir_all(dir).map_err(|source| UpdaterError::CreateDirectory {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let probe = dir.join(WRITE_PROBE_NAME);
    std::fs::write(&probe, b"test").map_err(|source| UpdaterError::DirectoryNotWritable {
        path: dir.to_path_buf(),
        source,
    })?;
    std::fs::remove_file(&probe).map_err(|source| UpdaterError::DirectoryNotWritable {
        path: dir.to_path_buf(),
        source,
    })?;
    debug!("Directory {} is writable", dir.display());
    Ok(())
}
