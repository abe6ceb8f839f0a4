use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::extract::ExtractError;
use crate::transport::TransportError;
use crate::version::PackageVersion;

#[derive(Debug, Error)]
pub enum UpdaterError {
    #[error("directory {} not found and could not be created: {source}", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("directory {} is not writable: {source}", .path.display())]
    DirectoryNotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to parse registry response from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("can't downgrade from {current} to {target}")]
    Downgrade {
        current: PackageVersion,
        target: PackageVersion,
    },

    #[error("version {version} of {name} not found in registry")]
    VersionNotFound {
        name: String,
        version: PackageVersion,
    },

    #[error("registry lists no versions for {name}")]
    NoVersions { name: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid package name: {name:?}")]
    InvalidPackageName { name: String },

    #[error("can't copy source file {file} to {}: {source}", .path.display())]
    Transfer {
        file: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("can't extract source file {} to {}: {source}", .archive.display(), .destination.display())]
    Extraction {
        archive: PathBuf,
        destination: PathBuf,
        #[source]
        source: ExtractError,
    },
}

/// Coarse classification of an [`UpdaterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Directory,
    Network,
    Parse,
    Downgrade,
    VersionNotFound,
    InvalidInput,
    Transfer,
    Extraction,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Directory => "directory",
            Self::Network => "network",
            Self::Parse => "parse",
            Self::Downgrade => "downgrade",
            Self::VersionNotFound => "version not found",
            Self::InvalidInput => "invalid input",
            Self::Transfer => "transfer",
            Self::Extraction => "extraction",
        };
        f.write_str(label)
    }
}

impl UpdaterError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CreateDirectory { .. } | Self::DirectoryNotWritable { .. } => {
                ErrorKind::Directory
            }
            Self::Network { .. } => ErrorKind::Network,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Downgrade { .. } => ErrorKind::Downgrade,
            Self::VersionNotFound { .. } | Self::NoVersions { .. } => ErrorKind::VersionNotFound,
            Self::Config(_) | Self::InvalidPackageName { .. } => ErrorKind::InvalidInput,
            Self::Transfer { .. } => ErrorKind::Transfer,
            Self::Extraction { .. } => ErrorKind::Extraction,
        }
    }

    pub(crate) fn network(url: impl Into<String>, source: TransportError) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }
}
