use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to open archive {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{context}: {source}")]
    Zip {
        context: &'static str,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("{context} {}: {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    fn io(context: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Extract every entry of a zip archive into `dest`, overwriting existing
/// files. Entries that would land outside `dest` are skipped.
///
/// # Errors
/// Returns an error when the archive cannot be opened or read, or when an
/// entry cannot be written.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> Result<(), ExtractError> {
    let file = std::fs::File::open(archive_path).map_err(|source| ExtractError::Open {
        path: archive_path.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|source| ExtractError::Zip {
        context: "failed to read zip archive",
        source,
    })?;

    std::fs::create_dir_all(dest)
        .map_err(|error| ExtractError::io("failed to create destination", dest, error))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|source| ExtractError::Zip {
            context: "failed to read zip entry",
            source,
        })?;
        let Some(name) = entry.enclosed_name() else {
            warn!("Skipping zip entry with unsafe path: {}", entry.name());
            continue;
        };
        let out_path = dest.join(name);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(|error| {
                ExtractError::io("failed to create directory", &out_path, error)
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                ExtractError::io("failed to create parent directory", parent, error)
            })?;
        }
        let mut outfile = std::fs::File::create(&out_path)
            .map_err(|error| ExtractError::io("failed to create file", &out_path, error))?;
        std::io::copy(&mut entry, &mut outfile)
            .map_err(|error| ExtractError::io("failed to write entry", &out_path, error))?;
        debug!("Extracted {}", out_path.display());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                let _ = std::fs::set_permissions(&out_path, std::fs::Permissions::from_mode(mode));
            }
        }
    }

    Ok(())
}

/// Boolean form of [`extract_archive`]: `false` when the archive cannot be
/// opened or unpacked. Never panics or propagates.
#[must_use]
pub fn extract_package(archive_path: &Path, dest: &Path) -> bool {
    match extract_archive(archive_path, dest) {
        Ok(()) => true,
        Err(error) => {
            warn!(
                "Extraction of {} into {} failed: {error}",
                archive_path.display(),
                dest.display()
            );
            false
        }
    }
}
