//! Registry-driven package installer.
//!
//! The [`Updater`] queries a package registry for the versions of a package,
//! downloads the artifact for the selected version and unpacks it into the
//! install directory:
//! - Configuration and directory layout.
//! - Registry metadata types and the version ordering used for selection.
//! - A blocking transport seam with an HTTP/local-file default.
//! - Zip extraction.

mod config;
mod error;
mod extract;
mod registry;
mod transport;
mod updater;
mod version;

/// Updater configuration and its validation errors.
pub use config::{ConfigError, UpdaterConfig};
/// Error type returned by updater operations.
pub use error::{ErrorKind, UpdaterError};
/// Zip extraction into a destination directory.
pub use extract::{ExtractError, extract_archive, extract_package};
/// Registry metadata model.
pub use registry::{PackageInfo, VersionEntry};
/// Blocking fetch seam and its default implementation.
pub use transport::{HttpTransport, Transport, TransportError};
/// The update workflow.
pub use updater::{FailureMode, Outcome, Updater};
/// Registry version identifier with a total order.
pub use version::PackageVersion;
