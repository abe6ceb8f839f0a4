use serde::{Deserialize, Serialize};

use crate::version::PackageVersion;

/// Version metadata returned by the registry for one package.
///
/// `versions` keeps the registry's order; selection always walks it front to
/// back. Any other fields of the registry object are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub versions: Vec<VersionEntry>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: PackageVersion,
    pub file: String,
}

impl VersionEntry {
    /// Base name of the artifact reference, used as the download file name.
    #[must_use]
    pub fn artifact_name(&self) -> Option<&str> {
        let without_query = self.file.split(['?', '#']).next().unwrap_or_default();
        let name = without_query.rsplit(['/', '\\']).next()?;
        if name.is_empty() || name == "." || name == ".." {
            None
        } else {
            Some(name)
        }
    }
}

impl PackageInfo {
    /// Parse a registry response body.
    ///
    /// # Errors
    /// Returns an error when the body is not JSON or lacks a well-formed
    /// `versions` array.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

#[must_use]
pub(crate) fn query_url(repo_url: &str, name: &str) -> String {
    format!("{}/{name}/?format=json", repo_url.trim_end_matches('/'))
}
