use std::path::Path;
use std::time::Duration;

use log::debug;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} failed with HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// Blocking fetch of a registry document or artifact.
///
/// Every call blocks until the whole body is available. Implementations that
/// need timeouts or retries wrap another transport.
#[cfg_attr(test, automock)]
pub trait Transport {
    /// Fetch the full body behind `location`.
    ///
    /// # Errors
    /// Returns an error when the resource cannot be reached or read.
    fn fetch(&self, location: &str) -> Result<Vec<u8>, TransportError>;
}

/// Default transport: HTTP(S) through `reqwest`, local files otherwise.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Build a transport with no request timeout.
    ///
    /// # Errors
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .user_agent(format!("pkgup/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TransportError::ClientBuild)?;
        Ok(Self { client })
    }

    #[must_use]
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }

    fn fetch_http(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        response
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, TransportError> {
        if is_http(location) {
            debug!("GET {location}");
            return self.fetch_http(location);
        }

        let path = location.strip_prefix("file://").unwrap_or(location);
        debug!("Reading {path}");
        std::fs::read(Path::new(path)).map_err(|source| TransportError::Read {
            path: path.to_string(),
            source,
        })
    }
}

fn is_http(location: &str) -> bool {
    let lower = location.get(..8).unwrap_or(location).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::{HttpTransport, Transport, TransportError, is_http};

    #[test]
    fn recognizes_http_schemes() {
        assert!(is_http("http://host/p.zip"));
        assert!(is_http("HTTPS://host/p.zip"));
        assert!(!is_http("file:///tmp/p.zip"));
        assert!(!is_http("/tmp/p.zip"));
        assert!(!is_http("ht"));
    }

    #[test]
    fn reads_local_paths_and_file_urls() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join("p-1.0.zip");
        std::fs::write(&path, b"payload").expect("fixture should be written");

        let transport = HttpTransport::new().expect("client should build");
        let plain = transport
            .fetch(&path.to_string_lossy())
            .expect("plain path should be readable");
        let url = transport
            .fetch(&format!("file://{}", path.display()))
            .expect("file url should be readable");

        assert_eq!(plain, b"payload");
        assert_eq!(url, b"payload");
    }

    #[test]
    fn missing_local_file_is_a_read_error() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let missing = temp.path().join("missing.zip");

        let transport = HttpTransport::new().expect("client should build");
        let error = transport
            .fetch(&missing.to_string_lossy())
            .expect_err("missing file should fail");

        assert!(matches!(error, TransportError::Read { .. }));
        assert!(error.to_string().contains("missing.zip"));
    }
}
