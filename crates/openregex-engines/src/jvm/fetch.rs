//! Downloading checksum-verified artifacts from a list of mirrors.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use sha1::{Digest, Sha1};
use tracing::{error, info};

use crate::assets;
use crate::error::{FetchError, SetupError};

/// Tracing target for artifact downloads.
const FETCH_TARGET: &str = "openregex_engines::fetch";

/// Per-request timeout for mirror downloads.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest body accepted from a mirror.
const MAX_ARTIFACT_BYTES: u64 = 16 * 1024 * 1024;

/// A file identified by name and SHA-1 digest, available from several mirrors.
#[derive(Debug, Clone, Copy)]
pub struct Artifact {
    /// File name inside the destination directory.
    pub file_name: &'static str,
    /// Expected lowercase hex SHA-1 digest.
    pub sha1: &'static str,
    /// Mirrors tried in order.
    pub mirrors: &'static [&'static str],
}

/// The Gson jar used by the Java helper for JSON output.
pub const GSON: Artifact = Artifact {
    file_name: "gson-2.8.9.jar",
    sha1: "8a432c1d6825781e21a02db2e2c33c5fde2833b9",
    mirrors: &[
        "https://repo1.maven.org/maven2/com/google/code/gson/gson/2.8.9/gson-2.8.9.jar",
        "https://search.maven.org/remotecontent?filepath=com/google/code/gson/gson/2.8.9/gson-2.8.9.jar",
        "https://repo.spring.io/release/com/google/code/gson/gson/2.8.9/gson-2.8.9.jar",
    ],
};

/// Retrieves the raw bytes behind a URL.
///
/// The seam lets tests serve canned bodies without network access.
pub trait ArtifactFetcher: Send + Sync {
    /// Downloads `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the transfer fails.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetcher backed by a blocking HTTP client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
        }
    }
}

impl ArtifactFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|err| FetchError::Transport {
                url: url.to_owned(),
                message: err.to_string(),
            })?;
        let mut body = Vec::new();
        response
            .into_reader()
            .take(MAX_ARTIFACT_BYTES)
            .read_to_end(&mut body)
            .map_err(|err| FetchError::Body {
                url: url.to_owned(),
                source: Arc::new(err),
            })?;
        Ok(body)
    }
}

/// Lowercase hex SHA-1 digest of `bytes`.
pub(crate) fn sha1_hex(bytes: &[u8]) -> String {
    Sha1::digest(bytes)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Ensures `artifact` exists in `dir`, downloading it if missing.
///
/// Mirrors are tried in order. A body with the wrong digest is discarded and
/// the next mirror is tried; nothing is written until a body verifies.
///
/// # Errors
///
/// Returns [`SetupError::Download`] when no mirror delivers a verified body,
/// or [`SetupError::Io`] when the verified body cannot be stored.
pub fn ensure_artifact(
    dir: &Path,
    artifact: &Artifact,
    fetcher: &dyn ArtifactFetcher,
) -> Result<PathBuf, SetupError> {
    let path = dir.join(artifact.file_name);
    if path.exists() {
        return Ok(path);
    }
    info!(
        target: FETCH_TARGET,
        artifact = artifact.file_name,
        destination = %path.display(),
        "artifact missing, downloading"
    );
    for url in artifact.mirrors {
        match fetch_verified(url, artifact, fetcher) {
            Ok(body) => {
                assets::write_atomically(dir, &path, &body)?;
                info!(
                    target: FETCH_TARGET,
                    artifact = artifact.file_name,
                    url,
                    "artifact downloaded and verified"
                );
                return Ok(path);
            }
            Err(err) => {
                error!(
                    target: FETCH_TARGET,
                    artifact = artifact.file_name,
                    url,
                    error = %err,
                    "mirror failed"
                );
            }
        }
    }
    Err(SetupError::Download {
        artifact: artifact.file_name.to_owned(),
    })
}

fn fetch_verified(
    url: &str,
    artifact: &Artifact,
    fetcher: &dyn ArtifactFetcher,
) -> Result<Vec<u8>, SetupError> {
    let body = fetcher.fetch(url)?;
    let actual = sha1_hex(&body);
    if actual == artifact.sha1 {
        Ok(body)
    } else {
        Err(SetupError::ChecksumMismatch {
            url: url.to_owned(),
            expected: artifact.sha1.to_owned(),
            actual,
        })
    }
}
