//! Package download over HTTPS into the scratch directory.
//!
//! The HTTP side sits behind [`PackageFetcher`] so the pipeline can be
//! driven without network access. URL checks always run in
//! [`fetch_package`], before any implementation is reached.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{Result, ValidatorError};

/// Scheme every add-on URL must use.
pub const REQUIRED_SCHEME: &str = "https://";

/// Extension every add-on package must carry.
pub const PACKAGE_EXTENSION: &str = ".nvda-addon";

/// File name of the downloaded package inside the scratch directory.
pub const ARCHIVE_FILE_NAME: &str = "addon.nvda-addon";

/// Size of each read from the response body.
pub const DOWNLOAD_BLOCK_SIZE: usize = 8 * 1024;

/// Something that can download a package to a local file.
///
/// Synchronous. Implementations write the body to `dest`, replacing any
/// existing file, and return the number of bytes written.
pub trait PackageFetcher {
    fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Check that `url` uses a secure scheme and names a package file.
pub fn check_url(url: &str) -> Result<()> {
    if !url.starts_with(REQUIRED_SCHEME) {
        return Err(ValidatorError::InputContract {
            url: url.to_string(),
            reason: "add-on url should start with https".to_string(),
        });
    }
    if !url.ends_with(PACKAGE_EXTENSION) {
        return Err(ValidatorError::InputContract {
            url: url.to_string(),
            reason: format!("add-on url should end with {PACKAGE_EXTENSION}"),
        });
    }
    Ok(())
}

/// Path of the downloaded package inside `scratch_dir`.
#[must_use]
pub fn archive_path(scratch_dir: &Path) -> PathBuf {
    scratch_dir.join(ARCHIVE_FILE_NAME)
}

/// Validate `url`, then download it into the scratch directory.
///
/// Returns the local path of the package. The file name is fixed, so two
/// runs sharing a scratch directory overwrite each other.
pub fn fetch_package(
    fetcher: &dyn PackageFetcher,
    url: &str,
    scratch_dir: &Path,
) -> Result<PathBuf> {
    check_url(url)?;
    std::fs::create_dir_all(scratch_dir)?;
    let dest = archive_path(scratch_dir);
    let written = fetcher.download(url, &dest)?;
    tracing::debug!(url, bytes = written, dest = %dest.display(), "package downloaded");
    Ok(dest)
}

/// Which side of a [`copy_declared`] call failed.
#[derive(Debug)]
pub enum CopyError {
    /// The source failed after `copied` bytes had been written.
    Read {
        copied: u64,
        source: std::io::Error,
    },
    /// The destination refused a write.
    Write(std::io::Error),
}

/// Copy `reader` into `writer` in [`DOWNLOAD_BLOCK_SIZE`] chunks.
///
/// When `declared` is known, never asks for more than the remaining
/// declared bytes, so the final read is sized to the tail of the body.
/// Without it the reader is drained to EOF. Returns the bytes copied.
pub fn copy_declared<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    declared: Option<u64>,
) -> std::result::Result<u64, CopyError> {
    let mut buf = [0u8; DOWNLOAD_BLOCK_SIZE];
    let mut read: u64 = 0;
    loop {
        let chunk = match declared {
            Some(size) => {
                let remaining = size.saturating_sub(read);
                if remaining == 0 {
                    break;
                }
                usize::try_from(remaining).map_or(DOWNLOAD_BLOCK_SIZE, |r| {
                    r.min(DOWNLOAD_BLOCK_SIZE)
                })
            }
            None => DOWNLOAD_BLOCK_SIZE,
        };
        let n = match reader.read(&mut buf[..chunk]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(CopyError::Read {
                    copied: read,
                    source,
                })
            }
        };
        writer.write_all(&buf[..n]).map_err(CopyError::Write)?;
        read += n as u64;
    }
    Ok(read)
}

fn truncated(written: u64, declared: Option<u64>) -> String {
    match declared {
        Some(size) => format!("transfer truncated: received {written} of {size} bytes"),
        None => format!("transfer interrupted after {written} bytes"),
    }
}

/// HTTPS fetcher backed by a blocking `ureq` agent.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
        }
    }
}

impl PackageFetcher for HttpFetcher {
    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let transport = |reason: String| ValidatorError::Transport {
            url: url.to_string(),
            reason,
        };

        let response = self
            .agent
            .get(url)
            // Content-Length must describe the bytes we actually read.
            .header("Accept-Encoding", "identity")
            .call()
            .map_err(|e| transport(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(transport(format!("Download failed with code {status}")));
        }

        let declared = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        if declared.is_none() {
            tracing::warn!(url, "response has no usable content-length; reading to EOF");
        }

        let mut reader = response.into_body().into_reader();
        let mut file = File::create(dest)?;
        // Connection failures are transport errors; disk failures stay Io.
        let written = match copy_declared(&mut reader, &mut file, declared) {
            Ok(n) => n,
            Err(CopyError::Read { copied, source }) => {
                let reason = truncated(copied, declared);
                return Err(transport(format!("{reason} ({source})")));
            }
            Err(CopyError::Write(e)) => return Err(e.into()),
        };
        file.flush()?;

        if declared.is_some_and(|size| written < size) {
            return Err(transport(truncated(written, declared)));
        }
        Ok(written)
    }
}
