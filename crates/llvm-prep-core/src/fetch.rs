//! Single-stream HTTP GET of the source archive.
//!
//! Uses the curl crate (libcurl) and writes the response body sequentially to
//! the destination file, truncating anything already there.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Error returned by [`download_to_file`].
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (DNS, connection, TLS, timeout).
    #[error(transparent)]
    Curl(#[from] curl::Error),
    /// Response had a non-2xx status after following redirects.
    #[error("GET {url} returned HTTP {code}")]
    Http { url: String, code: u32 },
    /// Destination file could not be created or written.
    #[error("storage {}", path.display())]
    Storage { path: PathBuf, source: io::Error },
}

/// libcurl knobs for the archive download.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    pub max_redirections: u32,
    /// Abort when throughput stays below `low_speed_limit` bytes/s for `low_speed_time`.
    /// 0 leaves a slow transfer running for as long as it takes.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            max_redirections: 10,
            low_speed_limit: 0,
            low_speed_time: Duration::from_secs(60),
        }
    }
}

/// Downloads `url` with a single GET into `dest`. Returns the number of bytes written.
pub fn download_to_file(url: &str, dest: &Path, opts: FetchOptions) -> Result<u64, FetchError> {
    let storage_err = |source| FetchError::Storage {
        path: dest.to_path_buf(),
        source,
    };
    let mut file = File::create(dest).map_err(storage_err)?;
    let mut written = 0u64;
    let mut write_failure: Option<io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(opts.max_redirections)?;
    easy.connect_timeout(opts.connect_timeout)?;
    if opts.low_speed_limit > 0 {
        easy.low_speed_limit(opts.low_speed_limit)?;
        easy.low_speed_time(opts.low_speed_time)?;
    }

    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match file.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_failure = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    if let Some(e) = write_failure {
        return Err(storage_err(e));
    }
    performed?;
    file.flush().map_err(storage_err)?;

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http {
            url: url.to_string(),
            code,
        });
    }

    tracing::debug!("downloaded {} bytes from {} to {}", written, url, dest.display());
    Ok(written)
}
