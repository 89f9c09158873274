//! Error types shared across the crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request to {url} failed after {attempts} attempts")]
    RequestFailed { url: String, attempts: usize },

    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog reported an error: {0}")]
    Provider(String),

    #[error("failed to decode catalog response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("filesystem operation failed on {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to download {what}")]
    DownloadFailed {
        what: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Wrap a failure with the unit that was being downloaded, so a
    /// volume failure reads "failed to download volume X: failed to
    /// download chapter Y: ...".
    pub(crate) fn download_failed(what: impl Into<String>, source: Error) -> Self {
        Error::DownloadFailed {
            what: what.into(),
            source: Box::new(source),
        }
    }
}
