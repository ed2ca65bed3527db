use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// Pipeline stage that issued a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Login,
    Search,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Login => f.write_str("login"),
            Stage::Search => f.write_str("search"),
        }
    }
}

/// Failures that abort the whole run.
#[derive(Debug, Error)]
pub enum UsdbError {
    #[error("USDB login failed")]
    AuthFailed,

    #[error("USDB is not responding (search returned HTTP {0})")]
    UpstreamUnavailable(StatusCode),

    #[error("{stage} request failed: {source}")]
    Request {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid USDB base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl UsdbError {
    pub(crate) fn request(stage: Stage) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| UsdbError::Request { stage, source }
    }
}

/// Reasons a single candidate is dropped. None of these stop the run.
#[derive(Debug, Error)]
pub enum SoftFailure {
    #[error("download returned HTTP {0}")]
    DownloadStatus(StatusCode),

    #[error("download failed: {0}")]
    DownloadFailed(#[source] reqwest::Error),

    #[error("not a valid zip archive: {0}")]
    InvalidArchive(#[source] zip::result::ZipError),

    #[error("archive has no .txt entry")]
    NoTextEntry,

    #[error("could not read archive entry {name}: {source}")]
    UnreadableEntry {
        name: String,
        #[source]
        source: std::io::Error,
    },
}
