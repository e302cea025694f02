//! Errors for this crate.
//! About anyhow: see https://github.com/TrueLayer/reqwest-middleware/issues/119

use crate::types::RequestId;
use camino::Utf8PathBuf;
use crate::wait::RequestHandle;
use reqwest::StatusCode;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum InvalidApiUrl {
    #[error("Given URL does not start with \"http://\" or \"https://\": {0}")]
    Protocol(String),

    #[error("Given URL has no host: {0}")]
    MissingHost(String),
}

aliri_braid::from_infallible!(InvalidApiUrl);

/// Errors representing failed interactions with the Crucible API.
#[derive(thiserror::Error, Debug)]
pub enum CrucibleError {
    /// Error response with an explanation from the API.
    #[error("({status:?} {reason:?}): {text}")]
    Error {
        status: StatusCode,
        reason: &'static str,
        text: String,
        source: reqwest::Error,
    },

    /// Failure without a response from the API, e.g. connection refused.
    #[error(transparent)]
    Raw(#[from] reqwest::Error),

    /// Error from reqwest middleware function.
    #[error(transparent)]
    Middleware(anyhow::Error),

    /// Response body could not be decoded.
    #[error("Malformed response from Crucible: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl CrucibleError {
    /// HTTP status code of an error response, if the API responded at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CrucibleError::Error { status, .. } => Some(*status),
            CrucibleError::Raw(e) => e.status(),
            _ => None,
        }
    }

    /// Whether this error happened in transport (no well-formed response).
    pub fn is_transport(&self) -> bool {
        match self {
            CrucibleError::Raw(e) => e.status().is_none(),
            CrucibleError::Middleware(_) => true,
            _ => false,
        }
    }
}

pub(crate) async fn check(res: reqwest::Response) -> Result<reqwest::Response, CrucibleError> {
    match res.error_for_status_ref() {
        Ok(_) => Ok(res),
        Err(source) => {
            let status = res.status();
            let reason = status.canonical_reason().unwrap_or("unknown reason");
            let text = res.text().await.map_err(CrucibleError::Raw)?;
            Err(CrucibleError::Error {
                status,
                reason,
                text,
                source,
            })
        }
    }
}

impl From<reqwest_middleware::Error> for CrucibleError {
    fn from(error: reqwest_middleware::Error) -> Self {
        match error {
            reqwest_middleware::Error::Middleware(e) => CrucibleError::Middleware(e),
            reqwest_middleware::Error::Reqwest(e) => CrucibleError::Raw(e),
        }
    }
}

/// An error which might occur while uploading or downloading files.
#[derive(thiserror::Error, Debug)]
pub enum FileIOError {
    #[error("\"{0}\" is an invalid file path")]
    PathError(String),
    #[error(transparent)]
    Crucible(CrucibleError),
    #[error(transparent)]
    IO(std::io::Error),
}

impl From<reqwest::Error> for FileIOError {
    fn from(e: reqwest::Error) -> Self {
        FileIOError::Crucible(CrucibleError::Raw(e))
    }
}

impl From<reqwest_middleware::Error> for FileIOError {
    fn from(e: reqwest_middleware::Error) -> Self {
        FileIOError::Crucible(e.into())
    }
}

impl From<CrucibleError> for FileIOError {
    fn from(e: CrucibleError) -> Self {
        FileIOError::Crucible(e)
    }
}

impl From<std::io::Error> for FileIOError {
    fn from(e: std::io::Error) -> Self {
        FileIOError::IO(e)
    }
}

/// Error from a `get_or_add_*` helper.
#[derive(thiserror::Error, Debug)]
pub enum GetOrAddError {
    #[error(transparent)]
    Crucible(#[from] CrucibleError),

    /// Not found in Crucible, and the lookup function did not produce it either.
    #[error("{kind} \"{id}\" not found in Crucible or by the given lookup function")]
    NotFound { kind: &'static str, id: String },
}

/// The dataset type given to [crate::parsers::DatasetType]'s `FromStr` is not known.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown dataset type '{given}'. Available types: {available}")]
pub struct UnknownDatasetType {
    pub given: String,
    pub available: String,
}

/// Error reading a dataset's files with a [crate::parsers::DatasetType] parser.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("No input files given")]
    NoFiles,

    #[error("{file}:{line}: {message}")]
    Syntax {
        file: Utf8PathBuf,
        line: usize,
        message: String,
    },

    #[error("{0} does not name a data file with read_data")]
    NoDataFile(Utf8PathBuf),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

/// Reasons why waiting for a processing request did not produce a terminal status.
///
/// A request which finished with status "failed" is _not_ an error.
#[derive(thiserror::Error, Debug)]
pub enum WaitError<E: std::error::Error + 'static = CrucibleError> {
    /// The status query failed. Polling stopped at the first failure.
    #[error(transparent)]
    Status(E),

    /// The wait policy's time or poll budget ran out.
    #[error("Gave up waiting for {handle} after {polls} polls ({elapsed:?})")]
    Timeout {
        handle: RequestHandle,
        elapsed: Duration,
        polls: u32,
    },

    /// The caller cancelled the wait.
    #[error("Cancelled waiting for {handle} after {polls} polls")]
    Cancelled { handle: RequestHandle, polls: u32 },
}

impl<E: std::error::Error + 'static> WaitError<E> {
    /// ID of the request being waited on, when the error carries it.
    pub fn request_id(&self) -> Option<&RequestId> {
        match self {
            WaitError::Status(_) => None,
            WaitError::Timeout { handle, .. } => Some(&handle.request_id),
            WaitError::Cancelled { handle, .. } => Some(&handle.request_id),
        }
    }
}
