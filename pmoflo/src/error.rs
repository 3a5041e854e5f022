//! Error types for the FLO chart client
//!
//! Only two kinds of failure exist: the upstream request did not succeed
//! ([`RequestError`]) or its body did not have the expected shape
//! ([`ParseError`]). Nothing is retried or logged away here, both kinds are
//! handed back to the caller.

/// Result type alias for FLO chart operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when fetching or parsing the FLO chart
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP call did not return a usable response
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The response body did not match the chart schema
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Upstream HTTP failure
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Server answered with a status other than 200
    #[error("Request is invalid. response status code={0}")]
    Status(u16),

    /// DNS, connection, timeout or body read failure
    #[error("HTTP request failed: {0}")]
    Transport(#[from] ureq::Error),
}

/// Chart payload did not match the expected schema
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Body is not JSON, or a field has the wrong JSON type
    #[error("JSON parsing failed: {0}")]
    Json(#[source] serde_json::Error),

    /// A required key is absent
    #[error("Missing field: {path}")]
    Missing { path: String },

    /// Track has no cover image at all
    #[error("Track {index} has an empty album.imgList")]
    EmptyImageList { index: usize },

    /// `rankBadge` could not be read as a signed integer
    #[error("Track {index} has an invalid rank.rankBadge: {value}")]
    InvalidRankBadge { index: usize, value: String },

    /// Track position does not fit a chart rank
    #[error("Track {index} is beyond the last representable rank")]
    RankOverflow { index: usize },

    /// Snapshot could not be written out as JSON
    ///
    /// Kept with the payload errors so the crate exposes only request and
    /// parse failures; it wraps the same `serde_json` error type as
    /// [`ParseError::Json`].
    #[error("JSON serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl ParseError {
    pub(crate) fn missing(path: impl Into<String>) -> Self {
        Self::Missing { path: path.into() }
    }
}

impl Error {
    /// HTTP status carried by a [`RequestError::Status`], if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Request(RequestError::Status(code)) => Some(*code),
            _ => None,
        }
    }

    /// True for upstream request failures
    pub fn is_request(&self) -> bool {
        matches!(self, Error::Request(_))
    }

    /// True for schema/payload failures
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse(_))
    }
}
