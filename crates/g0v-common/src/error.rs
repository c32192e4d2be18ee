use reqwest::StatusCode;

/// Error types shared by the g0v.se tooling.
///
/// These cover the transport layer only (HTTP, JSON decoding of upstream bodies).
/// Application-specific errors are defined in each binary crate and wrap
/// `CommonError` via `#[from]`.
#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid JSON from {url}: {source}")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("upstream {url} returned status={status} body={body}")]
    Upstream {
        url: String,
        status: StatusCode,
        body: String,
    },
}

impl CommonError {
    /// The URL the failing request was sent to, empty for client construction errors.
    pub fn url(&self) -> &str {
        match self {
            CommonError::Client(_) => "",
            CommonError::Request { url, .. }
            | CommonError::InvalidJson { url, .. }
            | CommonError::Upstream { url, .. } => url,
        }
    }
}
