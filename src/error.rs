use thiserror::Error;

/// Failures talking to the query service. Any of these is shown to the user
/// as the same apology; the variant only matters for the log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("response from {url} (status {status}) is not valid JSON: {source}")]
    Decode {
        url: String,
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("query task ended without a response: {0}")]
    Aborted(String),
}
