use thiserror::Error;

/// Failures raised by calls against the price-comparison API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("GET {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("GET {url}: unexpected status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("GET {url}: malformed payload: {source}")]
    Data {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// True when the request never produced a usable response.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Status { .. })
    }
}
