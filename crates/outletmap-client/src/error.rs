use thiserror::Error;

/// Errors returned by [`crate::OutletClient`] and [`crate::ChatStream`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The server answered successfully but sent nothing to stream.
    #[error("response from {url} has no body")]
    MissingBody { url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("no data from {url} within {secs}s")]
    Timeout { url: String, secs: u64 },
}

impl ClientError {
    /// `true` when the server answered but the answer was unusable, as opposed
    /// to the request never completing.
    #[must_use]
    pub fn is_bad_response(&self) -> bool {
        matches!(
            self,
            ClientError::UnexpectedStatus { .. } | ClientError::MissingBody { .. }
        )
    }
}
