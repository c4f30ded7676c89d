use thiserror::Error;

/// Errors from the collection API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP client could not be built (TLS backend failure).
    #[error("client init: {0}")]
    ClientInit(String),

    /// Request failed at the transport level (connect, timeout, body read).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {code}: {body}")]
    HttpStatus { code: u16, body: String },

    /// Response body did not match the expected shape.
    #[error("failed to parse {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The token provider had no credential. Terminal for this call; the
    /// client never retries or refreshes on its own.
    #[error("no credential available")]
    MissingAuth,
}

impl ApiError {
    /// Whether the failure is likely transient. Callers may offer a retry
    /// action; the client itself never retries.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::HttpStatus { code, .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }

    /// Whether the failure is an authentication problem.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::MissingAuth | Self::HttpStatus { code: 401 | 403, .. })
    }
}
