//! The single error shape returned by every remote operation.
//!
//! Whatever goes wrong while talking to YouTube ends up as one of three variants:
//!
//! - [`YtError::Message`] for local failures: missing tokens, bodies that fail to decode,
//!   lookups that came back empty, or transitions the API refused.
//! - [`YtError::System`] for transport failures, carrying the HTTP status when there was one
//!   (or `0` if the request never got that far).
//! - [`YtError::Api`] when the API answered but reported an `error` object in the payload.

/// Error type for all YouTube Live operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum YtError {
    /// A local, validation or parsing failure with no remote status code.
    #[error("{0}")]
    Message(String),
    /// The HTTP exchange itself failed.
    #[error("System error: {code}\n{message}")]
    System { code: u16, message: String },
    /// The API reported an error object in an otherwise well-formed exchange.
    #[error("Api error: {code}\n{message}")]
    Api {
        code: u16,
        message: String,
        /// The raw response body, kept for callers that want the full `errors[]` detail.
        payload: serde_json::Value,
    },
}

impl YtError {
    pub(crate) fn message(text: impl Into<String>) -> Self {
        Self::Message(text.into())
    }

    /// Human-readable rendering, as delivered to launch observers.
    pub fn display_message(&self) -> String {
        self.to_string()
    }

    /// The remote status code, if this error came from the remote side.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Message(_) => None,
            Self::System { code, .. } | Self::Api { code, .. } => Some(*code),
        }
    }
}

impl From<reqwest::Error> for YtError {
    fn from(e: reqwest::Error) -> Self {
        Self::System {
            code: e.status().map_or(0, |s| s.as_u16()),
            message: e.to_string(),
        }
    }
}
