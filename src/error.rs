use thiserror::Error;

/// Generic message substituted when the transport fails and no structured
/// detail is available.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Errors that terminate a conversion attempt.
///
/// Every kind moves the controller to the `Failed` phase and is surfaced to
/// the view layer as a single human-readable string. Nothing is retried
/// automatically; retry is only via explicit user-initiated reset/resubmit.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Bad or empty URL, detected locally before any network call
    #[error("{0}")]
    Validation(String),

    /// Non-success HTTP response, carrying the server-supplied detail text
    #[error("{0}")]
    Remote(String),

    /// Network-level failure, no structured detail available
    #[error("{0}")]
    Transport(String),

    /// The backend explicitly reported failure for a job in progress
    #[error("{0}")]
    JobFailed(String),
}

impl ConvertError {
    /// Transport error with the generic network message.
    pub fn transport() -> Self {
        Self::Transport(NETWORK_ERROR_MESSAGE.to_string())
    }

    /// The human-readable message surfaced to the view layer.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::Remote(message)
            | Self::Transport(message)
            | Self::JobFailed(message) => message,
        }
    }
}
