//! Huginn error types

/// Terminal failure of a fetch operation, as seen by callers.
///
/// Transient conditions (429s, dropped connections, garbled payloads) are
/// absorbed by the retry controller and only surface here once the retry
/// budget is spent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HuginnError {
    /// The remote kept answering 429 past the retry budget.
    #[error("rate limit exceeded after {attempts} attempts, try again later")]
    RateLimitExceeded { attempts: u32 },

    /// Network or server failure persisted past the retry budget.
    #[error("request failed: {cause}")]
    RequestFailed { cause: String },

    /// A 2xx response whose body was not the expected envelope.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The caller gave up on the request.
    #[error("request cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl HuginnError {
    /// Whether this error should be shown to a user at all.
    ///
    /// Cancellation means the request was superseded; it is dropped silently.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, HuginnError::Cancelled)
    }

    /// Short user-facing message.
    ///
    /// `InvalidResponse` and `RequestFailed` share the same wording.
    pub fn user_message(&self) -> &'static str {
        match self {
            HuginnError::RateLimitExceeded { .. } => "Too many requests. Try again later.",
            HuginnError::RequestFailed { .. } | HuginnError::InvalidResponse(_) => {
                "Something went wrong loading this page. Please retry."
            }
            HuginnError::Cancelled => "",
            HuginnError::Configuration(_) => "The client is misconfigured.",
        }
    }
}

/// Failure of a single request attempt.
///
/// Produced by [`Transport`](crate::transport::Transport) implementations and
/// envelope validation; consumed by the retry controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptError {
    #[error("rate limited (HTTP 429)")]
    RateLimited,

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Network(String),

    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Retry class of an [`AttemptError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    RateLimited,
    Transport,
    Malformed,
}

impl AttemptError {
    pub fn class(&self) -> FailureClass {
        match self {
            AttemptError::RateLimited => FailureClass::RateLimited,
            AttemptError::Status(_) | AttemptError::Network(_) => FailureClass::Transport,
            AttemptError::Malformed(_) => FailureClass::Malformed,
        }
    }
}

impl From<reqwest::Error> for AttemptError {
    fn from(err: reqwest::Error) -> Self {
        if err.status().map(|s| s.as_u16()) == Some(429) {
            AttemptError::RateLimited
        } else if err.is_decode() {
            AttemptError::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            AttemptError::Status(status.as_u16())
        } else {
            AttemptError::Network(err.to_string())
        }
    }
}

/// Result type alias for Huginn operations
pub type Result<T> = std::result::Result<T, HuginnError>;
