use thiserror::Error;

/// Every way a call against the movie API can fail.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No session; raised before any network call.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The server answered 401. The session has already been cleared.
    #[error("Session expired, please log in again")]
    AuthenticationExpired,

    /// Login or registration was refused (401). The session is untouched.
    #[error("Invalid email or password")]
    InvalidCredentials(String),

    #[error("Not found")]
    NotFound,

    /// Summary lookup found no reviews to summarize (404).
    #[error("No reviews for summary")]
    NoReviewsToSummarize,

    #[error("Request failed: {status} - {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// True for the errors that mean "log in (again) to continue".
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::NotAuthenticated | ApiError::AuthenticationExpired)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::AuthenticationExpired | ApiError::InvalidCredentials(_) => Some(401),
            ApiError::NotFound | ApiError::NoReviewsToSummarize => Some(404),
            ApiError::RequestFailed { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
