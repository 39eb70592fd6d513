use thiserror::Error;

/// Why a single property's image could not be fetched or saved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid coordinates lat={lat}, lon={lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    /// Bad request, or no scene for the location and time window.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("provider returned an empty image")]
    EmptyImage,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Maps a non-success HTTP status and its body to a failure class.
    pub fn from_status(status: u16, message: String) -> FetchError {
        match status {
            401 | 403 => FetchError::Auth { status, message },
            429 => FetchError::RateLimited(message),
            400 | 404 => FetchError::Rejected { status, message },
            _ => FetchError::Provider { status, message },
        }
    }
}
