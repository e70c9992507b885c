use thiserror::Error;

#[derive(Debug, Error)]
pub enum SketchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Encoding error: {0}")]
    EncodingError(String),
    #[error("Client error: {0}")]
    ClientError(String),
}

pub type Result<T> = std::result::Result<T, SketchError>;

/// Coarse classification of a failed generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    ConnectionError,
    HttpError(u16),
    MalformedResponse,
    Unknown,
}

/// A generation call that did not produce an image. Every variant carries a
/// message fit for showing to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationFailure {
    #[error("The request to the API timed out. Please try again later. ({0})")]
    Timeout(String),
    #[error("A connection error occurred: {0}")]
    Connection(String),
    #[error("The API responded with status {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Unexpected response format from the API: {0}")]
    MalformedResponse(String),
    #[error("An unexpected error occurred: {0}")]
    Unknown(String),
}

impl GenerationFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            GenerationFailure::Timeout(_) => FailureKind::Timeout,
            GenerationFailure::Connection(_) => FailureKind::ConnectionError,
            GenerationFailure::Http { status, .. } => FailureKind::HttpError(*status),
            GenerationFailure::MalformedResponse(_) => FailureKind::MalformedResponse,
            GenerationFailure::Unknown(_) => FailureKind::Unknown,
        }
    }

    /// Raw response body, only present for HTTP status failures.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            GenerationFailure::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationFailure::Timeout(err.to_string())
        } else if err.is_connect() {
            GenerationFailure::Connection(err.to_string())
        } else {
            GenerationFailure::Unknown(err.to_string())
        }
    }
}

impl From<SketchError> for GenerationFailure {
    fn from(err: SketchError) -> Self {
        GenerationFailure::Unknown(err.to_string())
    }
}
