//! Error types for Squeeze

/// Result type alias using [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for Squeeze
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    /// Invalid HTTP request
    #[error("Invalid HTTP request: {0}")]
    InvalidRequest(String),

    /// Request body larger than the configured limit
    #[error("Payload too large: limit is {0} bytes")]
    PayloadTooLarge(usize),

    /// Compression level outside the range supported by the codec
    #[error("gzip: invalid compression level: {0}")]
    InvalidCompressionLevel(i32),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Middleware error
    #[error("Middleware error: {0}")]
    Middleware(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(#[from] http::Error),

    /// Internal error (should not happen in production)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convert error to HTTP status code
    pub fn to_status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Http(_) | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this error comes from configuration rather than a request
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_) | Error::InvalidCompressionLevel(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            Error::InvalidRequest("bad gzip body".to_string()).to_status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Middleware("boom".to_string()).to_status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::PayloadTooLarge(1024).to_status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_invalid_level_message() {
        let err = Error::InvalidCompressionLevel(42);
        assert!(err.is_config());
        assert_eq!(err.to_string(), "gzip: invalid compression level: 42");
    }
}
