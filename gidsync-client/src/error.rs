//! Error types for the gidsync client

use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the gidsync client
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be built; no attempt was made
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// API returned a non-retryable status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body text
        message: String,
    },

    /// Every attempt in the budget ended in a retryable failure
    #[error("All {attempts} attempts failed")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// The failure of the final attempt
        #[source]
        last: AttemptFailure,
    },

    /// A 200 response body did not match the expected envelope
    #[error("Failed to decode {resource} response")]
    Decode {
        /// Resource path the body was fetched from
        resource: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Create an API error from status code and body
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Status code of a terminal API error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if (400..500).contains(status))
    }

    /// Check if this error came from decoding rather than fetching
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// The last retryable failure, if the attempt budget ran out
    pub fn last_failure(&self) -> Option<&AttemptFailure> {
        match self {
            Self::RetriesExhausted { last, .. } => Some(last),
            _ => None,
        }
    }
}

/// A retryable failure of a single attempt
#[derive(Debug, Error)]
pub enum AttemptFailure {
    /// Connection, DNS or timeout failure
    #[error("network error on attempt {attempt}")]
    Transport {
        attempt: u32,
        #[source]
        source: TransportError,
    },

    /// The response arrived but its body could not be read
    #[error("failed to read body on attempt {attempt}")]
    BodyRead {
        attempt: u32,
        #[source]
        source: TransportError,
    },

    /// Status 429
    #[error("rate limited (status 429) on attempt {attempt}")]
    RateLimited { attempt: u32 },

    /// Status 500, 502, 503 or 504
    #[error("server error (status {status}) on attempt {attempt}")]
    ServerError { attempt: u32, status: u16 },
}

impl AttemptFailure {
    /// 1-based attempt number this failure belongs to
    pub fn attempt(&self) -> u32 {
        match self {
            Self::Transport { attempt, .. }
            | Self::BodyRead { attempt, .. }
            | Self::RateLimited { attempt }
            | Self::ServerError { attempt, .. } => *attempt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_accessors() {
        let err = ClientError::api_error(404, "not found");
        assert_eq!(err.status(), Some(404));
        assert!(err.is_client_error());
        assert!(!err.is_decode_error());
        assert_eq!(err.to_string(), "API error (status 404): not found");
    }

    #[test]
    fn test_server_status_is_not_client_error() {
        assert!(!ClientError::api_error(501, "").is_client_error());
    }

    #[test]
    fn test_exhausted_exposes_last_failure() {
        let err = ClientError::RetriesExhausted {
            attempts: 3,
            last: AttemptFailure::ServerError {
                attempt: 3,
                status: 503,
            },
        };
        assert_eq!(err.status(), None);
        assert_eq!(err.last_failure().map(AttemptFailure::attempt), Some(3));
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("server error (status 503) on attempt 3")
        );
    }
}
