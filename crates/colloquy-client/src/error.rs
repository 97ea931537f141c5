//! Error types for the client library.

use thiserror::Error;

use colloquy_common::ApiError;

/// Errors that can occur when talking to the Responses API.
///
/// Covers everything from connection failures to error bodies returned by the
/// API and payloads the stream decoder could not make sense of.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Network or HTTP transport failure.
    ///
    /// DNS resolution, connection resets, timeouts, or a body that broke off
    /// mid-stream.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Middleware layer error.
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// JSON serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Non-2xx status with a recognized API error body.
    #[error("API error (HTTP {status}): {error}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The parsed error body.
        error: ApiError,
    },

    /// Non-2xx status whose body is not a recognized API error.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// The raw body text.
        body: String,
    },

    /// API authentication failure (HTTP 401).
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Rate limit exceeded (HTTP 429).
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Client configuration issue, e.g. a missing API key or a bad base URL.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The API returned data that doesn't match the expected format.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A stream payload could not be decoded into an event.
    #[error("Failed to decode stream payload: {source}")]
    Decode {
        /// The offending `data:` payload.
        payload: String,
        /// Why decoding failed.
        #[source]
        source: serde_json::Error,
    },

    /// Local I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Check if this is an authentication error.
    #[must_use]
    pub const fn is_authentication_error(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Check if this is a rate limit error.
    #[must_use]
    pub const fn is_rate_limit_error(&self) -> bool {
        matches!(self, Self::RateLimit(_))
    }

    /// The HTTP status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Http { status, .. } => Some(*status),
            Self::Authentication(_) => Some(401),
            Self::RateLimit(_) => Some(429),
            Self::Network(e) => e.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
