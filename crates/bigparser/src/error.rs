//! Error types for the BigParser client
//!
//! Every failure the client can observe ends up in [`GridError`]. The
//! request builder never raises these; it hands them back inside
//! [`Outcome::Failure`](crate::Outcome::Failure) exactly as they were caught.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// What went wrong below the HTTP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The request did not complete within the configured timeout
    Timeout,
    /// DNS, TCP or TLS setup failed
    Connect,
    /// The request could not be built or sent (bad URL, bad header value)
    Request,
    /// The response body could not be read
    Body,
    Other,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("Transport error ({kind:?}): {message}")]
    Transport {
        kind: TransportErrorKind,
        message: String,
    },

    /// Non-2xx response. `body` is whatever the service sent, unmodified.
    #[error("HTTP {status} error: {body}")]
    Api { status: u16, body: Value },

    /// 2xx response whose body did not match the expected shape
    #[error("Failed to decode response: {message}")]
    Decode { message: String, body: String },

    #[error("Failed to encode request body: {message}")]
    Encode { message: String },
}

pub type Result<T> = std::result::Result<T, GridError>;

impl GridError {
    pub fn transport(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        GridError::Transport {
            kind,
            message: message.into(),
        }
    }

    /// HTTP status for application errors, `None` for everything else
    pub fn status(&self) -> Option<u16> {
        match self {
            GridError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw error body returned by the service, if any
    pub fn body(&self) -> Option<&Value> {
        match self {
            GridError::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Parse the service's error body into one of its known shapes
    pub fn service_error(&self) -> Option<ServiceError> {
        self.body()
            .and_then(|body| serde_json::from_value(body.clone()).ok())
    }
}

/// Error bodies the grid service is known to produce
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ServiceError {
    /// `{ errorMessage, errorType, recoverable, otherDetails }`
    #[serde(rename_all = "camelCase")]
    Structured {
        error_message: String,
        error_type: String,
        #[serde(default)]
        recoverable: bool,
        #[serde(default)]
        other_details: Value,
    },
    /// `{ err: { message, statusCode } }`
    Wrapped { err: WrappedError },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedError {
    pub message: String,
    #[serde(default)]
    pub status_code: Option<u16>,
}

impl ServiceError {
    pub fn message(&self) -> &str {
        match self {
            ServiceError::Structured { error_message, .. } => error_message,
            ServiceError::Wrapped { err } => &err.message,
        }
    }

    /// `errorType` of structured errors (`AUTHERROR`, `DATAERROR`, `SYSTEMERROR`, ...)
    pub fn error_type(&self) -> Option<&str> {
        match self {
            ServiceError::Structured { error_type, .. } => Some(error_type),
            ServiceError::Wrapped { .. } => None,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ServiceError::Structured {
                recoverable: true,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_service_error() {
        let err = GridError::Api {
            status: 401,
            body: json!({
                "errorMessage": "authId is invalid",
                "otherDetails": {},
                "errorType": "AUTHERROR",
                "recoverable": true,
            }),
        };

        let service = err.service_error().unwrap();
        assert_eq!(service.message(), "authId is invalid");
        assert_eq!(service.error_type(), Some("AUTHERROR"));
        assert!(service.is_recoverable());
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_wrapped_service_error() {
        let err = GridError::Api {
            status: 404,
            body: json!({ "err": { "message": "Invalid Grid Id", "statusCode": 404 } }),
        };

        let service = err.service_error().unwrap();
        assert_eq!(service.message(), "Invalid Grid Id");
        assert_eq!(service.error_type(), None);
        assert!(!service.is_recoverable());
    }

    #[test]
    fn test_unrecognized_body_is_kept_raw() {
        let err = GridError::Api {
            status: 502,
            body: Value::String("Bad Gateway".to_string()),
        };
        assert!(err.service_error().is_none());
        assert_eq!(err.body(), Some(&Value::String("Bad Gateway".to_string())));
    }

    #[test]
    fn test_transport_error_has_no_status() {
        let err = GridError::transport(TransportErrorKind::Timeout, "took too long");
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("Timeout"));
    }
}
