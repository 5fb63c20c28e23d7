//! Error types for the shared-list client.

use crate::model::BatchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Shared-list client errors.
///
/// Per-item batch failures are not represented here: batch operations return
/// them next to their results (see [`crate::response::BatchOutcome`]).
#[derive(Error, Debug)]
pub enum ClientError {
    /// A tag or kind outside the closed set known to the registry.
    #[error("unsupported {family}: {tag:?}")]
    UnsupportedVariant { family: &'static str, tag: String },

    #[error("XML serialization error: {0}")]
    Serialization(String),

    /// Network failure or non-200 status. The raw body is kept for diagnostics.
    #[error("transport failure: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
        body: Option<Vec<u8>>,
    },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    RemoteFault(Box<SoapFault>),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error categories, stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Caller supplied an unsupported list or item kind
    InvalidInput,
    /// Request could not be written as XML
    SerializationFailure,
    /// Network failure or non-200 status
    TransportFailure,
    /// Response did not parse into the expected shape
    MalformedResponse,
    /// Service answered with a SOAP fault
    RemoteFault,
    /// Invalid or unreadable configuration
    Configuration,
}

impl ErrorKind {
    /// Get the string code for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::SerializationFailure => "SERIALIZATION_FAIL",
            Self::TransportFailure => "TRANSPORT_FAIL",
            Self::MalformedResponse => "MALFORMED_RESPONSE",
            Self::RemoteFault => "REMOTE_FAULT",
            Self::Configuration => "CONFIGURATION",
        }
    }
}

/// API error codes that mean the credentials were rejected.
const AUTH_ERROR_CODES: &[&str] = &[
    "AuthenticationTokenExpired",
    "InvalidCredentials",
    "UserIsNotAuthorized",
    "InvalidDeveloperToken",
];

impl ClientError {
    pub(crate) fn unsupported(family: &'static str, tag: impl Into<String>) -> Self {
        Self::UnsupportedVariant {
            family,
            tag: tag.into(),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedVariant { .. } => ErrorKind::InvalidInput,
            Self::Serialization(_) => ErrorKind::SerializationFailure,
            Self::Transport { .. } => ErrorKind::TransportFailure,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::RemoteFault(_) => ErrorKind::RemoteFault,
            Self::Config(_) | Self::Io(_) => ErrorKind::Configuration,
        }
    }

    /// The SOAP fault, if the service returned one.
    pub fn fault(&self) -> Option<&SoapFault> {
        match self {
            Self::RemoteFault(fault) => Some(fault),
            _ => None,
        }
    }

    /// Decode a SOAP fault carried in the body of a failed HTTP exchange.
    ///
    /// The service answers faults with HTTP 500, so the transport reports them
    /// as [`ClientError::Transport`]. This does not change how the error is
    /// propagated; it only exposes the fault for inspection.
    pub fn transport_fault(&self) -> Option<SoapFault> {
        match self {
            Self::Transport {
                body: Some(body), ..
            } => crate::envelope::decode_envelope(body).ok()?.fault,
            _ => None,
        }
    }

    /// Whether the service rejected the credentials.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Self::RemoteFault(fault) => fault.has_error_code(AUTH_ERROR_CODES),
            Self::Transport { status, .. } => {
                matches!(status, Some(401 | 403))
                    || self
                        .transport_fault()
                        .is_some_and(|f| f.has_error_code(AUTH_ERROR_CODES))
            }
            _ => false,
        }
    }

    /// Whether the call was throttled.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::RemoteFault(fault) => fault.has_error_code(&["CallRateExceeded"]),
            Self::Transport { status, .. } => *status == Some(429),
            _ => false,
        }
    }
}

/// A SOAP 1.1 fault returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoapFault {
    /// `faultcode`, e.g. `s:Client`
    pub code: String,
    /// `faultstring`
    pub message: String,
    /// Tracking id from the fault detail, else from the response header
    pub tracking_id: String,
    /// API-specific detail block
    pub detail: Option<FaultDetail>,
}

/// Detail block of a fault (`AdApiFaultDetail` or `ApiFaultDetail`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultDetail {
    /// Local name of the detail element
    pub kind: String,
    pub tracking_id: String,
    /// `Errors/AdApiError`
    pub errors: Vec<ApiError>,
    /// `OperationErrors/OperationError`
    pub operation_errors: Vec<ApiError>,
    /// `BatchErrors/BatchError`
    pub batch_errors: Vec<BatchError>,
}

/// One API error record inside a fault detail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: i32,
    pub error_code: String,
    pub message: String,
    pub details: Option<String>,
}

impl SoapFault {
    /// The first API error of the detail block, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        let detail = self.detail.as_ref()?;
        detail.errors.first().or(detail.operation_errors.first())
    }

    fn has_error_code(&self, codes: &[&str]) -> bool {
        if codes.iter().any(|c| self.message.contains(c)) {
            return true;
        }
        self.detail.as_ref().is_some_and(|d| {
            d.errors
                .iter()
                .chain(&d.operation_errors)
                .any(|e| codes.contains(&e.error_code.as_str()))
        })
    }
}

impl fmt::Display for SoapFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.api_error() {
            Some(api) => write!(f, "API error [{}]: {}", api.error_code, api.message)?,
            None => write!(f, "SOAP fault {}: {}", self.code, self.message)?,
        }
        if !self.tracking_id.is_empty() {
            write!(f, " (TrackingId: {})", self.tracking_id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_fault() -> SoapFault {
        SoapFault {
            code: "s:Client".to_string(),
            message: "Invalid client data.".to_string(),
            tracking_id: "abc-123".to_string(),
            detail: Some(FaultDetail {
                kind: "AdApiFaultDetail".to_string(),
                tracking_id: "abc-123".to_string(),
                errors: vec![ApiError {
                    code: 105,
                    error_code: "InvalidCredentials".to_string(),
                    message: "Authentication failed.".to_string(),
                    details: None,
                }],
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_error_kind_as_str() {
        assert_eq!(ErrorKind::InvalidInput.as_str(), "INVALID_INPUT");
        assert_eq!(ErrorKind::RemoteFault.as_str(), "REMOTE_FAULT");
    }

    #[test]
    fn test_kind_classification() {
        let err = ClientError::unsupported("shared entity type", "Bogus");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "unsupported shared entity type: \"Bogus\"");

        let err = ClientError::RemoteFault(Box::new(auth_fault()));
        assert_eq!(err.kind(), ErrorKind::RemoteFault);
        assert!(err.fault().is_some());
    }

    #[test]
    fn test_fault_display_prefers_api_error() {
        let fault = auth_fault();
        assert_eq!(
            fault.to_string(),
            "API error [InvalidCredentials]: Authentication failed. (TrackingId: abc-123)"
        );

        let bare = SoapFault {
            code: "s:Client".to_string(),
            message: "AuthenticationTokenExpired".to_string(),
            ..Default::default()
        };
        assert_eq!(bare.to_string(), "SOAP fault s:Client: AuthenticationTokenExpired");
    }

    #[test]
    fn test_auth_and_rate_limit_helpers() {
        let err = ClientError::RemoteFault(Box::new(auth_fault()));
        assert!(err.is_auth_error());
        assert!(!err.is_rate_limited());

        let throttled = ClientError::Transport {
            status: Some(429),
            message: "too many requests".to_string(),
            body: None,
        };
        assert!(throttled.is_rate_limited());
        assert!(!throttled.is_auth_error());
    }
}
