// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Call-scoped failure taxonomy shared by every handler.
//!
//! A failure never outlives the call that produced it; adapters map the
//! variants onto their own protocol using [`InspectError::code`].

use thiserror::Error;

pub type Result<T, E = InspectError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum InspectError {
    /// Missing or malformed caller input
    #[error("{0}")]
    InvalidArgument(String),

    /// Requested object or kind does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Network, auth or server-side failure reaching the control plane
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A document could not be encoded as JSON
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The invoking context was cancelled before the call completed
    #[error("call cancelled")]
    Cancelled,
}

impl InspectError {
    pub fn missing_parameter(name: &str) -> Self {
        Self::InvalidArgument(format!("missing required parameter: {}", name))
    }

    pub fn invalid_parameter(name: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidArgument(format!("invalid parameter {}: {}", name, reason))
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound(_) => "not_found",
            Self::BackendUnavailable(_) => "backend_unavailable",
            Self::Serialization(_) => "serialization_error",
            Self::Cancelled => "cancelled",
        }
    }
}

impl From<kube::Error> for InspectError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(ref resp) if resp.code == 404 => Self::NotFound(resp.message.clone()),
            other => Self::BackendUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameter_names_parameter() {
        let err = InspectError::missing_parameter("Kind");
        assert_eq!(err.to_string(), "missing required parameter: Kind");
        assert_eq!(err.code(), "invalid_argument");
    }

    #[test]
    fn test_invalid_parameter_message() {
        let err = InspectError::invalid_parameter("maxEvents", "expected a number");
        assert_eq!(err.to_string(), "invalid parameter maxEvents: expected a number");
    }

    #[test]
    fn test_codes() {
        assert_eq!(InspectError::NotFound("x".into()).code(), "not_found");
        assert_eq!(
            InspectError::BackendUnavailable("x".into()).code(),
            "backend_unavailable"
        );
        assert_eq!(InspectError::Cancelled.code(), "cancelled");

        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(InspectError::from(serde_err).code(), "serialization_error");
    }

    #[test]
    fn test_kube_not_found_maps_to_not_found() {
        let err = kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "pods \"nope\" not found".to_string(),
            reason: "NotFound".to_string(),
            code: 404,
        });
        let mapped = InspectError::from(err);
        assert!(matches!(mapped, InspectError::NotFound(_)));
        assert!(mapped.to_string().contains("nope"));
    }

    #[test]
    fn test_kube_forbidden_maps_to_backend_unavailable() {
        let err = kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "forbidden".to_string(),
            reason: "Forbidden".to_string(),
            code: 403,
        });
        assert!(matches!(
            InspectError::from(err),
            InspectError::BackendUnavailable(_)
        ));
    }
}
