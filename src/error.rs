//! Error types for a3s-soc

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that can occur while ingesting, aggregating, or querying events
#[derive(Debug, Error)]
pub enum SocError {
    /// One or more required request fields are absent or blank
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A field is present but its value is unusable
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// Event details do not satisfy the registered schema
    #[error("Schema validation failed for event type '{event_type}' v{version}: {reason}")]
    SchemaValidation {
        event_type: String,
        version: u32,
        reason: String,
    },

    /// Requested entity does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Request body could not be processed
    #[error("Failed to process request body: {0}")]
    Body(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal lock or bookkeeping failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Server startup or runtime failure
    #[error("Server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl SocError {
    /// Shorthand for an `InvalidField` error
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Map a request-body decoding failure
    ///
    /// Well-formed JSON with a wrongly typed value is the caller's mistake;
    /// anything that does not parse stays a processing failure.
    pub fn from_json_body(e: serde_json::Error) -> Self {
        match e.classify() {
            serde_json::error::Category::Data => Self::invalid("request body", e.to_string()),
            _ => Self::Body(e.to_string()),
        }
    }

    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields(_) | Self::InvalidField { .. } | Self::SchemaValidation { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type alias for SOC operations
pub type Result<T> = std::result::Result<T, SocError>;

impl IntoResponse for SocError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }

        let body = serde_json::json!({ "success": false, "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message_lists_names() {
        let err = SocError::MissingFields(vec!["event_type", "source"]);
        assert_eq!(err.to_string(), "Missing required fields: event_type, source");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            SocError::invalid("severity", "unknown value 'x'").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SocError::NotFound("Alert alert-1".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            SocError::Body("EOF while parsing".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_json_body_error_classification() {
        let mismatch = serde_json::from_str::<Option<String>>("5").unwrap_err();
        let err = SocError::from_json_body(mismatch);
        assert!(matches!(err, SocError::InvalidField { .. }));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let syntax = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = SocError::from_json_body(syntax);
        assert!(matches!(err, SocError::Body(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_into_response_body_shape() {
        let resp = SocError::NotFound("Playbook pb-x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(resp.into_body(), 4096).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Playbook pb-x not found");
    }
}
