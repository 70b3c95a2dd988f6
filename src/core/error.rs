//! Typed error handling for link resolution
//!
//! Every failure a link builder can hit comes from resolving an invocation
//! against the route registry or from parsing a URI template. The builders
//! never recover from these; they hand them back to the caller unchanged.
//!
//! # Example
//!
//! ```rust,ignore
//! use hateoas::prelude::*;
//!
//! match links.link_to(CustomerController::find_by_id("15")) {
//!     Ok(builder) => builder.with_self_rel(),
//!     Err(HateoasError::MissingArgument { name, .. }) => {
//!         panic!("forgot to pass {}", name)
//!     }
//!     Err(e) => return Err(e),
//! };
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, HateoasError>;

/// The error type for building links and affordances
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HateoasError {
    /// No controller with this name was registered
    #[error("Unknown controller: {controller}")]
    UnknownController { controller: String },

    /// The controller exists but does not map the operation
    #[error("Controller '{controller}' has no operation '{operation}'")]
    UnknownOperation {
        controller: String,
        operation: String,
    },

    /// A required path or query parameter was not supplied
    #[error("Missing value for '{name}' in {context}")]
    MissingArgument { name: String, context: String },

    /// An argument was supplied that the operation does not declare
    #[error("Operation '{operation}' has no parameter '{name}'")]
    UnknownArgument { operation: String, name: String },

    /// A URI template could not be parsed
    #[error("Invalid URI template '{template}': {message}")]
    InvalidTemplate { template: String, message: String },

    /// The base URI is not an absolute URL
    #[error("Invalid base URI '{uri}': {message}")]
    InvalidBaseUri { uri: String, message: String },

    /// The request's `Host` or `X-Forwarded-*` headers do not form a URL
    #[error("Malformed request host '{value}': {message}")]
    MalformedHost { value: String, message: String },
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl HateoasError {
    /// Get the HTTP status code for this error
    ///
    /// Malformed request headers are the client's fault. Any other link that
    /// cannot be built is a server-side defect.
    pub fn status_code(&self) -> StatusCode {
        match self {
            HateoasError::MalformedHost { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            HateoasError::UnknownController { .. } => "UNKNOWN_CONTROLLER",
            HateoasError::UnknownOperation { .. } => "UNKNOWN_OPERATION",
            HateoasError::MissingArgument { .. } => "MISSING_ARGUMENT",
            HateoasError::UnknownArgument { .. } => "UNKNOWN_ARGUMENT",
            HateoasError::InvalidTemplate { .. } => "INVALID_TEMPLATE",
            HateoasError::InvalidBaseUri { .. } => "INVALID_BASE_URI",
            HateoasError::MalformedHost { .. } => "MALFORMED_HOST",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }

    pub(crate) fn invalid_template(template: &str, message: impl Into<String>) -> Self {
        HateoasError::InvalidTemplate {
            template: template.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn missing_argument(name: &str, context: impl Into<String>) -> Self {
        HateoasError::MissingArgument {
            name: name.to_string(),
            context: context.into(),
        }
    }
}

impl IntoResponse for HateoasError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        let err = HateoasError::UnknownController {
            controller: "customers".to_string(),
        };
        assert_eq!(err.error_code(), "UNKNOWN_CONTROLLER");

        let err = HateoasError::missing_argument("id", "/customers/{id}");
        assert_eq!(err.error_code(), "MISSING_ARGUMENT");
        assert_eq!(err.to_string(), "Missing value for 'id' in /customers/{id}");
    }

    #[test]
    fn test_to_response() {
        let err = HateoasError::UnknownOperation {
            controller: "customers".to_string(),
            operation: "archive".to_string(),
        };
        let response = err.to_response();

        assert_eq!(response.code, "UNKNOWN_OPERATION");
        assert!(response.message.contains("archive"));
    }

    #[test]
    fn test_into_response_status() {
        let err = HateoasError::invalid_template("/foo/{", "unclosed expression");
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
