//! Error handling module for the applicant client.
//!
//! Classifies every remote failure as either a structured validation error or a generic one.

use std::collections::BTreeMap;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const HTTP_ERROR: &str = "HTTP_ERROR";
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
}

/// Message shown when a failure carries nothing the user can act on per field.
pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";

/// Error returned by the Applicants API client.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// 400 response with a structured `errors` body
    Validation {
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },
    /// Non-success response without a structured body
    Status { status: u16, message: String },
    /// Connection, TLS or timeout failure
    Network(String),
    /// Response body could not be decoded
    Decode(String),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => codes::VALIDATION_ERROR,
            ApiError::Status { .. } => codes::HTTP_ERROR,
            ApiError::Network(_) => codes::NETWORK_ERROR,
            ApiError::Decode(_) => codes::DECODE_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::Status { status, message } => format!("{} (status {})", message, status),
            ApiError::Network(msg) => msg.clone(),
            ApiError::Decode(msg) => msg.clone(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation { .. })
    }

    /// Field-keyed messages, present only for validation errors.
    pub fn field_errors(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            ApiError::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// HTTP status, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Validation { .. } => Some(400),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(_) | ApiError::Decode(_) => None,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Request error: {:?}", err);
        if err.is_decode() {
            ApiError::Decode(format!("Invalid response body: {}", err))
        } else {
            ApiError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        ApiError::Decode(format!("JSON error: {}", err))
    }
}

/// Error raised while reading configuration from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid value {:?} for {}: expected {}",
            self.value, self.variable, self.expected
        )
    }
}

impl std::error::Error for ConfigError {}
