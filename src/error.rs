//! Error types for the forms library

use crate::state::ApiErrorBody;
use thiserror::Error;

/// A rule factory was given configuration it cannot work with
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A form snapshot could not be turned into a request payload
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormDataError {
    #[error("field `{0}` is missing")]
    Missing(String),
    #[error("field `{field}` has an unexpected value: {reason}")]
    Invalid { field: String, reason: String },
}

/// Failures reported by the REST collaborator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The server answered but refused the request
    #[error("request rejected ({status}): {message}")]
    Rejected {
        status: u16,
        message: String,
        field: Option<String>,
    },
    /// The request never got an answer
    #[error("transport failure: {0}")]
    Transport(String),
    #[error(transparent)]
    Payload(#[from] FormDataError),
}

impl ApiError {
    /// Build a rejection from a non-success response. A JSON error body
    /// supplies the message and field; any other body is used as the message.
    pub fn from_response(status: u16, body: &str) -> Self {
        let ApiErrorBody { message, field } = serde_json::from_str(body).unwrap_or_else(|_| {
            let text = body.trim();
            ApiErrorBody {
                message: if text.is_empty() {
                    format!("HTTP {status}")
                } else {
                    text.to_string()
                },
                field: None,
            }
        });
        ApiError::Rejected {
            status,
            message,
            field,
        }
    }
}
