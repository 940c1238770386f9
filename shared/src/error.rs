//! Boundary validation errors
//!
//! Inbound bus payloads are validated once, when they enter the kitchen
//! screen. Anything that cannot be turned into an [`OrderSnapshot`] is
//! reported as a [`MessageError`] and dropped by the caller.
//!
//! [`OrderSnapshot`]: crate::order::OrderSnapshot

use thiserror::Error;

/// 消息校验错误
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("Message payload is not a JSON object")]
    NotAnObject,

    #[error("Message is missing config_id")]
    MissingConfigId,

    #[error("Message is missing pos_reference")]
    MissingPosReference,

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl MessageError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
