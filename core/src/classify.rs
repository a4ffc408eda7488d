//! Classified submission failures.
//!
//! Every failure the gateway sees collapses into one of a small set of
//! user-facing categories. Raw relay or vendor bodies never reach callers;
//! only the category, the HTTP status and a display message do.

use serde::Serialize;
use strum_macros::Display;

pub const AUTH_MESSAGE: &str =
    "The support system rejected our credentials. Please contact your administrator.";
pub const VALIDATION_MESSAGE: &str = "The support system rejected the request as invalid.";
pub const RATE_LIMIT_MESSAGE: &str =
    "Too many requests were sent to the support system. Please try again in a few minutes.";
pub const TIMEOUT_MESSAGE: &str =
    "The support system took too long to respond. Please check your connection and try again.";
pub const SERVER_MESSAGE: &str =
    "The support system encountered an error. Please try again later.";
pub const UNKNOWN_MESSAGE: &str = "An unexpected error occurred. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Authentication,
    Validation,
    RateLimited,
    Timeout,
    Server,
    Unknown,
}

impl ErrorKind {
    /// Whether asking the user to try again may help.
    pub fn is_retryable(self) -> bool {
        !matches!(self, Self::Authentication | Self::Validation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    /// HTTP status from the relay, when one was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout, None, TIMEOUT_MESSAGE)
    }

    pub fn unexpected() -> Self {
        Self::new(ErrorKind::Unknown, None, UNKNOWN_MESSAGE)
    }

    /// Classify a non-success relay response.
    ///
    /// `relay_message` is the `message` field of the relay's JSON reply, if
    /// it had one. Validation and generic failures surface it; the other
    /// categories use fixed wording.
    pub fn from_status(status: u16, relay_message: Option<&str>) -> Self {
        let relay_message = relay_message.map(str::trim).filter(|msg| !msg.is_empty());
        let (kind, message) = match status {
            401 | 403 => (ErrorKind::Authentication, AUTH_MESSAGE.to_string()),
            422 => (
                ErrorKind::Validation,
                relay_message.unwrap_or(VALIDATION_MESSAGE).to_string(),
            ),
            429 => (ErrorKind::RateLimited, RATE_LIMIT_MESSAGE.to_string()),
            408 | 504 => (ErrorKind::Timeout, TIMEOUT_MESSAGE.to_string()),
            _ => (
                ErrorKind::Server,
                relay_message.unwrap_or(SERVER_MESSAGE).to_string(),
            ),
        };
        Self::new(kind, Some(status), message)
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
