//! Reply service failures and their user-facing classification.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Failure returned by a [`crate::ReplyService`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service could not be reached or is temporarily overloaded.
    #[error("SysTransient, \"{0}\"")]
    Transient(String),
    /// The service refused the request.
    #[error("CanisterReject, \"{0}\"")]
    Rejected(String),
    #[error("{0}")]
    Other(String),
}

/// How a failed reply is surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorClass {
    TransientServiceError { message: String },
    RejectedRequestError { message: String },
    /// Logged only. No notice is shown for these.
    UnclassifiedError,
}

impl ErrorClass {
    /// Text of the user-visible notice, if this class gets one.
    pub fn notice(&self) -> Option<&str> {
        match self {
            ErrorClass::TransientServiceError { message }
            | ErrorClass::RejectedRequestError { message } => Some(message),
            ErrorClass::UnclassifiedError => None,
        }
    }
}

pub fn classify(error: &ServiceError) -> ErrorClass {
    match error {
        ServiceError::Transient(message) => ErrorClass::TransientServiceError {
            message: message.clone(),
        },
        ServiceError::Rejected(message) => ErrorClass::RejectedRequestError {
            message: message.clone(),
        },
        ServiceError::Other(text) => classify_text(text),
    }
}

/// Classify a stringified failure by its `SysTransient` / `CanisterReject`
/// marker. The detail is the quoted text following the marker; escaping
/// backslashes before the opening quote are tolerated.
pub fn classify_text(text: &str) -> ErrorClass {
    let Some(captures) = marker_pattern().captures(text) else {
        return ErrorClass::UnclassifiedError;
    };
    let message = captures[2].to_string();
    match &captures[1] {
        "SysTransient" => ErrorClass::TransientServiceError { message },
        _ => ErrorClass::RejectedRequestError { message },
    }
}

fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(SysTransient|CanisterReject), \\*"([^\\"]+)"#)
            .expect("error marker pattern is valid")
    })
}
