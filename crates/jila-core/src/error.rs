// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Jila.

use thiserror::Error;

use crate::types::ObjectHandle;

/// Top-level error type for every bridge and application operation.
#[derive(Debug, Error)]
pub enum BridgeError {
    // -- Resolution errors --
    #[error("host class `{class}` could not be resolved: {detail}")]
    ClassNotFound { class: String, detail: String },

    #[error("host operation `{class}.{operation}{signature}` could not be resolved")]
    OperationNotFound {
        class: String,
        operation: String,
        signature: String,
    },

    #[error("arguments do not match `{operation}{signature}`: {detail}")]
    SignatureMismatch {
        operation: String,
        signature: String,
        detail: String,
    },

    // -- Invocation errors --
    #[error("host call `{operation}` failed: {message}")]
    Invocation { operation: String, message: String },

    #[error("host call `{operation}` returned {actual}, expected {expected}")]
    UnexpectedReturn {
        operation: String,
        expected: String,
        actual: String,
    },

    #[error("host object {0} is not held by the bridge")]
    UnknownObject(ObjectHandle),

    // -- User input --
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    // -- Platform / persistence --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reason code carried by a failed call.
///
/// There is no timeout kind: an asynchronous request the host never answers
/// leaves its mailbox slot empty and produces no error at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown class, operation or signature, or arguments that do not fit
    /// the descriptor. No host state was touched.
    Resolution,
    /// The host rejected or threw during the call.
    Invocation,
    /// Rejected before any host call was issued.
    UserInput,
    /// Bridge unavailable, or local I/O and config failures.
    Platform,
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ClassNotFound { .. }
            | Self::OperationNotFound { .. }
            | Self::SignatureMismatch { .. } => ErrorKind::Resolution,
            Self::Invocation { .. } | Self::UnexpectedReturn { .. } | Self::UnknownObject(_) => {
                ErrorKind::Invocation
            }
            Self::EmptyField { .. } => ErrorKind::UserInput,
            Self::Bridge(_) | Self::PlatformUnavailable | Self::Io(_) | Self::Serialization(_) => {
                ErrorKind::Platform
            }
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_errors_are_classified() {
        let err = BridgeError::OperationNotFound {
            class: "dev/jila/JilaActivity".into(),
            operation: "missing".into(),
            signature: "()V".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Resolution);
        assert_eq!(
            err.to_string(),
            "host operation `dev/jila/JilaActivity.missing()V` could not be resolved"
        );
    }

    #[test]
    fn empty_field_is_user_input() {
        let err = BridgeError::EmptyField { field: "title" };
        assert_eq!(err.kind(), ErrorKind::UserInput);
        assert_eq!(err.to_string(), "title must not be empty");
    }

    #[test]
    fn io_is_platform() {
        let err: BridgeError = std::io::Error::other("disk gone").into();
        assert_eq!(err.kind(), ErrorKind::Platform);
    }
}
