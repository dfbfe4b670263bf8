// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-language error text for the inline error line in the UI.
//
// Every bridge error maps to a short message plus a suggestion of what the
// user can do next. Nothing here retries; the user re-triggers the action.

use crate::error::BridgeError;

/// A message suitable for showing next to the control that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    /// What went wrong.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
}

impl UserMessage {
    fn new(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Single line combining message and suggestion.
    pub fn inline(&self) -> String {
        if self.suggestion.is_empty() {
            self.message.clone()
        } else {
            format!("{} {}", self.message, self.suggestion)
        }
    }
}

/// Convert a `BridgeError` into text a user can act on.
pub fn describe(err: &BridgeError) -> UserMessage {
    match err {
        BridgeError::ClassNotFound { class, .. } => UserMessage::new(
            "This feature isn't available in this build of the app.",
            format!("(Missing host component: {class})"),
        ),

        BridgeError::OperationNotFound { operation, .. }
        | BridgeError::SignatureMismatch { operation, .. } => UserMessage::new(
            "This feature isn't available in this build of the app.",
            format!("(Host does not provide `{operation}`)"),
        ),

        BridgeError::Invocation { operation, message } => {
            if message.contains("SecurityException") || message.contains("permission") {
                UserMessage::new(
                    "The system blocked this action.",
                    "Tap \"Grant permission\" and allow notifications, then try again.",
                )
            } else {
                UserMessage::new(
                    "The system couldn't complete that action.",
                    format!("Try again. ({operation}: {message})"),
                )
            }
        }

        BridgeError::UnexpectedReturn { operation, .. } => UserMessage::new(
            "The system gave an unexpected answer.",
            format!("Try again. ({operation})"),
        ),

        BridgeError::UnknownObject(handle) => UserMessage::new(
            "The app lost its connection to the system.",
            format!("Restart the app. (Handle {handle})"),
        ),

        BridgeError::EmptyField { field } => {
            UserMessage::new(format!("Please enter a {field}."), "")
        }

        BridgeError::Bridge(detail) => UserMessage::new(
            "Something went wrong talking to the system.",
            format!("({detail})"),
        ),

        BridgeError::PlatformUnavailable => UserMessage::new(
            "This feature isn't available on this device.",
            "",
        ),

        BridgeError::Io(e) => UserMessage::new(
            "A file couldn't be read or written.",
            format!("Check storage access. ({e})"),
        ),

        BridgeError::Serialization(e) => UserMessage::new(
            "The settings file is damaged.",
            format!("Delete it to restore defaults. ({e})"),
        ),
    }
}
