// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy for the Sempro SDK.
//!
//! Every error is cloneable so a single outcome (for example a coalesced
//! credential renewal) can be fanned out to several waiters.

use thiserror::Error;

/// Violations of the session configuration contract.
///
/// Always returned synchronously by the call that broke the contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The app id was empty or whitespace only.
    #[error("app id must not be empty")]
    EmptyAppId,

    /// A write-once field was written a second time.
    #[error("`{field}` may only be set once")]
    AlreadySet { field: &'static str },

    /// A menu item token outside the recognised set.
    #[error("unknown menu item `{item}`{}", did_you_mean(.suggestion))]
    UnknownMenuItem {
        item: String,
        suggestion: Option<String>,
    },

    /// The region was set to an empty string.
    #[error("region must not be empty")]
    EmptyRegion,

    /// A color value that is not `#RRGGBB` or `#RRGGBBAA`.
    #[error("invalid color `{value}`: expected #RRGGBB or #RRGGBBAA")]
    InvalidColor { value: String },
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean `{s}`?)"),
        None => String::new(),
    }
}

/// Session-level authentication failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The backend refused the credential presented at login.
    #[error("credential rejected by the backend")]
    Rejected,

    /// The authentication delegate failed, timed out, or was dropped.
    #[error("credential renewal failed")]
    RenewalFailed,

    /// A static auth code expired and there is no delegate to renew it.
    #[error("static auth code expired and no authentication delegate is configured")]
    StaticCredentialExpired,

    /// The command is not accepted in the current credential state.
    #[error("cannot {action} while credential is {state}")]
    InvalidState { state: String, action: &'static str },
}

/// Non-fatal push notification pipeline failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    /// The platform failed to hand out a device token.
    #[error("push token registration failed: {reason}")]
    RegistrationFailed { reason: String },

    /// A notification payload that could not be classified.
    #[error("malformed notification payload: {reason}")]
    MalformedPayload { reason: String },
}

/// Errors returned synchronously to callers of the offline send queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// Transport is disconnected and offline usage is disabled.
    #[error("cannot send while offline")]
    Offline,

    /// No queued message has the given local id.
    #[error("no queued message with id {local_id}")]
    UnknownMessage { local_id: String },

    /// The message is not in a state that can be retried.
    #[error("message {local_id} cannot be retried while {state}")]
    NotRetryable { local_id: String, state: String },
}

/// Failures reported by the external transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("transport disconnected")]
    Disconnected,

    #[error("transport request timed out")]
    Timeout,

    /// The credential used for the call has expired.
    #[error("credential expired")]
    CredentialExpired,

    /// The backend refused the request (e.g. bad credential at login).
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The request can never succeed (e.g. malformed content).
    #[error("permanent failure: {0}")]
    Permanent(String),
}

impl TransportError {
    /// Whether retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Disconnected | TransportError::Timeout)
    }
}

/// The umbrella error used across component boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemproError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("send error: {0}")]
    Send(#[from] SendError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Failure inside a host-supplied collaborator.
    #[error("session handling error: {0}")]
    Session(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_transport_errors() {
        assert!(TransportError::Disconnected.is_transient());
        assert!(TransportError::Timeout.is_transient());
        assert!(!TransportError::CredentialExpired.is_transient());
        assert!(!TransportError::Permanent("bad".into()).is_transient());
        assert!(!TransportError::Rejected("no".into()).is_transient());
    }

    #[test]
    fn unknown_menu_item_mentions_suggestion() {
        let err = ConfigError::UnknownMenuItem {
            item: "camra".into(),
            suggestion: Some("camera".into()),
        };
        assert_eq!(
            err.to_string(),
            "unknown menu item `camra` (did you mean `camera`?)"
        );

        let err = ConfigError::UnknownMenuItem {
            item: "sticker".into(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "unknown menu item `sticker`");
    }

    #[test]
    fn already_set_names_the_field() {
        let err = ConfigError::AlreadySet { field: "region" };
        assert_eq!(err.to_string(), "`region` may only be set once");
    }
}
