// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the Sempro components and their collaborators.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::sync::oneshot;

use crate::error::AuthError;

/// Client-side identifier of an outgoing message.
///
/// Stable across retries so the transport can deduplicate resends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a fresh random local id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Push token handed out by the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceToken(pub String);

impl fmt::Display for DeviceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Items that can appear in the conversation menu.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MenuItem {
    Camera,
    Gallery,
    Document,
    Location,
}

impl MenuItem {
    /// Every recognised menu item, in display order.
    pub const ALL: [MenuItem; 4] = [
        MenuItem::Camera,
        MenuItem::Gallery,
        MenuItem::Document,
        MenuItem::Location,
    ];

    /// Boundary string tokens accepted by the menu setter.
    pub const TOKENS: [&'static str; 4] = ["camera", "gallery", "document", "location"];
}

/// Status bar style used on the conversation screen.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatusBarStyle {
    #[default]
    Default,
    LightContent,
    DarkContent,
}

/// Application state at the time a notification arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppState {
    Foreground,
    Background,
}

/// How a credential was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CredentialKind {
    /// Static auth code supplied at configuration time.
    AuthCode,
    /// JWT supplied by `login` or by the authentication delegate.
    Jwt,
}

/// The token identifying the session to the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    kind: CredentialKind,
    token: String,
}

impl Credential {
    pub fn auth_code(code: impl Into<String>) -> Self {
        Self {
            kind: CredentialKind::AuthCode,
            token: code.into(),
        }
    }

    pub fn jwt(token: impl Into<String>) -> Self {
        Self {
            kind: CredentialKind::Jwt,
            token: token.into(),
        }
    }

    pub fn kind(&self) -> CredentialKind {
        self.kind
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("kind", &self.kind)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Lifecycle of the session credential.
///
/// `Failed` is the "unauthenticated (failed)" terminal state: the session
/// stays unusable until an explicit re-login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Expiring,
    Renewing,
    Failed(AuthError),
}

impl CredentialState {
    /// True for both the plain and the failed unauthenticated states.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            CredentialState::Unauthenticated | CredentialState::Failed(_)
        )
    }
}

impl fmt::Display for CredentialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialState::Unauthenticated => write!(f, "unauthenticated"),
            CredentialState::Authenticating => write!(f, "authenticating"),
            CredentialState::Authenticated => write!(f, "authenticated"),
            CredentialState::Expiring => write!(f, "expiring"),
            CredentialState::Renewing => write!(f, "renewing"),
            CredentialState::Failed(_) => write!(f, "unauthenticated (failed)"),
        }
    }
}

/// Result reported to the platform when a user action finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ActionOutcome {
    /// Session handling processed the action.
    Handled,
    /// The action identifier is not ours; nothing was done.
    NoOp,
    /// Session handling failed or never finished.
    Failed,
}

type CompletionFn = Box<dyn FnOnce(ActionOutcome) + Send>;

/// Platform completion handler for a user notification action.
///
/// Invoked exactly once: either explicitly through [`complete`](Self::complete)
/// or with [`ActionOutcome::Failed`] when dropped unsignalled.
pub struct ActionCompletion {
    callback: Option<CompletionFn>,
}

impl ActionCompletion {
    pub fn new(callback: impl FnOnce(ActionOutcome) + Send + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// A completion paired with a receiver that observes its outcome.
    pub fn channel() -> (Self, oneshot::Receiver<ActionOutcome>) {
        let (tx, rx) = oneshot::channel();
        let completion = Self::new(move |outcome| {
            let _ = tx.send(outcome);
        });
        (completion, rx)
    }

    /// Signal the outcome to the platform.
    pub fn complete(mut self, outcome: ActionOutcome) {
        if let Some(callback) = self.callback.take() {
            callback(outcome);
        }
    }
}

impl Drop for ActionCompletion {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback(ActionOutcome::Failed);
        }
    }
}

impl fmt::Debug for ActionCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCompletion")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

/// Push lifecycle events produced by the host platform.
///
/// Consumed exactly once by the notification dispatcher.
#[derive(Debug)]
pub enum NotificationEvent {
    DeviceTokenRegistered {
        token: DeviceToken,
    },
    DeviceTokenRegistrationFailed {
        error: String,
    },
    NotificationReceived {
        payload: serde_json::Value,
        app_state: AppState,
    },
    UserAction {
        identifier: String,
        response_info: serde_json::Value,
        completion: ActionCompletion,
    },
}

/// A recognised Sempro push payload, keyed by its `type` discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushNotification {
    /// A new message in a conversation.
    Message {
        conversation_id: String,
        #[serde(default)]
        message_id: Option<String>,
        #[serde(default)]
        author_name: Option<String>,
        #[serde(default)]
        text: Option<String>,
    },
    /// Read receipts, typing, membership and similar conversation activity.
    ConversationActivity {
        conversation_id: String,
        activity: String,
    },
}

impl PushNotification {
    pub fn conversation_id(&self) -> &str {
        match self {
            PushNotification::Message {
                conversation_id, ..
            }
            | PushNotification::ConversationActivity {
                conversation_id, ..
            } => conversation_id,
        }
    }
}

/// A classified notification ready for session handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedNotification {
    pub notification: PushNotification,
    pub app_state: AppState,
}

/// Delivery state of a queued outgoing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    Pending,
    Sending,
    Sent,
    FailedRetryable,
    FailedTerminal,
}

impl DeliveryState {
    /// Terminal states leave the queue and are handed to session handling.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryState::Sent | DeliveryState::FailedTerminal)
    }

    /// States picked up by the next retry pass.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DeliveryState::Pending | DeliveryState::FailedRetryable)
    }
}

/// One pending outgoing send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedMessage {
    pub local_id: MessageId,
    pub payload: String,
    pub enqueued_at: DateTime<Utc>,
    pub attempts: u32,
    pub state: DeliveryState,
}

impl QueuedMessage {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            local_id: MessageId::generate(),
            payload: payload.into(),
            enqueued_at: Utc::now(),
            attempts: 0,
            state: DeliveryState::Pending,
        }
    }
}
