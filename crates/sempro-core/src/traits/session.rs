// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session handling trait: the conversation layer that reflects SDK events.

use async_trait::async_trait;

use crate::error::SemproError;
use crate::types::{ClassifiedNotification, CredentialState, QueuedMessage};

/// Consumer of classified notifications, message state changes and errors.
///
/// Notification and state callbacks are synchronous from the SDK's point of
/// view; implementations must not block on their own I/O inside them.
#[async_trait]
pub trait SessionHandler: Send + Sync + 'static {
    /// A recognised push notification arrived.
    fn on_notification(&self, notification: ClassifiedNotification);

    /// A queued message changed state.
    fn on_message_state(&self, message: &QueuedMessage);

    /// A non-fatal error surfaced by one of the components.
    fn on_error(&self, error: &SemproError);

    /// Identifiers of the notification actions session handling understands.
    fn action_identifiers(&self) -> Vec<String>;

    /// Perform a user notification action.
    async fn handle_action(
        &self,
        identifier: &str,
        response_info: &serde_json::Value,
    ) -> Result<(), SemproError>;

    /// The credential moved to a new state.
    fn on_credential_state(&self, _state: &CredentialState) {}

    /// Ask the user for push permission.
    fn request_push_permission(&self) {}
}
