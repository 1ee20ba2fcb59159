// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host application's own notification handler, chained with the SDK's.

use crate::types::AppState;

/// The host application's handler for incoming notifications.
///
/// Invoked alongside (never instead of) the SDK's own handling.
pub trait HostNotificationHandler: Send + Sync + 'static {
    fn on_notification(&self, payload: &serde_json::Value, app_state: AppState);
}
