// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock session handling and host notification handler.
//!
//! Session callbacks are synchronous, so records live behind std mutexes
//! and accessors are plain functions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use sempro_core::{
    AppState, ClassifiedNotification, CredentialState, HostNotificationHandler, QueuedMessage,
    SemproError, SessionHandler,
};

/// Shared, ordered log of which handler ran, for chain-order assertions.
pub type CallLog = Arc<Mutex<Vec<&'static str>>>;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct MockSessionHandler {
    identifiers: Vec<String>,
    fail_actions: bool,
    log: Option<CallLog>,
    notifications: Mutex<Vec<ClassifiedNotification>>,
    message_states: Mutex<Vec<QueuedMessage>>,
    errors: Mutex<Vec<SemproError>>,
    actions: Mutex<Vec<(String, serde_json::Value)>>,
    credential_states: Mutex<Vec<CredentialState>>,
    permission_requests: AtomicUsize,
}

impl MockSessionHandler {
    /// A handler that understands the given action identifiers.
    pub fn new(identifiers: &[&str]) -> Self {
        Self {
            identifiers: identifiers.iter().map(|s| s.to_string()).collect(),
            fail_actions: false,
            log: None,
            notifications: Mutex::new(Vec::new()),
            message_states: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            actions: Mutex::new(Vec::new()),
            credential_states: Mutex::new(Vec::new()),
            permission_requests: AtomicUsize::new(0),
        }
    }

    /// Make every `handle_action` call fail.
    pub fn failing_actions(mut self) -> Self {
        self.fail_actions = true;
        self
    }

    /// Append `"sdk"` to `log` whenever a notification is handled.
    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn notifications(&self) -> Vec<ClassifiedNotification> {
        locked(&self.notifications).clone()
    }

    pub fn message_states(&self) -> Vec<QueuedMessage> {
        locked(&self.message_states).clone()
    }

    pub fn errors(&self) -> Vec<SemproError> {
        locked(&self.errors).clone()
    }

    pub fn actions(&self) -> Vec<(String, serde_json::Value)> {
        locked(&self.actions).clone()
    }

    pub fn credential_states(&self) -> Vec<CredentialState> {
        locked(&self.credential_states).clone()
    }

    pub fn permission_requests(&self) -> usize {
        self.permission_requests.load(Ordering::SeqCst)
    }
}

impl Default for MockSessionHandler {
    fn default() -> Self {
        Self::new(&[])
    }
}

#[async_trait]
impl SessionHandler for MockSessionHandler {
    fn on_notification(&self, notification: ClassifiedNotification) {
        if let Some(log) = &self.log {
            locked(log).push("sdk");
        }
        locked(&self.notifications).push(notification);
    }

    fn on_message_state(&self, message: &QueuedMessage) {
        locked(&self.message_states).push(message.clone());
    }

    fn on_error(&self, error: &SemproError) {
        locked(&self.errors).push(error.clone());
    }

    fn action_identifiers(&self) -> Vec<String> {
        self.identifiers.clone()
    }

    async fn handle_action(
        &self,
        identifier: &str,
        response_info: &serde_json::Value,
    ) -> Result<(), SemproError> {
        locked(&self.actions).push((identifier.to_string(), response_info.clone()));
        if self.fail_actions {
            Err(SemproError::Session(format!("action {identifier} failed")))
        } else {
            Ok(())
        }
    }

    fn on_credential_state(&self, state: &CredentialState) {
        locked(&self.credential_states).push(state.clone());
    }

    fn request_push_permission(&self) {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
    }
}

/// Host handler that records payloads and appends `"host"` to a log.
pub struct RecordingHostHandler {
    log: Option<CallLog>,
    received: Mutex<Vec<(serde_json::Value, AppState)>>,
}

impl RecordingHostHandler {
    pub fn new() -> Self {
        Self {
            log: None,
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn received(&self) -> Vec<(serde_json::Value, AppState)> {
        locked(&self.received).clone()
    }
}

impl Default for RecordingHostHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl HostNotificationHandler for RecordingHostHandler {
    fn on_notification(&self, payload: &serde_json::Value, app_state: AppState) {
        if let Some(log) = &self.log {
            locked(log).push("host");
        }
        locked(&self.received).push((payload.clone(), app_state));
    }
}
