// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! FIFO queue of outgoing messages.
//!
//! A message lives here from `enqueue` until it reaches a terminal state
//! (`Sent` or `FailedTerminal`), at which point it is removed and handed to
//! session handling. Every state change is reported to session handling in
//! the order it happened for that message.
//!
//! Flush passes are serialized, so two connectivity events in quick
//! succession cannot send the same message twice concurrently.

use std::collections::VecDeque;
use std::sync::{Arc, MutexGuard, PoisonError};

use sempro_auth::AuthenticationController;
use sempro_config::SessionConfiguration;
use sempro_core::{
    AuthError, DeliveryState, MessageId, QueuedMessage, SemproError, SendError, SessionHandler,
    Transport, TransportError,
};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Counts from one flush pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    pub sent: usize,
    pub failed_terminal: usize,
    pub failed_retryable: usize,
    /// Messages put back to `Pending` because the credential was not usable
    /// yet; the transport was not called for them.
    pub deferred: usize,
    /// The pass stopped early because the transport went offline.
    pub interrupted: bool,
}

/// Offline-tolerant outgoing message queue.
///
/// Cheap to clone; clones share the queue.
#[derive(Clone)]
pub struct OfflineSendQueue {
    inner: Arc<Inner>,
}

struct Inner {
    config: Arc<SessionConfiguration>,
    transport: Arc<dyn Transport>,
    auth: AuthenticationController,
    session: Arc<dyn SessionHandler>,
    messages: std::sync::Mutex<VecDeque<QueuedMessage>>,
    flush_lock: Mutex<()>,
}

struct Attempt {
    state: DeliveryState,
    disconnected: bool,
}

impl OfflineSendQueue {
    pub fn new(
        config: Arc<SessionConfiguration>,
        transport: Arc<dyn Transport>,
        auth: AuthenticationController,
        session: Arc<dyn SessionHandler>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                transport,
                auth,
                session,
                messages: std::sync::Mutex::new(VecDeque::new()),
                flush_lock: Mutex::new(()),
            }),
        }
    }

    /// Queue `payload` for sending.
    ///
    /// Fails with [`SendError::Offline`] only when the transport is
    /// disconnected and offline usage is disabled; nothing is queued then.
    /// Otherwise the message is `Pending` when this returns and is sent in
    /// the background as soon as the transport is connected.
    pub fn enqueue(&self, payload: impl Into<String>) -> Result<MessageId, SendError> {
        let connected = self.inner.transport.is_connected();
        if !connected && !self.inner.config.allow_offline_usage() {
            warn!("rejecting message while offline");
            return Err(SendError::Offline);
        }

        let message = QueuedMessage::new(payload);
        let local_id = message.local_id.clone();
        self.inner.session.on_message_state(&message);
        self.messages().push_back(message);
        debug!(%local_id, connected, "message queued");

        if connected {
            self.spawn_flush();
        }
        Ok(local_id)
    }

    /// Messages still owned by the queue, oldest first.
    pub fn snapshot(&self) -> Vec<QueuedMessage> {
        self.messages().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages().is_empty()
    }

    /// Send every `Pending` and `FailedRetryable` message in enqueue order.
    ///
    /// Stops at the first disconnect; the rest keep their state for the
    /// next pass.
    pub async fn flush(&self) -> FlushReport {
        let _pass = self.inner.flush_lock.lock().await;
        let mut report = FlushReport::default();

        let candidates: Vec<MessageId> = self
            .messages()
            .iter()
            .filter(|m| m.state.is_retryable())
            .map(|m| m.local_id.clone())
            .collect();

        for local_id in candidates {
            if !self.inner.transport.is_connected() {
                report.interrupted = true;
                break;
            }
            let Some(attempt) = self.attempt(&local_id).await else {
                continue;
            };
            match attempt.state {
                DeliveryState::Sent => report.sent += 1,
                DeliveryState::FailedTerminal => report.failed_terminal += 1,
                DeliveryState::Pending => report.deferred += 1,
                _ => report.failed_retryable += 1,
            }
            if attempt.disconnected {
                report.interrupted = true;
                break;
            }
        }

        if report != FlushReport::default() {
            info!(
                sent = report.sent,
                failed_terminal = report.failed_terminal,
                failed_retryable = report.failed_retryable,
                deferred = report.deferred,
                interrupted = report.interrupted,
                remaining = self.len(),
                "offline queue flushed"
            );
        }
        report
    }

    /// Retry one `FailedRetryable` message now.
    ///
    /// Terminal messages have already left the queue and are reported as
    /// unknown.
    pub async fn retry(&self, local_id: &MessageId) -> Result<DeliveryState, SendError> {
        let unknown = || SendError::UnknownMessage {
            local_id: local_id.to_string(),
        };
        {
            let messages = self.messages();
            let message = messages
                .iter()
                .find(|m| m.local_id == *local_id)
                .ok_or_else(unknown)?;
            if message.state != DeliveryState::FailedRetryable {
                return Err(SendError::NotRetryable {
                    local_id: local_id.to_string(),
                    state: message.state.to_string(),
                });
            }
        }
        if !self.inner.transport.is_connected() {
            return Err(SendError::Offline);
        }

        let _pass = self.inner.flush_lock.lock().await;
        debug!(%local_id, "explicit retry");
        self.attempt(local_id)
            .await
            .map(|attempt| attempt.state)
            .ok_or_else(unknown)
    }

    /// React to a connectivity change. Reconnecting triggers a flush.
    pub async fn on_connectivity_changed(&self, connected: bool) -> Option<FlushReport> {
        if !connected {
            debug!("transport offline; holding queued messages");
            return None;
        }
        info!(queued = self.len(), "transport online; flushing queued messages");
        Some(self.flush().await)
    }

    /// Follow `connectivity` until `cancel` fires or the sender goes away.
    pub fn watch_connectivity(
        &self,
        mut connectivity: watch::Receiver<bool>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let queue = self.clone();
        tokio::spawn(async move {
            let initially = *connectivity.borrow_and_update();
            if initially && !queue.is_empty() {
                queue.on_connectivity_changed(true).await;
            }
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    changed = connectivity.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let connected = *connectivity.borrow_and_update();
                        queue.on_connectivity_changed(connected).await;
                    }
                }
            }
            debug!("connectivity watcher stopped");
        })
    }

    fn spawn_flush(&self) {
        // Without a runtime the message stays pending until the next flush.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let queue = self.clone();
        handle.spawn(async move {
            queue.flush().await;
        });
    }

    /// One send attempt. `None` if the message left the queue meanwhile.
    async fn attempt(&self, local_id: &MessageId) -> Option<Attempt> {
        let message = {
            let mut messages = self.messages();
            let message = messages.iter_mut().find(|m| m.local_id == *local_id)?;
            if !message.state.is_retryable() {
                return None;
            }
            message.state = DeliveryState::Sending;
            message.attempts += 1;
            message.clone()
        };
        self.inner.session.on_message_state(&message);

        let transport = &self.inner.transport;
        let outgoing = &message;
        let result = self
            .inner
            .auth
            .with_credential(move |credential| async move {
                transport.send(outgoing, credential.as_ref()).await
            })
            .await;

        let disconnected = matches!(
            result,
            Err(SemproError::Transport(TransportError::Disconnected))
        );
        let state = match &result {
            Ok(()) => DeliveryState::Sent,
            Err(SemproError::Transport(
                TransportError::Rejected(_) | TransportError::Permanent(_),
            )) => DeliveryState::FailedTerminal,
            Err(SemproError::Auth(AuthError::InvalidState { .. })) => DeliveryState::Pending,
            Err(_) => DeliveryState::FailedRetryable,
        };
        match &result {
            Ok(()) => debug!(%local_id, attempts = message.attempts, "message sent"),
            Err(err) if state == DeliveryState::Pending => {
                debug!(%local_id, error = %err, "credential not ready; message stays pending");
            }
            Err(err) => warn!(
                %local_id,
                attempts = message.attempts,
                error = %err,
                %state,
                "message send failed"
            ),
        }

        let updated = {
            let mut messages = self.messages();
            let position = messages.iter().position(|m| m.local_id == *local_id)?;
            messages[position].state = state;
            if state == DeliveryState::Pending {
                messages[position].attempts = messages[position].attempts.saturating_sub(1);
            }
            if state.is_terminal() {
                messages.remove(position)
            } else {
                Some(messages[position].clone())
            }
        };
        if let Some(message) = updated {
            self.inner.session.on_message_state(&message);
        }

        Some(Attempt {
            state,
            disconnected,
        })
    }

    fn messages(&self) -> MutexGuard<'_, VecDeque<QueuedMessage>> {
        self.inner
            .messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
