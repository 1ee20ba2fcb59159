// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing of platform push lifecycle events.
//!
//! Nothing here propagates an error to the event source. Failures are
//! reported to session handling and the pipeline moves on to the next event.

use std::sync::Arc;

use sempro_auth::AuthenticationController;
use sempro_core::{
    ActionCompletion, ActionOutcome, AppState, ClassifiedNotification, CredentialState,
    DeviceToken, NotificationEvent, NotifyError, PushNotification, SemproError, SessionHandler,
    Transport,
};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::category::CategoryRegistry;
use crate::chain::HandlerChain;

/// What the dispatcher did with one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The device token was registered with the backend.
    TokenForwarded,
    /// The session is not authenticated yet; the token is held until it is.
    TokenBuffered,
    /// A recognised notification was handed to session handling.
    Delivered,
    /// A user action finished and its completion was signalled.
    ActionCompleted(ActionOutcome),
    /// The event failed and was reported to session handling.
    Reported(NotifyError),
}

/// Push event router.
///
/// Cheap to clone; clones share the buffered device token.
#[derive(Clone)]
pub struct NotificationDispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    auth: AuthenticationController,
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionHandler>,
    categories: CategoryRegistry,
    chain: HandlerChain,
    pending_token: Mutex<Option<DeviceToken>>,
}

impl NotificationDispatcher {
    pub fn new(
        auth: AuthenticationController,
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionHandler>,
        categories: CategoryRegistry,
        chain: HandlerChain,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                auth,
                transport,
                session,
                categories,
                chain,
                pending_token: Mutex::new(None),
            }),
        }
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.inner.categories
    }

    /// Route one platform event.
    pub async fn dispatch(&self, event: NotificationEvent) -> DispatchOutcome {
        match event {
            NotificationEvent::DeviceTokenRegistered { token } => {
                self.on_token_registered(token).await
            }
            NotificationEvent::DeviceTokenRegistrationFailed { error } => {
                self.on_token_registration_failed(&error)
            }
            NotificationEvent::NotificationReceived { payload, app_state } => {
                self.on_notification_received(&payload, app_state)
            }
            NotificationEvent::UserAction {
                identifier,
                response_info,
                completion,
            } => {
                self.on_user_action(&identifier, &response_info, completion)
                    .await
            }
        }
    }

    /// Register `token` now if authenticated, otherwise hold it.
    ///
    /// Only the latest token is held; an older buffered one is replaced.
    pub async fn on_token_registered(&self, token: DeviceToken) -> DispatchOutcome {
        if self.inner.auth.state() == CredentialState::Authenticated {
            return self.register(token).await;
        }

        if let Some(previous) = self.inner.pending_token.lock().await.replace(token) {
            debug!(token = %previous, "replacing buffered device token");
        }
        debug!("device token buffered until authenticated");

        // Authentication may have completed while the token was being stored.
        match self.flush_pending_token().await {
            Some(outcome) => outcome,
            None => DispatchOutcome::TokenBuffered,
        }
    }

    /// Register the buffered token, if any, once the session is authenticated.
    pub async fn flush_pending_token(&self) -> Option<DispatchOutcome> {
        if self.inner.auth.state() != CredentialState::Authenticated {
            return None;
        }
        let token = self.inner.pending_token.lock().await.take()?;
        debug!("flushing buffered device token");
        Some(self.register(token).await)
    }

    /// The token waiting for authentication, if any.
    pub async fn pending_token(&self) -> Option<DeviceToken> {
        self.inner.pending_token.lock().await.clone()
    }

    /// The platform could not obtain a device token. Not retried.
    pub fn on_token_registration_failed(&self, error: &str) -> DispatchOutcome {
        warn!(%error, "device token registration failed");
        self.report(NotifyError::RegistrationFailed {
            reason: error.to_string(),
        })
    }

    /// Classify `payload` and hand it to session handling.
    ///
    /// The host handler, if chained, sees every payload including ones the
    /// SDK does not recognise.
    pub fn on_notification_received(
        &self,
        payload: &serde_json::Value,
        app_state: AppState,
    ) -> DispatchOutcome {
        self.inner
            .chain
            .run(payload, app_state, || self.deliver(payload, app_state))
    }

    /// Perform a notification action and signal `completion` exactly once.
    ///
    /// Identifiers that no registered category or session handling declares
    /// are completed immediately with [`ActionOutcome::NoOp`].
    pub async fn on_user_action(
        &self,
        identifier: &str,
        response_info: &serde_json::Value,
        completion: ActionCompletion,
    ) -> DispatchOutcome {
        if !self.is_registered_action(identifier) {
            debug!(identifier, "ignoring unregistered notification action");
            completion.complete(ActionOutcome::NoOp);
            return DispatchOutcome::ActionCompleted(ActionOutcome::NoOp);
        }

        let outcome = match self
            .inner
            .session
            .handle_action(identifier, response_info)
            .await
        {
            Ok(()) => ActionOutcome::Handled,
            Err(err) => {
                warn!(identifier, error = %err, "notification action failed");
                self.inner.session.on_error(&err);
                ActionOutcome::Failed
            }
        };
        completion.complete(outcome);
        DispatchOutcome::ActionCompleted(outcome)
    }

    /// Consume platform events until `events` closes or `cancel` fires.
    ///
    /// User actions run on their own task so a slow action does not hold up
    /// later deliveries.
    pub fn attach(
        &self,
        mut events: mpsc::Receiver<NotificationEvent>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            info!("platform notification events attached");
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = events.recv() => {
                        let Some(event) = event else { break };
                        if matches!(event, NotificationEvent::UserAction { .. }) {
                            let dispatcher = dispatcher.clone();
                            tokio::spawn(async move {
                                dispatcher.dispatch(event).await;
                            });
                        } else {
                            dispatcher.dispatch(event).await;
                        }
                    }
                }
            }
            debug!("platform notification event loop stopped");
        })
    }

    fn is_registered_action(&self, identifier: &str) -> bool {
        self.inner.categories.knows_action(identifier)
            || self
                .inner
                .session
                .action_identifiers()
                .iter()
                .any(|known| known == identifier)
    }

    fn deliver(&self, payload: &serde_json::Value, app_state: AppState) -> DispatchOutcome {
        match serde_json::from_value::<PushNotification>(payload.clone()) {
            Ok(notification) => {
                debug!(
                    conversation = notification.conversation_id(),
                    %app_state,
                    "delivering push notification"
                );
                self.inner.session.on_notification(ClassifiedNotification {
                    notification,
                    app_state,
                });
                DispatchOutcome::Delivered
            }
            Err(err) => {
                warn!(error = %err, "dropping unrecognised push payload");
                self.report(NotifyError::MalformedPayload {
                    reason: err.to_string(),
                })
            }
        }
    }

    async fn register(&self, token: DeviceToken) -> DispatchOutcome {
        let transport = &self.inner.transport;
        let token = &token;
        let result = self
            .inner
            .auth
            .with_credential(move |credential| async move {
                transport.register_device(token, credential.as_ref()).await
            })
            .await;

        match result {
            Ok(()) => {
                info!("device token registered");
                DispatchOutcome::TokenForwarded
            }
            Err(err) => {
                warn!(error = %err, "device token could not be registered");
                self.report(NotifyError::RegistrationFailed {
                    reason: err.to_string(),
                })
            }
        }
    }

    fn report(&self, error: NotifyError) -> DispatchOutcome {
        self.inner
            .session
            .on_error(&SemproError::Notify(error.clone()));
        DispatchOutcome::Reported(error)
    }
}

#[cfg(test)]
mod tests {
    use sempro_config::SessionConfiguration;
    use sempro_test_utils::{MockSessionHandler, MockTransport};
    use serde_json::json;
    use tracing_test::traced_test;

    use super::*;

    fn dispatcher(
        auth_code: Option<&str>,
    ) -> (NotificationDispatcher, Arc<MockTransport>, Arc<MockSessionHandler>) {
        let transport = Arc::new(MockTransport::connected());
        let session = Arc::new(MockSessionHandler::new(&["Archive"]));
        let config = SessionConfiguration::create("app", auth_code).unwrap();
        let auth = AuthenticationController::new(Arc::new(config), transport.clone());
        let dispatcher = NotificationDispatcher::new(
            auth,
            transport.clone(),
            session.clone(),
            CategoryRegistry::new(),
            HandlerChain::sdk_only(),
        );
        (dispatcher, transport, session)
    }

    #[tokio::test]
    async fn token_forwarded_when_authenticated() {
        let (dispatcher, transport, _) = dispatcher(Some("code"));
        let outcome = dispatcher
            .on_token_registered(DeviceToken("tok".into()))
            .await;
        assert_eq!(outcome, DispatchOutcome::TokenForwarded);
        assert_eq!(
            transport.registrations().await,
            vec![(DeviceToken("tok".into()), Some("code".to_string()))]
        );
    }

    #[tokio::test]
    async fn only_latest_token_is_buffered() {
        let (dispatcher, transport, _) = dispatcher(None);
        assert_eq!(
            dispatcher.on_token_registered(DeviceToken("a".into())).await,
            DispatchOutcome::TokenBuffered
        );
        dispatcher.on_token_registered(DeviceToken("b".into())).await;
        assert_eq!(dispatcher.pending_token().await, Some(DeviceToken("b".into())));
        assert!(transport.registrations().await.is_empty());
        assert_eq!(dispatcher.flush_pending_token().await, None);
    }

    #[tokio::test]
    async fn buffered_token_flushes_after_login() {
        let (dispatcher, transport, _) = dispatcher(None);
        dispatcher.on_token_registered(DeviceToken("a".into())).await;
        dispatcher.on_token_registered(DeviceToken("b".into())).await;

        dispatcher.inner.auth.login("jwt").await.unwrap();
        assert_eq!(
            dispatcher.flush_pending_token().await,
            Some(DispatchOutcome::TokenForwarded)
        );
        assert_eq!(
            transport.registrations().await,
            vec![(DeviceToken("b".into()), Some("jwt".to_string()))]
        );
        assert_eq!(dispatcher.pending_token().await, None);
    }

    #[tokio::test]
    async fn registration_failure_is_reported_not_retried() {
        let (dispatcher, transport, session) = dispatcher(Some("code"));
        let outcome = dispatcher.on_token_registration_failed("no entitlement");
        assert_eq!(
            outcome,
            DispatchOutcome::Reported(NotifyError::RegistrationFailed {
                reason: "no entitlement".into()
            })
        );
        assert_eq!(session.errors().len(), 1);
        assert!(transport.registrations().await.is_empty());
    }

    #[tokio::test]
    async fn recognised_payload_is_delivered() {
        let (dispatcher, _, session) = dispatcher(Some("code"));
        let payload = json!({
            "type": "message",
            "conversation_id": "c-1",
            "text": "hi"
        });
        assert_eq!(
            dispatcher.on_notification_received(&payload, AppState::Background),
            DispatchOutcome::Delivered
        );
        let delivered = session.notifications();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].app_state, AppState::Background);
        assert_eq!(delivered[0].notification.conversation_id(), "c-1");
    }

    #[tokio::test]
    #[traced_test]
    async fn payload_without_type_is_reported_and_dropped() {
        let (dispatcher, _, session) = dispatcher(Some("code"));
        let payload = json!({"conversation_id": "c-1"});
        let outcome = dispatcher.on_notification_received(&payload, AppState::Foreground);
        assert!(matches!(
            outcome,
            DispatchOutcome::Reported(NotifyError::MalformedPayload { .. })
        ));
        assert!(session.notifications().is_empty());
        assert!(matches!(
            session.errors().as_slice(),
            [SemproError::Notify(NotifyError::MalformedPayload { .. })]
        ));
        assert!(logs_contain("dropping unrecognised push payload"));

        // The next event is still processed.
        let next = json!({
            "type": "conversation_activity",
            "conversation_id": "c-1",
            "activity": "typing"
        });
        assert_eq!(
            dispatcher.on_notification_received(&next, AppState::Foreground),
            DispatchOutcome::Delivered
        );
    }

    #[tokio::test]
    async fn unknown_action_completes_immediately_with_noop() {
        let (dispatcher, _, session) = dispatcher(Some("code"));
        let (completion, rx) = ActionCompletion::channel();
        let outcome = dispatcher
            .on_user_action("Unknown", &json!({}), completion)
            .await;
        assert_eq!(outcome, DispatchOutcome::ActionCompleted(ActionOutcome::NoOp));
        assert_eq!(rx.await.unwrap(), ActionOutcome::NoOp);
        assert!(session.actions().is_empty());
    }

    #[tokio::test]
    async fn session_and_default_actions_are_handled() {
        let (dispatcher, _, session) = dispatcher(Some("code"));

        let (completion, rx) = ActionCompletion::channel();
        dispatcher
            .on_user_action("Archive", &json!({}), completion)
            .await;
        assert_eq!(rx.await.unwrap(), ActionOutcome::Handled);

        let (completion, rx) = ActionCompletion::channel();
        dispatcher
            .on_user_action(crate::REPLY_ACTION_ID, &json!({"text": "ok"}), completion)
            .await;
        assert_eq!(rx.await.unwrap(), ActionOutcome::Handled);
        assert_eq!(session.actions().len(), 2);
    }
}
