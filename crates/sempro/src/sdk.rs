// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The SDK facade and its background supervision.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use sempro_auth::AuthenticationController;
use sempro_config::SessionConfiguration;
use sempro_core::{
    ActionCompletion, AppState, CredentialState, DeliveryState, DeviceToken,
    HostNotificationHandler, MessageId, NotificationEvent, QueuedMessage, SemproError, SendError,
    SessionHandler, Transport,
};
use sempro_notify::{
    CategoryRegistry, ChainOrder, DispatchOutcome, HandlerChain, NotificationCategory,
    NotificationDispatcher,
};
use sempro_outbox::OfflineSendQueue;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// External parts the host application supplies.
pub struct Collaborators {
    pub transport: Arc<dyn Transport>,
    pub session: Arc<dyn SessionHandler>,
    pub host_handler: Option<Arc<dyn HostNotificationHandler>>,
    pub chain_order: ChainOrder,
    /// Platform push lifecycle events. Consumed automatically only when
    /// swizzling or the notification-center override is enabled.
    pub platform_events: Option<mpsc::Receiver<NotificationEvent>>,
}

impl Collaborators {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<dyn SessionHandler>) -> Self {
        Self {
            transport,
            session,
            host_handler: None,
            chain_order: ChainOrder::default(),
            platform_events: None,
        }
    }

    /// Chain the host's own notification handler with the SDK's.
    pub fn with_host_handler(
        mut self,
        handler: Arc<dyn HostNotificationHandler>,
        order: ChainOrder,
    ) -> Self {
        self.host_handler = Some(handler);
        self.chain_order = order;
        self
    }

    pub fn with_platform_events(mut self, events: mpsc::Receiver<NotificationEvent>) -> Self {
        self.platform_events = Some(events);
        self
    }
}

/// One SDK session.
pub struct Sempro {
    config: Arc<SessionConfiguration>,
    session: Arc<dyn SessionHandler>,
    auth: AuthenticationController,
    dispatcher: NotificationDispatcher,
    queue: OfflineSendQueue,
    permission_requested: AtomicBool,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Sempro {
    /// Connect the transport and start the session's background tasks.
    ///
    /// A transient connect failure is not fatal: the session starts offline
    /// and the queue flushes once connectivity returns.
    pub async fn initialize(
        configuration: SessionConfiguration,
        collaborators: Collaborators,
    ) -> Result<Self, SemproError> {
        let Collaborators {
            transport,
            session,
            host_handler,
            chain_order,
            platform_events,
        } = collaborators;
        let config = Arc::new(configuration);

        info!(
            app_id = config.app_id(),
            region = config.region(),
            offline = config.allow_offline_usage(),
            "initialising sempro session"
        );
        match transport.connect(config.app_id(), config.region()).await {
            Ok(()) => {}
            Err(err) if err.is_transient() => {
                warn!(error = %err, "transport unavailable; starting offline");
            }
            Err(err) => return Err(err.into()),
        }

        let auth = AuthenticationController::new(config.clone(), transport.clone());
        let chain = match host_handler {
            Some(handler) => HandlerChain::new(handler, chain_order),
            None => HandlerChain::sdk_only(),
        };
        let dispatcher = NotificationDispatcher::new(
            auth.clone(),
            transport.clone(),
            session.clone(),
            CategoryRegistry::new(),
            chain,
        );
        let queue = OfflineSendQueue::new(
            config.clone(),
            transport.clone(),
            auth.clone(),
            session.clone(),
        );

        let cancel = CancellationToken::new();
        let mut tasks = vec![
            queue.watch_connectivity(transport.connectivity(), cancel.child_token()),
            watch_credential_state(
                auth.subscribe(),
                dispatcher.clone(),
                queue.clone(),
                session.clone(),
                cancel.child_token(),
            ),
        ];
        if let Some(events) = platform_events {
            if config.auto_subscribe_platform_events() {
                tasks.push(dispatcher.attach(events, cancel.child_token()));
            } else {
                warn!(
                    "automatic platform event subscription is disabled; \
                     use attach_platform_events or the handler methods"
                );
            }
        }

        Ok(Self {
            config,
            session,
            auth,
            dispatcher,
            queue,
            permission_requested: AtomicBool::new(false),
            cancel,
            tasks: Mutex::new(tasks),
        })
    }

    pub fn configuration(&self) -> &SessionConfiguration {
        &self.config
    }

    pub fn credential_state(&self) -> CredentialState {
        self.auth.state()
    }

    /// Watch credential state changes.
    pub fn subscribe_credential_state(&self) -> watch::Receiver<CredentialState> {
        self.auth.subscribe()
    }

    pub async fn login(&self, jwt: &str) -> Result<(), SemproError> {
        self.auth.login(jwt).await
    }

    pub async fn logout(&self) {
        self.auth.logout().await;
    }

    /// The platform handed out a device token.
    pub async fn set_push_token(&self, token: impl Into<String>) -> DispatchOutcome {
        self.dispatcher
            .on_token_registered(DeviceToken(token.into()))
            .await
    }

    pub fn push_token_registration_failed(&self, reason: &str) -> DispatchOutcome {
        self.dispatcher.on_token_registration_failed(reason)
    }

    pub fn handle_push_notification(
        &self,
        payload: &serde_json::Value,
        app_state: AppState,
    ) -> DispatchOutcome {
        self.dispatcher.on_notification_received(payload, app_state)
    }

    pub async fn handle_user_notification_action(
        &self,
        identifier: &str,
        response_info: &serde_json::Value,
        completion: ActionCompletion,
    ) -> DispatchOutcome {
        self.dispatcher
            .on_user_action(identifier, response_info, completion)
            .await
    }

    /// Categories to register with the platform when automatic registration
    /// is turned off.
    pub fn user_notification_categories(&self) -> &[NotificationCategory] {
        self.dispatcher.categories().categories()
    }

    /// Consume platform events explicitly.
    pub fn attach_platform_events(&self, events: mpsc::Receiver<NotificationEvent>) {
        let task = self.dispatcher.attach(events, self.cancel.child_token());
        self.tasks().push(task);
    }

    /// Queue a message for sending.
    ///
    /// The first accepted message of the session asks session handling for
    /// push permission, when that is enabled.
    pub fn send_message(&self, body: impl Into<String>) -> Result<MessageId, SendError> {
        let local_id = self.queue.enqueue(body)?;
        if self.config.request_push_permission_on_first_message()
            && !self.permission_requested.swap(true, Ordering::SeqCst)
        {
            debug!("requesting push permission after first message");
            self.session.request_push_permission();
        }
        Ok(local_id)
    }

    pub async fn retry_message(&self, local_id: &MessageId) -> Result<DeliveryState, SendError> {
        self.queue.retry(local_id).await
    }

    /// Messages not yet delivered, oldest first.
    pub fn pending_messages(&self) -> Vec<QueuedMessage> {
        self.queue.snapshot()
    }

    /// Stop background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let tasks = std::mem::take(&mut *self.tasks());
        for task in tasks {
            if let Err(err) = task.await {
                warn!(error = %err, "background task ended abnormally");
            }
        }
        info!("sempro session shut down");
    }

    fn tasks(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Sempro {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Forward credential changes to session handling. Once authenticated, flush
/// the buffered device token and any messages still waiting to be sent.
fn watch_credential_state(
    mut states: watch::Receiver<CredentialState>,
    dispatcher: NotificationDispatcher,
    queue: OfflineSendQueue,
    session: Arc<dyn SessionHandler>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = states.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = states.borrow_and_update().clone();
                    session.on_credential_state(&state);
                    match &state {
                        CredentialState::Authenticated => {
                            dispatcher.flush_pending_token().await;
                            if !queue.is_empty() {
                                queue.flush().await;
                            }
                        }
                        CredentialState::Failed(err) => {
                            session.on_error(&SemproError::Auth(err.clone()));
                        }
                        _ => {}
                    }
                }
            }
        }
        debug!("credential watcher stopped");
    })
}
