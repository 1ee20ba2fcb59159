// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential state machine.
//!
//! ```text
//! Unauthenticated -> Authenticating -> Authenticated -> Expiring -> Renewing
//!        ^                 |                ^                          |
//!        |                 v                +------- renewed ----------+
//!        +------------- Failed <--------------------- failed / timeout-+
//! ```
//!
//! Renewal is single-flight. The first expiry signal moves the credential to
//! `Renewing` and spawns the delegate call plus a timeout timer; both report
//! back tagged with the renewal generation, and whichever arrives first for
//! the current generation decides the outcome. Later expiry signals join the
//! waiter list and receive the same outcome, in arrival order. Logout bumps
//! the generation so a late delegate result cannot resurrect the session.

use std::future::Future;
use std::sync::Arc;

use sempro_config::SessionConfiguration;
use sempro_core::{
    AuthError, Credential, CredentialKind, CredentialState, SemproError, Transport,
    TransportError,
};
use tokio::sync::{Mutex, oneshot, watch};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

type Waiter = oneshot::Sender<Result<Credential, AuthError>>;

/// Owner of the session credential.
///
/// Cheap to clone; clones share the same credential.
#[derive(Clone)]
pub struct AuthenticationController {
    inner: Arc<Inner>,
}

struct Inner {
    config: Arc<SessionConfiguration>,
    transport: Arc<dyn Transport>,
    state_tx: watch::Sender<CredentialState>,
    slot: Mutex<CredentialSlot>,
}

struct CredentialSlot {
    state: CredentialState,
    credential: Option<Credential>,
    /// Bumped on every login, renewal and logout.
    generation: u64,
    waiters: Vec<Waiter>,
    timer: Option<AbortHandle>,
}

impl Inner {
    fn transition(&self, slot: &mut CredentialSlot, next: CredentialState) {
        if slot.state != next {
            info!(from = %slot.state, to = %next, "credential state changed");
        }
        slot.state = next.clone();
        self.state_tx.send_replace(next);
    }
}

impl AuthenticationController {
    /// Initialise from the configuration.
    ///
    /// A static auth code starts `Authenticated`. Otherwise the session is
    /// `Unauthenticated` until `login`, or anonymous if there is no delegate
    /// either.
    pub fn new(config: Arc<SessionConfiguration>, transport: Arc<dyn Transport>) -> Self {
        let (credential, state) = match config.auth_code() {
            Some(code) => (
                Some(Credential::auth_code(code)),
                CredentialState::Authenticated,
            ),
            None => (None, CredentialState::Unauthenticated),
        };
        info!(
            state = %state,
            delegate = config.has_authentication_delegate(),
            "authentication controller initialised"
        );

        let (state_tx, _) = watch::channel(state.clone());
        Self {
            inner: Arc::new(Inner {
                config,
                transport,
                state_tx,
                slot: Mutex::new(CredentialSlot {
                    state,
                    credential,
                    generation: 0,
                    waiters: Vec::new(),
                    timer: None,
                }),
            }),
        }
    }

    /// Current credential state.
    pub fn state(&self) -> CredentialState {
        self.inner.state_tx.borrow().clone()
    }

    /// Watch credential state changes.
    pub fn subscribe(&self) -> watch::Receiver<CredentialState> {
        self.inner.state_tx.subscribe()
    }

    /// The credential currently held, if any.
    pub async fn credential(&self) -> Option<Credential> {
        self.inner.slot.lock().await.credential.clone()
    }

    /// Log in with a JWT.
    ///
    /// Rejection by the backend is terminal until the next login. A transient
    /// transport failure leaves the session unauthenticated but not failed.
    pub async fn login(&self, jwt: &str) -> Result<(), SemproError> {
        let generation = {
            let mut slot = self.inner.slot.lock().await;
            if matches!(
                slot.state,
                CredentialState::Authenticating
                    | CredentialState::Expiring
                    | CredentialState::Renewing
            ) {
                return Err(invalid_state(&slot.state, "login").into());
            }
            slot.generation += 1;
            slot.credential = None;
            self.inner
                .transition(&mut slot, CredentialState::Authenticating);
            slot.generation
        };

        let credential = Credential::jwt(jwt);
        let result = self.inner.transport.authenticate(&credential).await;

        let mut slot = self.inner.slot.lock().await;
        if slot.generation != generation || slot.state != CredentialState::Authenticating {
            debug!("discarding login outcome superseded by logout");
            return Err(invalid_state(&slot.state, "login").into());
        }
        match result {
            Ok(()) => {
                slot.credential = Some(credential);
                self.inner
                    .transition(&mut slot, CredentialState::Authenticated);
                Ok(())
            }
            Err(err) if err.is_transient() => {
                warn!(error = %err, "login could not reach the backend");
                self.inner
                    .transition(&mut slot, CredentialState::Unauthenticated);
                Err(err.into())
            }
            Err(err) => {
                warn!(error = %err, "login rejected");
                self.inner
                    .transition(&mut slot, CredentialState::Failed(AuthError::Rejected));
                Err(AuthError::Rejected.into())
            }
        }
    }

    /// Destroy the credential. Pending renewal waiters fail and any
    /// in-flight renewal result is discarded.
    pub async fn logout(&self) {
        let mut slot = self.inner.slot.lock().await;
        slot.generation += 1;
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.credential = None;
        let waiters = std::mem::take(&mut slot.waiters);
        self.inner
            .transition(&mut slot, CredentialState::Unauthenticated);
        drop(slot);

        for waiter in waiters {
            let _ = waiter.send(Err(AuthError::RenewalFailed));
        }
    }

    /// React to a transport call that reported `expired` as expired.
    ///
    /// Starts a renewal, or joins the one in flight. If the credential was
    /// already replaced since `expired` was handed out, the current one is
    /// returned without renewing again.
    pub async fn handle_credential_expired(
        &self,
        expired: &Credential,
    ) -> Result<Credential, AuthError> {
        let rx = {
            let mut slot = self.inner.slot.lock().await;
            match slot.state.clone() {
                CredentialState::Renewing => {
                    debug!("joining in-flight credential renewal");
                    let (tx, rx) = oneshot::channel();
                    slot.waiters.push(tx);
                    rx
                }
                CredentialState::Authenticated => {
                    if let Some(current) = slot.credential.as_ref().filter(|c| *c != expired) {
                        debug!("expiry reported for a superseded credential");
                        return Ok(current.clone());
                    }
                    self.inner.transition(&mut slot, CredentialState::Expiring);
                    match self.begin_renewal(&mut slot) {
                        Ok(rx) => rx,
                        Err(err) => {
                            slot.credential = None;
                            self.inner
                                .transition(&mut slot, CredentialState::Failed(err.clone()));
                            return Err(err);
                        }
                    }
                }
                CredentialState::Failed(err) => return Err(err),
                other => return Err(invalid_state(&other, "renew credential")),
            }
        };

        rx.await.unwrap_or(Err(AuthError::RenewalFailed))
    }

    /// The credential to use for the next transport call.
    ///
    /// Waits for an in-flight login or renewal to settle. `None` means an
    /// anonymous session.
    pub async fn current_credential(&self) -> Result<Option<Credential>, AuthError> {
        loop {
            let mut states = {
                let mut slot = self.inner.slot.lock().await;
                match slot.state.clone() {
                    CredentialState::Authenticated => return Ok(slot.credential.clone()),
                    CredentialState::Unauthenticated => return Ok(None),
                    CredentialState::Failed(err) => return Err(err),
                    CredentialState::Renewing => {
                        let (tx, rx) = oneshot::channel();
                        slot.waiters.push(tx);
                        drop(slot);
                        return rx.await.unwrap_or(Err(AuthError::RenewalFailed)).map(Some);
                    }
                    CredentialState::Authenticating => self.inner.state_tx.subscribe(),
                    other => return Err(invalid_state(&other, "use credential")),
                }
            };

            debug!("waiting for login to settle");
            if states
                .wait_for(|state| *state != CredentialState::Authenticating)
                .await
                .is_err()
            {
                return Err(AuthError::RenewalFailed);
            }
        }
    }

    /// Run a transport call with the current credential.
    ///
    /// On `CredentialExpired` the credential is renewed and the call is
    /// retried exactly once with the new one.
    pub async fn with_credential<T, F, Fut>(&self, op: F) -> Result<T, SemproError>
    where
        F: Fn(Option<Credential>) -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let credential = self.current_credential().await?;
        match op(credential.clone()).await {
            Err(TransportError::CredentialExpired) => {
                let Some(expired) = credential else {
                    return Err(TransportError::CredentialExpired.into());
                };
                let renewed = self.handle_credential_expired(&expired).await?;
                debug!("retrying transport call with renewed credential");
                op(Some(renewed)).await.map_err(SemproError::from)
            }
            other => other.map_err(SemproError::from),
        }
    }

    fn begin_renewal(
        &self,
        slot: &mut CredentialSlot,
    ) -> Result<oneshot::Receiver<Result<Credential, AuthError>>, AuthError> {
        let config = &self.inner.config;
        if !config.has_authentication_delegate() {
            let err = match slot.credential.as_ref().map(Credential::kind) {
                Some(CredentialKind::AuthCode) => AuthError::StaticCredentialExpired,
                _ => AuthError::RenewalFailed,
            };
            warn!(error = %err, "credential expired and no authentication delegate is configured");
            return Err(err);
        }
        let Some(delegate) = config.authentication_delegate() else {
            warn!("authentication delegate was dropped by the host");
            return Err(AuthError::RenewalFailed);
        };

        slot.generation += 1;
        let generation = slot.generation;
        self.inner.transition(slot, CredentialState::Renewing);
        let (tx, rx) = oneshot::channel();
        slot.waiters.push(tx);

        let controller = self.clone();
        tokio::spawn(async move {
            let outcome = delegate.renew().await.map_err(|e| e.to_string());
            controller.finish_renewal(generation, outcome).await;
        });

        let controller = self.clone();
        let timeout = config.renewal_timeout();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            controller
                .finish_renewal(generation, Err(format!("no renewal within {timeout:?}")))
                .await;
        });
        slot.timer = Some(timer.abort_handle());

        debug!(generation, "credential renewal started");
        Ok(rx)
    }

    async fn finish_renewal(&self, generation: u64, outcome: Result<String, String>) {
        let mut slot = self.inner.slot.lock().await;
        if slot.generation != generation || slot.state != CredentialState::Renewing {
            debug!(generation, "discarding stale renewal outcome");
            return;
        }
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }

        let result = match outcome {
            Ok(token) => {
                let credential = Credential::jwt(token);
                slot.credential = Some(credential.clone());
                self.inner
                    .transition(&mut slot, CredentialState::Authenticated);
                Ok(credential)
            }
            Err(reason) => {
                warn!(%reason, "credential renewal failed");
                slot.credential = None;
                self.inner.transition(
                    &mut slot,
                    CredentialState::Failed(AuthError::RenewalFailed),
                );
                Err(AuthError::RenewalFailed)
            }
        };

        let waiters = std::mem::take(&mut slot.waiters);
        drop(slot);
        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }
    }
}

fn invalid_state(state: &CredentialState, action: &'static str) -> AuthError {
    AuthError::InvalidState {
        state: state.to_string(),
        action,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sempro_core::AuthenticationDelegate;
    use sempro_test_utils::{MockDelegate, MockTransport};

    use super::*;

    fn controller(
        config: SessionConfiguration,
        transport: &Arc<MockTransport>,
    ) -> AuthenticationController {
        AuthenticationController::new(Arc::new(config), transport.clone())
    }

    #[tokio::test]
    async fn static_auth_code_starts_authenticated() {
        let transport = Arc::new(MockTransport::connected());
        let config = SessionConfiguration::create("app", Some("code")).unwrap();
        let auth = controller(config, &transport);

        assert_eq!(auth.state(), CredentialState::Authenticated);
        let credential = auth.credential().await.unwrap();
        assert_eq!(credential.kind(), CredentialKind::AuthCode);
        assert_eq!(credential.token(), "code");
    }

    #[tokio::test]
    async fn no_code_starts_unauthenticated() {
        let transport = Arc::new(MockTransport::connected());
        let delegate: Arc<dyn AuthenticationDelegate> = Arc::new(MockDelegate::succeeding("jwt"));
        let config = SessionConfiguration::create("app", None).unwrap();
        config.set_authentication_delegate(&delegate).unwrap();
        let auth = controller(config, &transport);

        assert_eq!(auth.state(), CredentialState::Unauthenticated);
        assert_eq!(auth.current_credential().await.unwrap(), None);
    }

    #[tokio::test]
    async fn login_accepted_authenticates() {
        let transport = Arc::new(MockTransport::connected());
        let config = SessionConfiguration::create("app", None).unwrap();
        let auth = controller(config, &transport);
        let mut states = auth.subscribe();

        auth.login("jwt-a").await.unwrap();
        assert_eq!(auth.state(), CredentialState::Authenticated);
        assert_eq!(transport.logins().await, vec!["jwt-a"]);
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), CredentialState::Authenticated);
    }

    #[tokio::test]
    async fn login_rejected_fails_session() {
        let transport = Arc::new(MockTransport::connected());
        transport
            .script_login(Err(TransportError::Rejected("bad jwt".into())))
            .await;
        let config = SessionConfiguration::create("app", None).unwrap();
        let auth = controller(config, &transport);

        let err = auth.login("jwt-a").await.unwrap_err();
        assert_eq!(err, SemproError::Auth(AuthError::Rejected));
        assert_eq!(auth.state(), CredentialState::Failed(AuthError::Rejected));
        assert_eq!(auth.credential().await, None);

        // Re-login is allowed from the failed state.
        auth.login("jwt-b").await.unwrap();
        assert_eq!(auth.state(), CredentialState::Authenticated);
    }

    #[tokio::test]
    async fn login_offline_stays_unauthenticated() {
        let transport = Arc::new(MockTransport::connected());
        transport.script_login(Err(TransportError::Disconnected)).await;
        let config = SessionConfiguration::create("app", None).unwrap();
        let auth = controller(config, &transport);

        let err = auth.login("jwt-a").await.unwrap_err();
        assert_eq!(err, SemproError::Transport(TransportError::Disconnected));
        assert_eq!(auth.state(), CredentialState::Unauthenticated);
    }

    #[tokio::test]
    async fn static_code_expiry_is_terminal_without_delegate() {
        let transport = Arc::new(MockTransport::connected());
        let config = SessionConfiguration::create("app", Some("code")).unwrap();
        let auth = controller(config, &transport);
        let mut states = auth.subscribe();

        let expired = auth.credential().await.unwrap();
        let err = auth.handle_credential_expired(&expired).await.unwrap_err();
        assert_eq!(err, AuthError::StaticCredentialExpired);
        assert_eq!(
            auth.state(),
            CredentialState::Failed(AuthError::StaticCredentialExpired)
        );
        assert!(states.has_changed().unwrap());

        // Every later use of the credential reports the same failure.
        assert_eq!(
            auth.current_credential().await.unwrap_err(),
            AuthError::StaticCredentialExpired
        );
    }

    #[tokio::test]
    async fn expiry_while_unauthenticated_is_invalid() {
        let transport = Arc::new(MockTransport::connected());
        let config = SessionConfiguration::create("app", None).unwrap();
        let auth = controller(config, &transport);
        let err = auth
            .handle_credential_expired(&Credential::jwt("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidState { action: "renew credential", .. }));
    }

    #[tokio::test]
    async fn dropped_delegate_fails_renewal() {
        let transport = Arc::new(MockTransport::connected());
        let delegate: Arc<dyn AuthenticationDelegate> = Arc::new(MockDelegate::succeeding("jwt"));
        let config = SessionConfiguration::create("app", None).unwrap();
        config.set_authentication_delegate(&delegate).unwrap();
        drop(delegate);

        let auth = controller(config, &transport);
        auth.login("jwt-0").await.unwrap();
        let expired = auth.credential().await.unwrap();
        assert_eq!(
            auth.handle_credential_expired(&expired).await.unwrap_err(),
            AuthError::RenewalFailed
        );
        assert_eq!(auth.state(), CredentialState::Failed(AuthError::RenewalFailed));
    }

    #[tokio::test(start_paused = true)]
    async fn credential_waits_for_login_in_flight() {
        let transport =
            Arc::new(MockTransport::connected().with_login_delay(Duration::from_millis(200)));
        let config = SessionConfiguration::create("app", None).unwrap();
        let auth = controller(config, &transport);

        let login = tokio::spawn({
            let auth = auth.clone();
            async move { auth.login("jwt-a").await }
        });
        tokio::task::yield_now().await;
        assert_eq!(auth.state(), CredentialState::Authenticating);

        let credential = auth.current_credential().await.unwrap().unwrap();
        assert_eq!(credential.token(), "jwt-a");
        login.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn credential_after_rejected_login_is_the_failure() {
        let transport =
            Arc::new(MockTransport::connected().with_login_delay(Duration::from_millis(200)));
        transport
            .script_login(Err(TransportError::Rejected("bad jwt".into())))
            .await;
        let config = SessionConfiguration::create("app", None).unwrap();
        let auth = controller(config, &transport);

        let login = tokio::spawn({
            let auth = auth.clone();
            async move { auth.login("jwt-a").await }
        });
        tokio::task::yield_now().await;

        assert_eq!(
            auth.current_credential().await.unwrap_err(),
            AuthError::Rejected
        );
        assert!(login.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn logout_clears_credential() {
        let transport = Arc::new(MockTransport::connected());
        let config = SessionConfiguration::create("app", Some("code")).unwrap();
        let auth = controller(config, &transport);
        auth.logout().await;
        assert_eq!(auth.state(), CredentialState::Unauthenticated);
        assert_eq!(auth.credential().await, None);
    }
}
