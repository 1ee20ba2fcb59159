// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport with scripted outcomes.
//!
//! Sends are matched on message payload: each payload can be given a queue
//! of results consumed one per attempt, falling back to `Ok(())`. Any call
//! presenting a token marked expired fails with `CredentialExpired`.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, watch};

use sempro_core::{Credential, DeviceToken, QueuedMessage, Transport, TransportError};

/// One observed send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRecord {
    pub local_id: String,
    pub payload: String,
    pub token: Option<String>,
}

pub struct MockTransport {
    connected: watch::Sender<bool>,
    login_delay: Duration,
    expired_tokens: Mutex<HashSet<String>>,
    send_script: Mutex<HashMap<String, VecDeque<Result<(), TransportError>>>>,
    register_script: Mutex<VecDeque<Result<(), TransportError>>>,
    login_script: Mutex<VecDeque<Result<(), TransportError>>>,
    sends: Mutex<Vec<SendRecord>>,
    registrations: Mutex<Vec<(DeviceToken, Option<String>)>>,
    logins: Mutex<Vec<String>>,
    connects: Mutex<Vec<(String, String)>>,
}

impl MockTransport {
    /// A transport with the given initial connectivity.
    pub fn new(connected: bool) -> Self {
        let (tx, _) = watch::channel(connected);
        Self {
            connected: tx,
            login_delay: Duration::ZERO,
            expired_tokens: Mutex::new(HashSet::new()),
            send_script: Mutex::new(HashMap::new()),
            register_script: Mutex::new(VecDeque::new()),
            login_script: Mutex::new(VecDeque::new()),
            sends: Mutex::new(Vec::new()),
            registrations: Mutex::new(Vec::new()),
            logins: Mutex::new(Vec::new()),
            connects: Mutex::new(Vec::new()),
        }
    }

    pub fn connected() -> Self {
        Self::new(true)
    }

    pub fn disconnected() -> Self {
        Self::new(false)
    }

    /// Make every `authenticate` call take `delay` before answering.
    pub fn with_login_delay(mut self, delay: Duration) -> Self {
        self.login_delay = delay;
        self
    }

    /// Flip connectivity and notify watchers.
    pub fn set_connected(&self, connected: bool) {
        self.connected.send_replace(connected);
    }

    /// Calls presenting `token` fail with `CredentialExpired` from now on.
    pub async fn expire_token(&self, token: &str) {
        self.expired_tokens.lock().await.insert(token.to_string());
    }

    /// Queue results for successive sends of `payload`.
    pub async fn script_send(
        &self,
        payload: &str,
        results: impl IntoIterator<Item = Result<(), TransportError>>,
    ) {
        self.send_script
            .lock()
            .await
            .entry(payload.to_string())
            .or_default()
            .extend(results);
    }

    pub async fn script_register(&self, result: Result<(), TransportError>) {
        self.register_script.lock().await.push_back(result);
    }

    pub async fn script_login(&self, result: Result<(), TransportError>) {
        self.login_script.lock().await.push_back(result);
    }

    pub async fn sends(&self) -> Vec<SendRecord> {
        self.sends.lock().await.clone()
    }

    /// Payloads of all send attempts, in call order.
    pub async fn sent_payloads(&self) -> Vec<String> {
        self.sends
            .lock()
            .await
            .iter()
            .map(|r| r.payload.clone())
            .collect()
    }

    pub async fn clear_sends(&self) {
        self.sends.lock().await.clear();
    }

    pub async fn registrations(&self) -> Vec<(DeviceToken, Option<String>)> {
        self.registrations.lock().await.clone()
    }

    pub async fn logins(&self) -> Vec<String> {
        self.logins.lock().await.clone()
    }

    pub async fn connects(&self) -> Vec<(String, String)> {
        self.connects.lock().await.clone()
    }

    async fn check_expired(&self, credential: Option<&Credential>) -> Result<(), TransportError> {
        match credential {
            Some(c) if self.expired_tokens.lock().await.contains(c.token()) => {
                Err(TransportError::CredentialExpired)
            }
            _ => Ok(()),
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::connected()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, app_id: &str, region: &str) -> Result<(), TransportError> {
        self.connects
            .lock()
            .await
            .push((app_id.to_string(), region.to_string()));
        Ok(())
    }

    fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    fn connectivity(&self) -> watch::Receiver<bool> {
        self.connected.subscribe()
    }

    async fn authenticate(&self, credential: &Credential) -> Result<(), TransportError> {
        self.logins.lock().await.push(credential.token().to_string());
        if !self.login_delay.is_zero() {
            tokio::time::sleep(self.login_delay).await;
        }
        self.login_script.lock().await.pop_front().unwrap_or(Ok(()))
    }

    async fn send(
        &self,
        message: &QueuedMessage,
        credential: Option<&Credential>,
    ) -> Result<(), TransportError> {
        self.sends.lock().await.push(SendRecord {
            local_id: message.local_id.to_string(),
            payload: message.payload.clone(),
            token: credential.map(|c| c.token().to_string()),
        });
        self.check_expired(credential).await?;
        if !self.is_connected() {
            return Err(TransportError::Disconnected);
        }
        self.send_script
            .lock()
            .await
            .get_mut(&message.payload)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Ok(()))
    }

    async fn register_device(
        &self,
        token: &DeviceToken,
        credential: Option<&Credential>,
    ) -> Result<(), TransportError> {
        self.check_expired(credential).await?;
        self.registrations
            .lock()
            .await
            .push((token.clone(), credential.map(|c| c.token().to_string())));
        self.register_script.lock().await.pop_front().unwrap_or(Ok(()))
    }
}
