// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport trait for the hosted messaging backend.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::TransportError;
use crate::types::{Credential, DeviceToken, QueuedMessage};

/// Opaque client of the messaging backend (HTTPS/WebSocket).
///
/// Sends are assumed idempotent per `local_id`, so a message may be resent
/// after a transient failure. A `None` credential means an anonymous session;
/// whether that is permitted is up to the backend.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Point the transport at the app and region. Region is forwarded as-is.
    async fn connect(&self, app_id: &str, region: &str) -> Result<(), TransportError>;

    /// Current connectivity.
    fn is_connected(&self) -> bool;

    /// Connectivity changes, latest value wins.
    fn connectivity(&self) -> watch::Receiver<bool>;

    /// Present a credential for acceptance (used by `login`).
    async fn authenticate(&self, credential: &Credential) -> Result<(), TransportError>;

    /// Deliver one queued message.
    async fn send(
        &self,
        message: &QueuedMessage,
        credential: Option<&Credential>,
    ) -> Result<(), TransportError>;

    /// Associate a push token with the session.
    async fn register_device(
        &self,
        token: &DeviceToken,
        credential: Option<&Credential>,
    ) -> Result<(), TransportError>;
}
