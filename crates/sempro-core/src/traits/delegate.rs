// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication delegate trait for renewable credentials.

use async_trait::async_trait;

/// Error type returned by host delegates.
pub type DelegateError = Box<dyn std::error::Error + Send + Sync>;

/// Host hook that supplies a fresh JWT when the current one has expired.
///
/// Called at most once concurrently; concurrent expiries are coalesced by
/// the authentication controller. The SDK only holds a weak reference to
/// the delegate, so the host keeps it alive.
#[async_trait]
pub trait AuthenticationDelegate: Send + Sync + 'static {
    /// Produce a new token, or fail.
    async fn renew(&self) -> Result<String, DelegateError>;
}
