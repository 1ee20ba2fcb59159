// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits at the seams of the SDK core.
//!
//! Implementations are supplied by the host application (delegate, session
//! handling, host notification handler) or by the messaging backend client
//! (transport). Async traits use `#[async_trait]` for dynamic dispatch.

pub mod delegate;
pub mod host;
pub mod session;
pub mod transport;

pub use delegate::AuthenticationDelegate;
pub use host::HostNotificationHandler;
pub use session::SessionHandler;
pub use transport::Transport;
