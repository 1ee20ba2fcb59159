// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline send queue for the Sempro messaging SDK.
//!
//! Outgoing messages are queued in FIFO order and sent whenever the transport
//! is connected. Retries are driven by connectivity changes and explicit user
//! retries only; there is no timer-based backoff.

pub mod queue;

pub use queue::{FlushReport, OfflineSendQueue};
