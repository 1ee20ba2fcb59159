// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push notification dispatch for the Sempro messaging SDK.
//!
//! The [`NotificationDispatcher`] routes platform push lifecycle events:
//! device tokens go to the backend once the session is authenticated,
//! recognised payloads go to session handling, and user actions are
//! completed exactly once whatever happens.

pub mod category;
pub mod chain;
pub mod dispatcher;

pub use category::{
    CategoryRegistry, NotificationAction, NotificationCategory, REPLY_ACTION_ID,
    REPLY_CATEGORY_ID,
};
pub use chain::{ChainOrder, HandlerChain};
pub use dispatcher::{DispatchOutcome, NotificationDispatcher};
