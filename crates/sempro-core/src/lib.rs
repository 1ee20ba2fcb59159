// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Sempro messaging SDK.
//!
//! This crate provides the error taxonomy, the shared data model and the
//! collaborator traits (transport, authentication delegate, session handling)
//! that every other Sempro crate is built against.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{AuthError, ConfigError, NotifyError, SemproError, SendError, TransportError};
pub use types::{
    ActionCompletion, ActionOutcome, AppState, ClassifiedNotification, Credential,
    CredentialKind, CredentialState, DeliveryState, DeviceToken, MenuItem, MessageId,
    NotificationEvent, PushNotification, QueuedMessage, StatusBarStyle,
};

pub use traits::delegate::DelegateError;
pub use traits::{AuthenticationDelegate, HostNotificationHandler, SessionHandler, Transport};
