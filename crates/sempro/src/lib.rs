// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client integration core of the Sempro messaging SDK.
//!
//! [`Sempro`] wires the session configuration, the authentication
//! controller, the notification dispatcher and the offline send queue
//! together, and supervises the background tasks that connect them.
//!
//! # Usage
//!
//! ```no_run
//! # async fn run(
//! #     transport: std::sync::Arc<dyn sempro::Transport>,
//! #     session: std::sync::Arc<dyn sempro::SessionHandler>,
//! # ) -> Result<(), sempro::SemproError> {
//! use sempro::{Collaborators, Sempro, SessionConfiguration};
//!
//! let config = SessionConfiguration::create("my-app-id", None)?;
//! let sdk = Sempro::initialize(config, Collaborators::new(transport, session)).await?;
//! sdk.login("header.payload.signature").await?;
//! sdk.send_message("hello")?;
//! sdk.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod logging;
mod sdk;

pub use sdk::{Collaborators, Sempro};

pub use sempro_auth::AuthenticationController;
pub use sempro_config::{
    Color, DEFAULT_REGION, LoadError, SemproConfig, SessionConfiguration, load_and_validate,
    load_and_validate_str, render_errors,
};
pub use sempro_core::*;
pub use sempro_notify::{
    CategoryRegistry, ChainOrder, DispatchOutcome, NotificationAction, NotificationCategory,
    NotificationDispatcher, REPLY_ACTION_ID, REPLY_CATEGORY_ID,
};
pub use sempro_outbox::{FlushReport, OfflineSendQueue};
