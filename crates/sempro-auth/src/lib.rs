// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential lifecycle for the Sempro messaging SDK.
//!
//! The [`AuthenticationController`] is the only owner of the session
//! credential. Other components read its state or run transport calls
//! through [`AuthenticationController::with_credential`], which renews an
//! expired credential through the host's authentication delegate and retries
//! the call once.

pub mod controller;

pub use controller::AuthenticationController;
