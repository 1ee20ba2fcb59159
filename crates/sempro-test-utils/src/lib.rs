// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Sempro SDK tests.
//!
//! Provides scriptable mock collaborators so component and integration
//! tests run deterministically without a backend or a host platform.
//!
//! # Components
//!
//! - [`MockTransport`] - scripted send/register/login outcomes and a
//!   controllable connectivity signal
//! - [`MockDelegate`] - authentication delegate with configurable delay and result
//! - [`MockSessionHandler`] - records everything session handling receives
//! - [`RecordingHostHandler`] - host notification handler for chain-order tests

pub mod mock_delegate;
pub mod mock_session;
pub mod mock_transport;

pub use mock_delegate::MockDelegate;
pub use mock_session::{CallLog, MockSessionHandler, RecordingHostHandler};
pub use mock_transport::{MockTransport, SendRecord};
