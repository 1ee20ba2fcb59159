// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock authentication delegate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sempro_core::{AuthenticationDelegate, DelegateError};

/// Delegate that answers every renewal after `delay` with a fixed outcome.
///
/// Successful renewals hand out `"{prefix}-{n}"` so each renewal yields a
/// distinct token.
pub struct MockDelegate {
    delay: Duration,
    outcome: Result<String, String>,
    calls: AtomicUsize,
    completions: AtomicUsize,
}

impl MockDelegate {
    pub fn succeeding(prefix: &str) -> Self {
        Self::with_outcome(Ok(prefix.to_string()))
    }

    pub fn failing(reason: &str) -> Self {
        Self::with_outcome(Err(reason.to_string()))
    }

    fn with_outcome(outcome: Result<String, String>) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome,
            calls: AtomicUsize::new(0),
            completions: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of times `renew` was invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of `renew` invocations that ran to completion.
    pub fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthenticationDelegate for MockDelegate {
    async fn renew(&self) -> Result<String, DelegateError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.completions.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(prefix) => Ok(format!("{prefix}-{n}")),
            Err(reason) => Err(reason.clone().into()),
        }
    }
}
