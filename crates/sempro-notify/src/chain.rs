// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composite notification handling.
//!
//! The host application may keep its own notification handler. It runs next
//! to the SDK's handling, never instead of it.

use std::fmt;
use std::sync::Arc;

use sempro_core::{AppState, HostNotificationHandler};

/// Which handler sees an incoming notification first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainOrder {
    #[default]
    SdkFirst,
    HostFirst,
}

/// The SDK handler chained with an optional host handler.
#[derive(Clone, Default)]
pub struct HandlerChain {
    host: Option<Arc<dyn HostNotificationHandler>>,
    order: ChainOrder,
}

impl HandlerChain {
    pub fn new(host: Arc<dyn HostNotificationHandler>, order: ChainOrder) -> Self {
        Self {
            host: Some(host),
            order,
        }
    }

    /// No host handler; only the SDK runs.
    pub fn sdk_only() -> Self {
        Self::default()
    }

    pub fn order(&self) -> ChainOrder {
        self.order
    }

    /// Run `sdk` and the host handler in the configured order.
    pub fn run<T>(
        &self,
        payload: &serde_json::Value,
        app_state: AppState,
        sdk: impl FnOnce() -> T,
    ) -> T {
        let Some(host) = &self.host else {
            return sdk();
        };
        match self.order {
            ChainOrder::SdkFirst => {
                let result = sdk();
                host.on_notification(payload, app_state);
                result
            }
            ChainOrder::HostFirst => {
                host.on_notification(payload, app_state);
                sdk()
            }
        }
    }
}

impl fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("host", &self.host.is_some())
            .field("order", &self.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use sempro_test_utils::{CallLog, RecordingHostHandler};

    use super::*;

    fn chain_with_log(order: ChainOrder) -> (HandlerChain, CallLog) {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let host = Arc::new(RecordingHostHandler::new().with_log(log.clone()));
        (HandlerChain::new(host, order), log)
    }

    #[test]
    fn sdk_first_runs_sdk_then_host() {
        let (chain, log) = chain_with_log(ChainOrder::SdkFirst);
        let value = chain.run(&serde_json::json!({}), AppState::Foreground, || {
            log.lock().unwrap().push("sdk");
            7
        });
        assert_eq!(value, 7);
        assert_eq!(*log.lock().unwrap(), vec!["sdk", "host"]);
    }

    #[test]
    fn host_first_runs_host_then_sdk() {
        let (chain, log) = chain_with_log(ChainOrder::HostFirst);
        chain.run(&serde_json::json!({}), AppState::Background, || {
            log.lock().unwrap().push("sdk");
        });
        assert_eq!(*log.lock().unwrap(), vec!["host", "sdk"]);
    }

    #[test]
    fn sdk_only_runs_sdk() {
        let chain = HandlerChain::sdk_only();
        assert_eq!(chain.run(&serde_json::json!(null), AppState::Foreground, || 1), 1);
    }
}
