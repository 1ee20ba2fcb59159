// SPDX-FileCopyrightText: 2026 Sempro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform event loop and host handler chaining.

use std::sync::{Arc, Mutex};

use sempro_auth::AuthenticationController;
use sempro_config::SessionConfiguration;
use sempro_core::{ActionCompletion, ActionOutcome, AppState, DeviceToken, NotificationEvent};
use sempro_notify::{CategoryRegistry, ChainOrder, HandlerChain, NotificationDispatcher};
use sempro_test_utils::{CallLog, MockSessionHandler, MockTransport, RecordingHostHandler};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

struct Harness {
    dispatcher: NotificationDispatcher,
    transport: Arc<MockTransport>,
    session: Arc<MockSessionHandler>,
    host: Arc<RecordingHostHandler>,
    log: CallLog,
}

fn harness(order: ChainOrder) -> Harness {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let transport = Arc::new(MockTransport::connected());
    let session = Arc::new(MockSessionHandler::new(&[]).with_log(log.clone()));
    let host = Arc::new(RecordingHostHandler::new().with_log(log.clone()));

    let config = SessionConfiguration::create("app", Some("code")).unwrap();
    let auth = AuthenticationController::new(Arc::new(config), transport.clone());
    let dispatcher = NotificationDispatcher::new(
        auth,
        transport.clone(),
        session.clone(),
        CategoryRegistry::new(),
        HandlerChain::new(host.clone(), order),
    );
    Harness {
        dispatcher,
        transport,
        session,
        host,
        log,
    }
}

#[tokio::test]
async fn attached_events_are_dispatched_in_order() {
    let h = harness(ChainOrder::SdkFirst);
    let (tx, rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let task = h.dispatcher.attach(rx, cancel.clone());

    tx.send(NotificationEvent::DeviceTokenRegistered {
        token: DeviceToken("tok".into()),
    })
    .await
    .unwrap();
    tx.send(NotificationEvent::NotificationReceived {
        payload: json!({"unexpected": true}),
        app_state: AppState::Foreground,
    })
    .await
    .unwrap();
    tx.send(NotificationEvent::NotificationReceived {
        payload: json!({"type": "message", "conversation_id": "c-9"}),
        app_state: AppState::Foreground,
    })
    .await
    .unwrap();
    drop(tx);
    task.await.unwrap();

    assert_eq!(h.transport.registrations().await.len(), 1);
    // The malformed payload was reported and the next one still delivered.
    assert_eq!(h.session.errors().len(), 1);
    assert_eq!(h.session.notifications().len(), 1);
    // The host saw both payloads, recognised or not.
    assert_eq!(h.host.received().len(), 2);
}

#[tokio::test]
async fn host_first_chain_runs_host_before_sdk() {
    let h = harness(ChainOrder::HostFirst);
    h.dispatcher.on_notification_received(
        &json!({"type": "message", "conversation_id": "c-1"}),
        AppState::Background,
    );
    assert_eq!(*h.log.lock().unwrap(), vec!["host", "sdk"]);
}

#[tokio::test]
async fn unknown_action_from_event_loop_completes_once() {
    let h = harness(ChainOrder::SdkFirst);
    let (tx, rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let task = h.dispatcher.attach(rx, cancel.clone());

    let (completion, outcome) = ActionCompletion::channel();
    tx.send(NotificationEvent::UserAction {
        identifier: "NotOurs".into(),
        response_info: json!({}),
        completion,
    })
    .await
    .unwrap();

    assert_eq!(outcome.await.unwrap(), ActionOutcome::NoOp);
    assert!(h.session.actions().is_empty());

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test]
async fn failing_action_still_completes() {
    let transport = Arc::new(MockTransport::connected());
    let session = Arc::new(MockSessionHandler::new(&["Archive"]).failing_actions());
    let config = SessionConfiguration::create("app", None).unwrap();
    let auth = AuthenticationController::new(Arc::new(config), transport.clone());
    let dispatcher = NotificationDispatcher::new(
        auth,
        transport,
        session.clone(),
        CategoryRegistry::new(),
        HandlerChain::sdk_only(),
    );

    let (completion, outcome) = ActionCompletion::channel();
    dispatcher
        .on_user_action("Archive", &json!({}), completion)
        .await;
    assert_eq!(outcome.await.unwrap(), ActionOutcome::Failed);
    assert_eq!(session.errors().len(), 1);
}

#[tokio::test]
async fn cancelled_loop_stops_consuming() {
    let h = harness(ChainOrder::SdkFirst);
    let (tx, rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let task = h.dispatcher.attach(rx, cancel.clone());

    cancel.cancel();
    task.await.unwrap();
    assert!(tx.is_closed());
}
