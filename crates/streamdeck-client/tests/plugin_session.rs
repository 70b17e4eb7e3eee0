//! End-to-end tests against an in-process WebSocket server playing the
//! Stream Deck application.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use streamdeck_client::{ClientError, Connection, PluginHandle, RegistrationArgs};
use streamdeck_core::received::{DeviceDidConnect, KeyUp};
use streamdeck_core::{Command, ConnectionState, Envelope, Target, TypeRegistry};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

const WAIT: Duration = Duration::from_secs(5);

const KEY_UP: &str = r#"{"event":"keyUp","action":"a","context":"ABC123","device":"DEF456","payload":{"settings":{},"coordinates":{"column":3,"row":1},"state":0,"userDesiredState":1,"isInMultiAction":false}}"#;
const UNKNOWN: &str = r#"{"event":"keyTwirl","context":"ABC123"}"#;
const MALFORMED_KEY_UP: &str = r#"{"event":"keyUp","action":"a","context":["not","a","string"],"device":"d","payload":{}}"#;

async fn listen() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = listener.accept().await.unwrap();
    tokio_tungstenite::accept_async(stream).await.unwrap()
}

/// Next text frame from the plugin, skipping control frames.
async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> String {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return text.to_string(),
            Some(Ok(_)) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

fn args(port: u16) -> RegistrationArgs {
    RegistrationArgs::new(port, "PLUGIN-UUID", "registerPlugin")
}

async fn wait_closed(plugin: &PluginHandle) {
    timeout(WAIT, plugin.wait_for_exit())
        .await
        .expect("exit signal did not fire");
}

#[tokio::test]
async fn session_routes_frames_and_sends_commands() {
    let (listener, port) = listen().await;
    let (to_test, mut from_server) = mpsc::unbounded_channel::<String>();

    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        to_test.send(next_text(&mut ws).await).unwrap();

        for frame in [UNKNOWN, MALFORMED_KEY_UP] {
            ws.send(Message::Text(frame.into())).await.unwrap();
        }
        ws.send(Message::Binary(vec![1, 2, 3].into())).await.unwrap();
        ws.send(Message::Text(KEY_UP.into())).await.unwrap();

        to_test.send(next_text(&mut ws).await).unwrap();
        ws.close(None).await.unwrap();
    });

    let calls = Arc::new(AtomicUsize::new(0));
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut conn = Connection::new(Arc::new(TypeRegistry::builtin()));
    let counter = calls.clone();
    conn.on(move |event: KeyUp| {
        counter.fetch_add(1, Ordering::SeqCst);
        let _ = event_tx.send(event);
    })
    .unwrap();

    let plugin = conn.connect(&args(port)).await.unwrap();
    assert_eq!(plugin.state(), ConnectionState::Open);

    // The registration frame comes first.
    let handshake: Value = serde_json::from_str(&from_server.recv().await.unwrap()).unwrap();
    assert_eq!(
        handshake,
        json!({"event": "registerPlugin", "uuid": "PLUGIN-UUID"})
    );

    // Unknown, malformed and binary frames before it did not stop the loop.
    let key_up = timeout(WAIT, event_rx.recv()).await.unwrap().unwrap();
    assert_eq!(key_up.context, "ABC123");
    assert_eq!(key_up.payload.state, Some(0));

    plugin
        .send(&Command::set_title(&key_up.context, "1", Target::Hardware, None))
        .await
        .unwrap();

    let sent: Envelope = serde_json::from_str(&from_server.recv().await.unwrap()).unwrap();
    assert_eq!(sent.event, "setTitle");
    assert_eq!(sent.context.as_deref(), Some("ABC123"));
    assert_eq!(sent.payload, Some(json!({"title": "1", "target": 1})));

    let first = plugin.clone();
    let second = plugin.clone();
    timeout(WAIT, async {
        tokio::join!(first.wait_for_exit(), second.wait_for_exit());
    })
    .await
    .expect("waiters were not released");

    assert!(plugin.is_closed());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Already closed: returns at once, and sending is refused.
    wait_closed(&plugin).await;
    assert!(matches!(
        plugin.send(&Command::log_message("late")).await,
        Err(ClientError::Closed)
    ));

    server.await.unwrap();
}

#[tokio::test]
async fn unhandled_events_are_ignored() {
    let (listener, port) = listen().await;

    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        next_text(&mut ws).await;
        ws.send(Message::Text(r#"{"event":"systemDidWakeUp"}"#.into()))
            .await
            .unwrap();
        ws.send(Message::Text(
            r#"{"event":"deviceDidConnect","device":"D1","deviceInfo":{"name":"Deck","type":0,"size":{"columns":5,"rows":3}}}"#.into(),
        ))
        .await
        .unwrap();
        ws.close(None).await.unwrap();
    });

    let (device_tx, mut device_rx) = mpsc::unbounded_channel();
    let mut conn = Connection::new(Arc::new(TypeRegistry::builtin()));
    conn.on(move |event: DeviceDidConnect| {
        let _ = device_tx.send(event.device);
    })
    .unwrap();

    let plugin = conn.connect(&args(port)).await.unwrap();
    let device = timeout(WAIT, device_rx.recv()).await.unwrap().unwrap();
    assert_eq!(device, "D1");

    wait_closed(&plugin).await;
    server.await.unwrap();
}

#[tokio::test]
async fn concurrent_senders_each_write_whole_frames() {
    const SENDERS: usize = 16;
    let (listener, port) = listen().await;
    let (to_test, mut from_server) = mpsc::unbounded_channel::<String>();

    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        next_text(&mut ws).await;
        for _ in 0..SENDERS {
            to_test.send(next_text(&mut ws).await).unwrap();
        }
        ws.close(None).await.unwrap();
    });

    let conn = Connection::new(Arc::new(TypeRegistry::builtin()));
    let plugin = conn.connect(&args(port)).await.unwrap();

    let mut tasks = Vec::new();
    for i in 0..SENDERS {
        let plugin = plugin.clone();
        tasks.push(tokio::spawn(async move {
            plugin.send(&Command::log_message(format!("message {i}"))).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let mut messages = HashSet::new();
    for _ in 0..SENDERS {
        let frame: Envelope = serde_json::from_str(&from_server.recv().await.unwrap()).unwrap();
        assert_eq!(frame.event, "logMessage");
        messages.insert(frame.payload.unwrap()["message"].as_str().unwrap().to_string());
    }
    assert_eq!(messages.len(), SENDERS);

    wait_closed(&plugin).await;
    server.await.unwrap();
}

#[tokio::test]
async fn dropped_transport_fires_exit() {
    let (listener, port) = listen().await;

    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        next_text(&mut ws).await;
        // No close frame: the TCP stream simply goes away.
        drop(ws);
    });

    let conn = Connection::new(Arc::new(TypeRegistry::builtin()));
    let plugin = conn.connect(&args(port)).await.unwrap();

    wait_closed(&plugin).await;
    assert_eq!(plugin.state(), ConnectionState::Closed);
    server.await.unwrap();
}

#[tokio::test]
async fn raw_frames_are_sent_verbatim() {
    let (listener, port) = listen().await;
    let (to_test, mut from_server) = mpsc::unbounded_channel::<String>();

    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        next_text(&mut ws).await;
        to_test.send(next_text(&mut ws).await).unwrap();
        ws.close(None).await.unwrap();
    });

    let conn = Connection::new(Arc::new(TypeRegistry::builtin()));
    let plugin = conn.connect(&args(port)).await.unwrap();

    let raw = json!({"event": "setResources", "context": "C", "payload": {"x": 1}});
    plugin.send_raw(&raw).await.unwrap();

    let echoed: Value = serde_json::from_str(&from_server.recv().await.unwrap()).unwrap();
    assert_eq!(echoed, raw);

    wait_closed(&plugin).await;
    server.await.unwrap();
}

#[tokio::test]
async fn panicking_handler_closes_session() {
    let (listener, port) = listen().await;

    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        next_text(&mut ws).await;
        ws.send(Message::Text(KEY_UP.into())).await.unwrap();
        ws
    });

    let mut conn = Connection::new(Arc::new(TypeRegistry::builtin()));
    conn.on(|_: KeyUp| panic!("handler failed")).unwrap();
    let plugin = conn.connect(&args(port)).await.unwrap();

    wait_closed(&plugin).await;
    assert_eq!(plugin.state(), ConnectionState::Closed);
    assert!(plugin.is_closed());
    assert!(matches!(
        plugin.send(&Command::log_message("after panic")).await,
        Err(ClientError::Closed)
    ));

    let mut ws = server.await.unwrap();
    // Nothing was written after the handler died.
    let next = timeout(Duration::from_millis(200), ws.next()).await;
    assert!(!matches!(next, Ok(Some(Ok(Message::Text(_))))));
}

#[tokio::test]
async fn close_frame_is_answered() {
    let (listener, port) = listen().await;

    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        next_text(&mut ws).await;
        ws.close(None).await.unwrap();
        let mut answered = false;
        while let Some(frame) = ws.next().await {
            if let Ok(Message::Close(_)) = frame {
                answered = true;
            }
        }
        answered
    });

    let conn = Connection::new(Arc::new(TypeRegistry::builtin()));
    let plugin = conn.connect(&args(port)).await.unwrap();

    wait_closed(&plugin).await;
    let answered = timeout(WAIT, server).await.unwrap().unwrap();
    assert!(answered);
}
