//! Shared harness for integration tests: a real server on an ephemeral port.

#![allow(clippy::panic, dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use world_sync::app_state::AppState;
use world_sync::build_app;
use world_sync::config::SyncConfig;

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

/// Starts the full application and returns its address and shared state.
pub async fn spawn_server(config: SyncConfig) -> (SocketAddr, AppState) {
    let state = AppState::new(config).await;
    let app = build_app(state.clone());
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("failed to bind test listener");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener has no address");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, state)
}

/// Opens a subscriber connection.
pub async fn subscribe(addr: SocketAddr) -> Client {
    let Ok((ws, _)) = connect_async(format!("ws://{addr}/subscribe")).await else {
        panic!("websocket handshake failed");
    };
    ws
}

/// Waits until exactly `n` sessions are live.
pub async fn wait_for_live(state: &AppState, n: usize) {
    let reached = tokio::time::timeout(WAIT, async {
        while state.broadcaster.live_count() != n {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(
        reached.is_ok(),
        "expected {n} live sessions, have {}",
        state.broadcaster.live_count()
    );
}

/// Reads the next text frame as JSON.
pub async fn next_json(ws: &mut Client) -> serde_json::Value {
    loop {
        let Ok(next) = tokio::time::timeout(WAIT, ws.next()).await else {
            panic!("timed out waiting for frame");
        };
        match next {
            Some(Ok(Message::Text(text))) => {
                let Ok(value) = serde_json::from_str(text.as_str()) else {
                    panic!("frame is not JSON: {text}");
                };
                return value;
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

/// Asserts no frame arrives within a short grace period.
pub async fn expect_silence(ws: &mut Client) {
    let next = tokio::time::timeout(Duration::from_millis(200), ws.next()).await;
    assert!(next.is_err(), "unexpected frame: {next:?}");
}
