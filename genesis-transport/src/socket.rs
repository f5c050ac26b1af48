//! Cross-process carrier: mirrors one topic over a WebSocket connection so a
//! participant in another OS process sees the same samples as a local
//! subscriber would.
//!
//! [`serve_topic`] runs a single-state axum router whose WebSocket handler
//! relays a continuous bidirectional stream of [`RawSample`]s rather than one
//! request/response exchange; [`connect_topic`] is the matching client half,
//! built on `tokio-tungstenite`.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message as TungsteniteMessage;

use crate::sample::RawSample;
use crate::topic::Topic;

/// Serves `topic` over `addr`, accepting any number of peer connections.
/// Each connection is relayed independently: every sample published on
/// `topic` after the connection opens is forwarded to the peer, and every
/// sample the peer sends is republished locally via [`Topic::raw_publish`].
///
/// Runs until the listener is closed or the process exits; callers
/// typically `tokio::spawn` this alongside the rest of a participant's work.
pub async fn serve_topic(addr: &str, topic: Topic) -> std::io::Result<()> {
    let state = Arc::new(topic);
    let app = Router::new()
        .route("/", get(ws_handler))
        .with_state(state);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "socket bridge listening");
    axum::serve(listener, app).await
}

async fn ws_handler(ws: WebSocketUpgrade, State(topic): State<Arc<Topic>>) -> Response {
    ws.on_upgrade(move |socket| relay_server_socket(socket, topic))
}

async fn relay_server_socket(socket: WebSocket, topic: Arc<Topic>) {
    let (mut sink, mut stream) = socket.split();
    let mut rx = topic.raw_subscribe();

    let outbound = async {
        loop {
            match rx.recv().await {
                Ok(raw) => {
                    let Ok(json) = serde_json::to_string(&raw) else {
                        continue;
                    };
                    if sink.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "socket bridge outbound lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    let inbound = async {
        while let Some(Ok(msg)) = stream.next().await {
            if let Message::Text(text) = msg {
                match serde_json::from_str::<RawSample>(&text) {
                    Ok(raw) => topic.raw_publish(raw),
                    Err(e) => tracing::warn!(error = %e, "socket bridge received malformed sample"),
                }
            }
        }
    };

    tokio::select! {
        _ = outbound => {}
        _ = inbound => {}
    }
}

/// Connects to a peer started with [`serve_topic`] and relays `topic` over
/// that connection in both directions, blocking until the connection drops.
pub async fn connect_topic(url: &str, topic: Topic) -> Result<(), crate::error::TransportError> {
    let (ws_stream, _) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(|e| crate::error::TransportError::ConnectionFailed(e.to_string()))?;
    let (mut sink, mut stream) = ws_stream.split();
    let mut rx = topic.raw_subscribe();

    let outbound = async {
        loop {
            match rx.recv().await {
                Ok(raw) => {
                    let Ok(json) = serde_json::to_string(&raw) else {
                        continue;
                    };
                    if sink.send(TungsteniteMessage::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "socket bridge outbound lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    let inbound = async {
        while let Some(Ok(msg)) = stream.next().await {
            if let TungsteniteMessage::Text(text) = msg {
                match serde_json::from_str::<RawSample>(&text) {
                    Ok(raw) => topic.raw_publish(raw),
                    Err(e) => tracing::warn!(error = %e, "socket bridge received malformed sample"),
                }
            }
        }
    };

    tokio::select! {
        _ = outbound => {}
        _ = inbound => {}
    }
    Ok(())
}
