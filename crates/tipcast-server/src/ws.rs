//! WebSocket push transport.
//!
//! Each accepted connection gets a writer task fed by an unbounded
//! channel; the connection's [`WsSink`] just pushes into that channel, so
//! a stalled or closed socket surfaces as a sink error at broadcast time
//! instead of blocking the poller.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use tipcast_core::error::SinkError;
use tipcast_core::events::Topic;
use tipcast_engine::registry::{EventSink, SinkId, SubscriptionRegistry};

/// A connected subscriber, registered with the engine per topic.
pub struct WsSink {
    id: SinkId,
    tx: mpsc::UnboundedSender<Message>,
}

#[async_trait]
impl EventSink for WsSink {
    fn id(&self) -> SinkId {
        self.id
    }

    async fn deliver(&self, payload: &str) -> Result<(), SinkError> {
        self.tx
            .send(Message::Text(payload.to_string().into()))
            .map_err(|_| SinkError("subscriber connection closed".into()))
    }
}

/// Map a control message to the topic it subscribes to. Anything that is
/// not a well-formed subscribe op is ignored, not an error.
pub fn parse_subscribe(text: &str) -> Option<Topic> {
    let msg: serde_json::Value = serde_json::from_str(text).ok()?;
    match msg.get("op").and_then(|op| op.as_str()) {
        Some("tx_sub") => Some(Topic::Transactions),
        Some("blocks_sub") => Some(Topic::Blocks),
        _ => None,
    }
}

/// Accept WebSocket subscribers forever, registering and unregistering
/// them with `registry` as they come and go.
pub async fn run(addr: SocketAddr, registry: SubscriptionRegistry) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "WebSocket server listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let registry = registry.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer, registry).await {
                tracing::debug!(%peer, error = %e, "connection ended");
            }
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    registry: SubscriptionRegistry,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let ws = tokio_tungstenite::accept_async(stream).await?;
    tracing::debug!(%peer, "subscriber connected");

    let (mut write, mut read) = ws.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let sink = Arc::new(WsSink {
        id: SinkId::next(),
        tx,
    });

    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if write.send(msg).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Some(topic) = parse_subscribe(text.as_str()) {
                    registry.add(topic, sink.clone());
                }
            }
            Ok(Message::Close(_)) | Err(_) => break,
            _ => {}
        }
    }

    // per-topic removal on disconnect; memberships never cross topics
    registry.remove_all(sink.id());
    writer.abort();
    tracing::debug!(%peer, "subscriber disconnected");
    Ok(())
}
