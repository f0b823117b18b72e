//! WebSocket link to the relay hub.
//!
//! Plays the background-agent role: registers as a `CAPTURE` peer, forwards
//! scraped batches, and surfaces hub-initiated traffic (the discovery
//! address, delete commands) to the host over a channel. Connection loss is
//! not fatal: the next forward attempt reconnects, and the failed batch is
//! reported to the caller rather than silently dropped.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ForwardError, LinkError};
use crate::protocol::{ClientMessage, Role, ServerMessage};
use crate::traits::BatchSink;
use crate::types::PostRecord;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, Message>;
type WsReader = SplitStream<WsStream>;

/// Hub-initiated traffic surfaced to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// One-shot reachable-address push, sent by the hub on registration.
    Discovery { address: String },
    /// The hub wants the identified post removed from the live page.
    DeleteCommand { id: String },
}

/// Client side of the capture<->hub channel.
pub struct RelayLink {
    endpoint: Url,
    writer: Mutex<Option<WsWriter>>,
    events: mpsc::Sender<LinkEvent>,
}

impl RelayLink {
    /// Create a link to `endpoint` (e.g. `ws://192.168.1.20:3000/ws`).
    ///
    /// The returned receiver yields hub-initiated events. The link connects
    /// lazily: the first forward (or an explicit [`connect`]) dials out.
    ///
    /// [`connect`]: RelayLink::connect
    pub fn new(endpoint: &str) -> Result<(Arc<Self>, mpsc::Receiver<LinkEvent>), LinkError> {
        let endpoint = Url::parse(endpoint)?;
        let (events, receiver) = mpsc::channel(32);
        let link = Arc::new(Self {
            endpoint,
            writer: Mutex::new(None),
            events,
        });
        Ok((link, receiver))
    }

    /// Dial the hub and register as a capture peer. A no-op when already
    /// connected.
    pub async fn connect(&self) -> Result<(), ForwardError> {
        let mut writer = self.writer.lock().await;
        if writer.is_some() {
            return Ok(());
        }

        let (stream, _) = connect_async(self.endpoint.as_str())
            .await
            .map_err(|err| ForwardError::Disconnected(err.to_string()))?;
        let (mut write, read) = stream.split();

        let register = serde_json::to_string(&ClientMessage::Register {
            role: Role::Capture,
        })?;
        write
            .send(Message::Text(register))
            .await
            .map_err(|err| ForwardError::Disconnected(err.to_string()))?;
        info!(endpoint = %self.endpoint, "registered with relay hub");

        tokio::spawn(read_loop(read, self.events.clone()));
        *writer = Some(write);
        Ok(())
    }
}

async fn read_loop(mut read: WsReader, events: mpsc::Sender<LinkEvent>) {
    while let Some(frame) = read.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };
        match serde_json::from_str::<ServerMessage>(&text) {
            Ok(ServerMessage::Discovery { address }) => {
                info!(address = %address, "hub discovery address");
                let _ = events.send(LinkEvent::Discovery { address }).await;
            }
            Ok(ServerMessage::DeleteCommand { id }) => {
                debug!(id = %id, "delete command from hub");
                let _ = events.send(LinkEvent::DeleteCommand { id }).await;
            }
            Ok(other) => debug!(message = ?other, "ignoring hub message"),
            Err(err) => warn!(error = %err, "undecodable hub frame"),
        }
    }
    debug!("relay link read loop ended");
}

#[async_trait]
impl BatchSink for RelayLink {
    async fn forward(&self, batch: &[PostRecord]) -> Result<(), ForwardError> {
        self.connect().await?;

        let frame = serde_json::to_string(&ClientMessage::ScrapedBatch {
            posts: batch.to_vec(),
        })?;

        let mut writer = self.writer.lock().await;
        let Some(write) = writer.as_mut() else {
            return Err(ForwardError::Disconnected(
                "link closed during forward".to_string(),
            ));
        };
        if let Err(err) = write.send(Message::Text(frame)).await {
            // Drop the dead writer; the next forward reconnects.
            *writer = None;
            return Err(ForwardError::Disconnected(err.to_string()));
        }
        debug!(count = batch.len(), "forwarded batch to hub");
        Ok(())
    }
}
