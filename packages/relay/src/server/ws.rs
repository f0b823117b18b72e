//! WebSocket endpoint multiplexing the capture and review roles.
//!
//! A connection is role-less until its first `Register` frame; after that
//! it joins its role's broadcast group and the handler pumps frames both
//! ways until either side drops. All hub state mutations happen inside
//! `HubService`, one inbound frame at a time per connection.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use capture::{ClientMessage, ServerMessage};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use super::app::AppState;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let hub = state.hub;

    // Phase 1: the peer declares its role before anything else flows.
    let role = loop {
        match receiver.next().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Register { role }) => break role,
                Ok(other) => warn!(message = ?other, "frame before registration; ignoring"),
                Err(err) => warn!(error = %err, "undecodable frame before registration"),
            },
            Some(Ok(Message::Close(_))) | None => {
                debug!("peer left before registering");
                return;
            }
            Some(Ok(_)) => {}
            Some(Err(err)) => {
                warn!(error = %err, "socket error before registration");
                return;
            }
        }
    };

    // Join the role group before the connection-scoped flush so nothing
    // published in between is missed; review clients dedup by id.
    let mut group = hub.registry().subscribe(role);
    for message in hub.register(role).await {
        if send_frame(&mut sender, &message).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            inbound = receiver.next() => match inbound {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(message) => hub.handle_message(message).await,
                    Err(err) => warn!(role = ?role, error = %err, "undecodable frame"),
                },
                Some(Ok(Message::Close(_))) => {
                    debug!(role = ?role, "peer sent close frame");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    warn!(role = ?role, error = %err, "socket receive error");
                    break;
                }
                None => {
                    debug!(role = ?role, "socket stream ended");
                    break;
                }
            },
            outbound = group.recv() => match outbound {
                Ok(message) => {
                    if send_frame(&mut sender, &message).await.is_err() {
                        warn!(role = ?role, "failed to push frame; dropping peer");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(role = ?role, missed, "peer lagged behind its role group");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    info!(role = ?role, "peer disconnected");
}

async fn send_frame(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    match serde_json::to_string(message) {
        Ok(frame) => sender.send(Message::Text(frame)).await,
        Err(err) => {
            error!(error = %err, "failed to encode outbound frame");
            Ok(())
        }
    }
}
