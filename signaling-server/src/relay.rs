use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt, TryFutureExt};
use gesture_call_protocol::{PeerId, SignalMessage};
use log::{error, info, warn};
use tokio::sync::{mpsc, RwLock};
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

/// Registry of live endpoints: identity to outbound message queue.
/// The only state shared across connections; mutated on connect and
/// disconnect, read to resolve forwarding targets.
pub type Connections = Arc<RwLock<HashMap<PeerId, mpsc::UnboundedSender<Message>>>>;

pub async fn peer_connected(ws: WebSocket, connections: Connections) {
    let peer_id = PeerId::new(Uuid::new_v4().to_string());
    info!("new peer connected: {}", peer_id);

    let (mut peer_ws_tx, mut peer_ws_rx) = ws.split();

    let (tx, rx) = mpsc::unbounded_channel();
    let mut rx = UnboundedReceiverStream::new(rx);

    tokio::task::spawn(async move {
        while let Some(message) = rx.next().await {
            peer_ws_tx
                .send(message)
                .unwrap_or_else(|err| warn!("websocket send error: {}", err))
                .await;
        }
    });

    // The identity notice goes onto the outbound queue before the sender is
    // registered, so it reaches the peer ahead of any forwarded message.
    let identity = SignalMessage::IdentityAssigned {
        id: peer_id.clone(),
    };
    if tx.send(Message::Text(to_text(&identity))).is_err() {
        warn!("peer {} went away before identity delivery", peer_id);
        return;
    }
    connections.write().await.insert(peer_id.clone(), tx);

    while let Some(result) = peer_ws_rx.next().await {
        let msg = match result {
            Ok(msg) => msg,
            Err(err) => {
                warn!("websocket error (peer {}): {}", peer_id, err);
                break;
            }
        };

        peer_message(&peer_id, msg, &connections).await;
    }

    peer_disconnected(&peer_id, &connections).await;
}

/// Handle one inbound frame from `sender`. Invitations and answers are
/// forwarded to the endpoint they address; the relay never inspects the
/// handshake payloads and performs no call-semantics validation.
pub async fn peer_message(sender: &PeerId, msg: Message, connections: &Connections) {
    let msg = match msg {
        Message::Text(msg) => msg,
        _ => return,
    };
    match serde_json::from_str::<SignalMessage>(&msg) {
        Ok(request) => {
            info!("message received from peer {}: {:?}", sender, request);
            match request {
                SignalMessage::Invite { to, payload, .. } => {
                    // The sender's registered identity overrides whatever it
                    // claimed in `from`.
                    let forwarded = SignalMessage::Invite {
                        to: to.clone(),
                        from: sender.clone(),
                        payload,
                    };
                    forward(&to, &forwarded, connections).await;
                }
                SignalMessage::Answer { to, payload } => {
                    let forwarded = SignalMessage::Answer {
                        to: to.clone(),
                        payload,
                    };
                    forward(&to, &forwarded, connections).await;
                }
                SignalMessage::IdentityAssigned { .. } | SignalMessage::CallEnded => {
                    warn!(
                        "peer {} sent a message only the relay may originate, ignoring",
                        sender
                    );
                }
            }
        }
        Err(err) => {
            error!("malformed signal message from peer {}: {:?}", sender, err);
        }
    }
}

async fn forward(to: &PeerId, message: &SignalMessage, connections: &Connections) {
    let connections_reader = connections.read().await;
    match connections_reader.get(to) {
        Some(recipient_tx) => {
            if recipient_tx.send(Message::Text(to_text(message))).is_err() {
                warn!("peer {} hung up before delivery", to);
            }
        }
        // Best-effort signaling: no error channel back to the sender.
        None => warn!("no such peer: {}, dropping message", to),
    }
}

/// Remove the endpoint from the registry and notify all remaining endpoints
/// that a call may have ended. The relay tracks no call pairings, so the
/// notice cannot be scoped to the former call partner; idle clients treat
/// it as a no-op.
pub async fn peer_disconnected(peer_id: &PeerId, connections: &Connections) {
    info!("peer disconnected: {}", peer_id);
    let mut connections_writer = connections.write().await;
    connections_writer.remove(peer_id);

    let notice = Message::Text(to_text(&SignalMessage::CallEnded));
    for tx in connections_writer.values() {
        if tx.send(notice.clone()).is_err() {
            warn!("stale connection encountered while broadcasting call end");
        }
    }
}

fn to_text(message: &SignalMessage) -> String {
    serde_json::to_string(message).expect("signal messages always serialize")
}
