//! WebSocket transport with automatic reconnect

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle, time::sleep};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use super::{Connection, ConnectionEvent, CHANNEL_CAPACITY};
use crate::protocol::is_handshake;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}

/// Holds back outbound frames on a fresh connection until the session's
/// auth frame comes through. Anything queued for an earlier connection is
/// dropped instead of going out ahead of the handshake.
#[derive(Debug, Default)]
struct HandshakeGate {
    authenticated: bool,
    discarded: usize,
}

impl HandshakeGate {
    fn reset(&mut self) {
        self.authenticated = false;
        self.discarded = 0;
    }

    fn admit(&mut self, frame: &str) -> bool {
        if !self.authenticated {
            if !is_handshake(frame) {
                self.discarded += 1;
                return false;
            }
            if self.discarded > 0 {
                debug!("Discarded {} frames queued before the handshake", self.discarded);
            }
            self.authenticated = true;
        }
        true
    }
}

/// Spawn the transport task for `url` and return the session side of it.
///
/// The task exits once the returned [`Connection`] is dropped, after
/// flushing any frames the session queued before dropping it.
pub fn spawn_websocket(url: String) -> (Connection, JoinHandle<()>) {
    let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (outbound_tx, outbound_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let handle = tokio::spawn(transport_loop(url, event_tx, outbound_rx));
    (Connection::new(event_rx, outbound_tx), handle)
}

async fn transport_loop(
    url: String,
    events: mpsc::Sender<ConnectionEvent>,
    mut outbound: mpsc::Receiver<String>,
) {
    let mut backoff = INITIAL_BACKOFF;
    let mut gate = HandshakeGate::default();

    loop {
        let mut ws = match connect_async(url.as_str()).await {
            Ok((ws, _)) => ws,
            Err(e) => {
                warn!("Failed to connect to {}: {}, retrying in {:?}", url, e, backoff);
                tokio::select! {
                    _ = sleep(backoff) => {}
                    _ = events.closed() => return,
                }
                backoff = next_backoff(backoff);
                continue;
            }
        };
        backoff = INITIAL_BACKOFF;
        info!("Connected to {}", url);

        gate.reset();

        if events.send(ConnectionEvent::Opened).await.is_err() {
            let _ = ws.close(None).await;
            return;
        }

        let session_gone = loop {
            tokio::select! {
                inbound = ws.next() => match inbound {
                    Some(Ok(Message::Text(text))) => {
                        if events.send(ConnectionEvent::Frame(text)).await.is_err() {
                            break true;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break false,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break false;
                    }
                },
                frame = outbound.recv() => match frame {
                    Some(frame) if !gate.admit(&frame) => {}
                    Some(frame) => {
                        debug!("Sending {}", frame);
                        if let Err(e) = ws.send(Message::Text(frame)).await {
                            warn!("Failed to send frame: {}", e);
                            break false;
                        }
                    }
                    None => break true,
                },
            }
        };

        let _ = ws.close(None).await;
        if session_gone {
            info!("Session closed, transport shutting down");
            return;
        }

        warn!("Connection to {} lost", url);
        if events.send(ConnectionEvent::Closed).await.is_err() {
            return;
        }
    }
}
