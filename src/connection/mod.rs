//! Connection boundary
//!
//! The session only consumes four primitives from the transport: an open
//! notification, inbound text frames, outbound text frames and a close
//! notification. Reconnect policy lives entirely behind this seam.

pub mod websocket;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::protocol::Command;

pub use websocket::spawn_websocket;

/// Buffer size of the channels between the session and its transport
pub const CHANNEL_CAPACITY: usize = 64;

/// Notification from the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// A fresh connection is open and ready for the handshake
    Opened,
    /// A text frame arrived
    Frame(String),
    /// The connection dropped; an `Opened` may follow after reconnecting
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("transport is gone")]
pub struct TransportGone;

/// Session side of a duplex text connection
#[derive(Debug)]
pub struct Connection {
    events: mpsc::Receiver<ConnectionEvent>,
    outbound: mpsc::Sender<String>,
}

impl Connection {
    pub fn new(events: mpsc::Receiver<ConnectionEvent>, outbound: mpsc::Sender<String>) -> Self {
        Self { events, outbound }
    }

    /// In-memory connection plus the peer end that plays the server
    pub fn pair() -> (Connection, Peer) {
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (outbound_tx, outbound_rx) = mpsc::channel(CHANNEL_CAPACITY);
        (
            Connection::new(event_rx, outbound_tx),
            Peer {
                events: event_tx,
                outbound: outbound_rx,
            },
        )
    }

    /// Next transport notification, `None` once the transport has shut down
    pub async fn recv(&mut self) -> Option<ConnectionEvent> {
        self.events.recv().await
    }

    pub async fn send(&self, command: &Command) -> Result<(), TransportGone> {
        self.outbound
            .send(command.encode())
            .await
            .map_err(|_| TransportGone)
    }
}

/// Transport side of an in-memory [`Connection`]
#[derive(Debug)]
pub struct Peer {
    events: mpsc::Sender<ConnectionEvent>,
    outbound: mpsc::Receiver<String>,
}

impl Peer {
    pub async fn open(&self) -> Result<(), TransportGone> {
        self.notify(ConnectionEvent::Opened).await
    }

    pub async fn deliver(&self, frame: impl Into<String>) -> Result<(), TransportGone> {
        self.notify(ConnectionEvent::Frame(frame.into())).await
    }

    pub async fn close(&self) -> Result<(), TransportGone> {
        self.notify(ConnectionEvent::Closed).await
    }

    async fn notify(&self, event: ConnectionEvent) -> Result<(), TransportGone> {
        self.events.send(event).await.map_err(|_| TransportGone)
    }

    /// Next frame the session sent, `None` once the session dropped its end
    pub async fn next_frame(&mut self) -> Option<String> {
        self.outbound.recv().await
    }

    /// Frames already sent and not yet read
    pub fn drain(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.outbound.try_recv() {
            frames.push(frame);
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::TimerAction;

    #[tokio::test]
    async fn pair_carries_frames_both_ways() {
        let (mut conn, mut peer) = Connection::pair();

        peer.open().await.unwrap();
        peer.deliver("1:event:timer:ABC123:join").await.unwrap();
        assert_eq!(conn.recv().await, Some(ConnectionEvent::Opened));
        assert_eq!(
            conn.recv().await,
            Some(ConnectionEvent::Frame("1:event:timer:ABC123:join".into()))
        );

        let id = "ABC123".parse().unwrap();
        conn.send(&Command::timer(TimerAction::Join, &id)).await.unwrap();
        assert_eq!(peer.next_frame().await.as_deref(), Some("1:cmd:timer:join:ABC123"));

        drop(conn);
        assert_eq!(peer.open().await, Err(TransportGone));
        assert_eq!(peer.next_frame().await, None);
    }
}
