//! Session driver task
//!
//! Runs one timer session on one connection. Inbound frames, local
//! commands and ticker periods are all handled on this single task, so
//! the session state is never touched concurrently and needs no lock.

use std::future::Future;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::{
    connection::{Connection, ConnectionEvent},
    protocol::Command,
    state::{CommandRejected, SessionStatus, TickOutcome, TimerSession, TimerSnapshot},
    utils::now_millis,
};

/// Local user command forwarded to the driver
#[derive(Debug, Clone)]
pub enum LocalCommand {
    Create,
    Start,
    Pause,
    Resume,
    Leave,
    /// Replace the local view with a freshly fetched snapshot
    Resync(TimerSnapshot),
}

#[derive(Debug)]
struct ControlRequest {
    command: LocalCommand,
    reply: oneshot::Sender<Result<SessionStatus, CommandRejected>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error(transparent)]
    Rejected(#[from] CommandRejected),
    #[error("session is no longer running")]
    SessionGone,
}

/// Cloneable handle for issuing commands and observing status
#[derive(Debug, Clone)]
pub struct SessionHandle {
    control_tx: mpsc::Sender<ControlRequest>,
    status_rx: watch::Receiver<SessionStatus>,
}

impl SessionHandle {
    /// Run a local command on the session and return the resulting status
    pub async fn execute(&self, command: LocalCommand) -> Result<SessionStatus, ControlError> {
        let (reply, response) = oneshot::channel();
        self.control_tx
            .send(ControlRequest { command, reply })
            .await
            .map_err(|_| ControlError::SessionGone)?;
        let result = response.await.map_err(|_| ControlError::SessionGone)?;
        Ok(result?)
    }

    /// Latest published status
    pub fn status(&self) -> SessionStatus {
        self.status_rx.borrow().clone()
    }
}

/// Owner of a [`TimerSession`] and its [`Connection`]
pub struct SessionDriver {
    session: TimerSession,
    connection: Connection,
    control_rx: mpsc::Receiver<ControlRequest>,
    status_tx: watch::Sender<SessionStatus>,
}

impl SessionDriver {
    pub fn new(session: TimerSession, connection: Connection) -> (Self, SessionHandle) {
        let (control_tx, control_rx) = mpsc::channel(16);
        let (status_tx, status_rx) = watch::channel(session.status());
        let driver = Self {
            session,
            connection,
            control_rx,
            status_tx,
        };
        (driver, SessionHandle { control_tx, status_rx })
    }

    /// Drive the session until `shutdown` resolves or the transport goes away.
    /// Returns the torn-down session.
    pub async fn run<F>(mut self, shutdown: F) -> TimerSession
    where
        F: Future<Output = ()>,
    {
        info!("Starting session driver for timer {}", self.session.timer_id());
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("Session shutdown requested");
                    break;
                }
                event = self.connection.recv() => match event {
                    Some(event) => self.handle_connection_event(event).await,
                    None => {
                        info!("Transport closed, ending session");
                        break;
                    }
                },
                Some(request) = self.control_rx.recv() => {
                    self.handle_request(request).await;
                }
                _ = self.session.ticker_mut().tick() => {
                    if self.session.on_tick() == TickOutcome::Ended {
                        info!("Countdown for {} reached zero", self.session.timer_id());
                    }
                }
            }
            self.publish();
        }

        if let Some(leave) = self.session.teardown() {
            self.send(&leave).await;
        }
        self.publish();
        self.session
    }

    async fn handle_connection_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Opened => {
                for command in self.session.on_open() {
                    self.send(&command).await;
                }
            }
            ConnectionEvent::Frame(frame) => match self.session.handle_frame(&frame) {
                Ok(kind) => debug!("Applied {} event", kind),
                Err(e) => debug!("Dropping frame {:?}: {}", frame, e),
            },
            ConnectionEvent::Closed => self.session.on_close(),
        }
    }

    async fn handle_request(&mut self, request: ControlRequest) {
        let ControlRequest { command, reply } = request;
        debug!("Local command: {:?}", command);

        let outcome = match command {
            LocalCommand::Create => self.session.create().map(Some),
            LocalCommand::Start => self.session.start().map(Some),
            LocalCommand::Pause => self.session.pause().map(Some),
            LocalCommand::Resume => self.session.resume().map(Some),
            LocalCommand::Leave => self.session.leave().map(Some),
            LocalCommand::Resync(snapshot) => {
                self.session.resync(&snapshot, now_millis()).map(|()| None)
            }
        };

        let result = match outcome {
            Ok(command) => {
                if let Some(command) = command {
                    self.send(&command).await;
                }
                Ok(self.session.status())
            }
            Err(e) => {
                info!("Local command had no effect: {}", e);
                Err(e)
            }
        };

        if reply.send(result).is_err() {
            debug!("Command issuer went away before the reply");
        }
    }

    async fn send(&self, command: &Command) {
        if let Err(e) = self.connection.send(command).await {
            warn!("Failed to send {}: {}", command, e);
        }
    }

    fn publish(&self) {
        self.status_tx.send_replace(self.session.status());
    }
}
