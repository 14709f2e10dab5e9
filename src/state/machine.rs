//! Timer session state machine
//!
//! Owns the local phase of one timer on one connection, applies remote
//! events and local commands, and drives the countdown ticker. Owners and
//! clients react to disjoint parts of the event stream: owners only count
//! joins and leaves, clients only follow start/pause/resume.

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use super::{reconcile, Phase, SessionState, SessionStatus, TimerId, TimerSnapshot};
use crate::{
    protocol::{self, Command, DecodeError, EventKind, TimerAction},
    session::{ClientId, Role, RoleSession},
    tasks::Ticker,
};

/// Why a local command had no effect
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandRejected {
    #[error("only the timer owner can do that")]
    NotOwner,
    #[error("only clients can leave a timer")]
    NotClient,
    #[error("connection is not open")]
    Disconnected,
    #[error("timer has ended")]
    Ended,
    #[error("timer has already been started")]
    AlreadyStarted,
    #[error("timer is already paused")]
    AlreadyPaused,
    #[error("timer is not paused")]
    NotPaused,
    #[error("snapshot belongs to timer {0}")]
    ForeignSnapshot(TimerId),
}

/// Result of one ticker period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing changed
    Idle,
    /// Countdown advanced to the contained remaining time
    Advanced(u64),
    /// Countdown reached zero and the session ended
    Ended,
}

/// Local state machine for one participant on one timer
#[derive(Debug)]
pub struct TimerSession {
    role: RoleSession,
    duration: u64,
    state: SessionState,
    connected: bool,
    ticker: Ticker,
}

impl TimerSession {
    /// Build a session from an authoritative snapshot reconciled at epoch ms `now`
    pub fn new(client_id: ClientId, snapshot: &TimerSnapshot, now: i64) -> Self {
        let role = RoleSession::new(
            client_id,
            snapshot.timer_id.clone(),
            Role::from_owner_flag(snapshot.is_owner),
        );
        let mut session = Self {
            role,
            duration: snapshot.duration,
            state: SessionState::new(Phase::Created, snapshot.duration),
            connected: false,
            ticker: Ticker::default(),
        };
        session.load(snapshot, now);
        session
    }

    fn load(&mut self, snapshot: &TimerSnapshot, now: i64) {
        let reconciled = reconcile(snapshot, now);
        self.duration = snapshot.duration;
        self.state.phase = reconciled.phase();
        self.state.time_left = reconciled.time_left;

        self.ticker.stop();
        if self.state.is_running() {
            self.ticker.start();
        }

        info!(
            "Timer {} loaded as {:?} ({:?}) with {}ms left",
            self.role.timer_id(),
            self.role.role(),
            self.state.phase,
            self.state.time_left
        );
    }

    /// Re-initialize from a freshly fetched snapshot, e.g. after a reconnect
    pub fn resync(&mut self, snapshot: &TimerSnapshot, now: i64) -> Result<(), CommandRejected> {
        if &snapshot.timer_id != self.role.timer_id() {
            return Err(CommandRejected::ForeignSnapshot(snapshot.timer_id.clone()));
        }
        if Role::from_owner_flag(snapshot.is_owner) != self.role.role() {
            warn!(
                "Snapshot for {} reports a different role, keeping {:?}",
                snapshot.timer_id,
                self.role.role()
            );
        }
        self.load(snapshot, now);
        Ok(())
    }

    pub fn timer_id(&self) -> &TimerId {
        self.role.timer_id()
    }

    pub fn role(&self) -> &RoleSession {
        &self.role
    }

    pub fn is_owner(&self) -> bool {
        self.role.is_owner()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn time_left(&self) -> u64 {
        self.state.time_left
    }

    pub fn client_count(&self) -> u32 {
        self.state.client_count
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn ticker_mut(&mut self) -> &mut Ticker {
        &mut self.ticker
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus::new(
            self.role.timer_id().clone(),
            self.is_owner(),
            self.connected,
            self.duration,
            &self.state,
        )
    }

    /// Connection opened: authenticate, then announce presence exactly once
    pub fn on_open(&mut self) -> Vec<Command> {
        self.connected = true;

        let announce = if self.is_owner() {
            TimerAction::Create
        } else {
            TimerAction::Join
        };
        info!("Connection open, announcing {} on {}", announce.as_str(), self.timer_id());
        vec![
            self.role.handshake(),
            Command::timer(announce, self.role.timer_id()),
        ]
    }

    /// Connection lost. The local countdown keeps ticking.
    pub fn on_close(&mut self) {
        if self.connected {
            info!("Connection to server closed");
        }
        self.connected = false;
    }

    /// Decode an inbound frame and apply it when it is addressed to us
    pub fn handle_frame(&mut self, frame: &str) -> Result<EventKind, DecodeError> {
        let event = protocol::decode(frame, self.role.timer_id())?;
        self.apply_event(event.kind);
        Ok(event.kind)
    }

    /// Apply a remote event. Returns whether local state changed.
    pub fn apply_event(&mut self, kind: EventKind) -> bool {
        match self.role.role() {
            Role::Owner => self.apply_owner_event(kind),
            Role::Client => self.apply_client_event(kind),
        }
    }

    fn apply_owner_event(&mut self, kind: EventKind) -> bool {
        match kind {
            EventKind::Join => {
                self.state.client_count = self.state.client_count.saturating_add(1);
                debug!("Client joined, {} connected", self.state.client_count);
                true
            }
            EventKind::Leave => {
                let before = self.state.client_count;
                self.state.client_count = before.saturating_sub(1);
                debug!("Client left, {} connected", self.state.client_count);
                before != self.state.client_count
            }
            EventKind::Start | EventKind::Resume | EventKind::Pause => {
                trace!("Owner ignores remote {} event", kind);
                false
            }
        }
    }

    fn apply_client_event(&mut self, kind: EventKind) -> bool {
        match kind {
            EventKind::Join | EventKind::Leave => {
                trace!("Client ignores remote {} event", kind);
                false
            }
            EventKind::Start | EventKind::Resume | EventKind::Pause if self.state.is_ended() => {
                debug!("Timer ended, ignoring remote {} event", kind);
                false
            }
            EventKind::Start | EventKind::Resume => self.enter_running(),
            EventKind::Pause => self.enter_paused(),
        }
    }

    fn enter_running(&mut self) -> bool {
        let changed = self.state.phase != Phase::Running;
        if changed {
            info!("Timer {} running with {}ms left", self.timer_id(), self.state.time_left);
            self.state.phase = Phase::Running;
        }
        self.ticker.start();
        changed
    }

    /// A timer that was never started has nothing to freeze and stays Created
    fn enter_paused(&mut self) -> bool {
        self.ticker.stop();
        if matches!(self.state.phase, Phase::Created | Phase::Paused) {
            return false;
        }
        info!("Timer {} paused with {}ms left", self.timer_id(), self.state.time_left);
        self.state.phase = Phase::Paused;
        true
    }

    fn ensure_controllable(&self) -> Result<(), CommandRejected> {
        if !self.is_owner() {
            return Err(CommandRejected::NotOwner);
        }
        if !self.connected {
            return Err(CommandRejected::Disconnected);
        }
        if self.state.is_ended() {
            return Err(CommandRejected::Ended);
        }
        Ok(())
    }

    /// Register the timer with the server. The phase stays Created.
    pub fn create(&mut self) -> Result<Command, CommandRejected> {
        self.ensure_controllable()?;
        if self.state.phase != Phase::Created {
            return Err(CommandRejected::AlreadyStarted);
        }
        Ok(Command::timer(TimerAction::Create, self.timer_id()))
    }

    pub fn start(&mut self) -> Result<Command, CommandRejected> {
        self.ensure_controllable()?;
        self.enter_running();
        Ok(Command::timer(TimerAction::Start, self.timer_id()))
    }

    /// Pause the countdown. From Created the command is still sent but the
    /// phase does not move.
    pub fn pause(&mut self) -> Result<Command, CommandRejected> {
        self.ensure_controllable()?;
        if self.state.phase == Phase::Paused {
            return Err(CommandRejected::AlreadyPaused);
        }
        self.enter_paused();
        Ok(Command::timer(TimerAction::Pause, self.timer_id()))
    }

    pub fn resume(&mut self) -> Result<Command, CommandRejected> {
        self.ensure_controllable()?;
        if self.state.phase != Phase::Paused {
            return Err(CommandRejected::NotPaused);
        }
        self.enter_running();
        Ok(Command::timer(TimerAction::Resume, self.timer_id()))
    }

    /// Best-effort leave for clients; the server's close detection is authoritative
    pub fn leave(&mut self) -> Result<Command, CommandRejected> {
        if self.is_owner() {
            return Err(CommandRejected::NotClient);
        }
        if !self.connected {
            return Err(CommandRejected::Disconnected);
        }
        Ok(Command::timer(TimerAction::Leave, self.timer_id()))
    }

    /// Advance the countdown by one ticker period
    pub fn on_tick(&mut self) -> TickOutcome {
        if !self.state.is_running() {
            self.ticker.stop();
            return TickOutcome::Idle;
        }

        match self.ticker.step(self.state.time_left) {
            Some(time_left) => {
                self.state.time_left = time_left;
                TickOutcome::Advanced(time_left)
            }
            None => {
                self.state.time_left = 0;
                self.state.phase = Phase::Ended;
                self.ticker.stop();
                info!("Timer {} ended", self.timer_id());
                TickOutcome::Ended
            }
        }
    }

    /// Stop all local activity. Returns a leave command for a connected client.
    pub fn teardown(&mut self) -> Option<Command> {
        self.ticker.stop();
        let leave = self.leave().ok();
        self.connected = false;
        debug!("Session for {} torn down", self.timer_id());
        leave
    }
}
