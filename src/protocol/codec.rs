//! Colon-delimited wire format for timer commands and events
//!
//! Commands travel client -> server as `1:cmd:<area>:<action>:<id>`,
//! events arrive server -> client as `1:event:timer:<timerId>:<event>[:<args>...]`.

use std::fmt;

use thiserror::Error;

use crate::state::TimerId;
use crate::session::ClientId;

/// Protocol version carried in the first field of every frame
pub const PROTOCOL_VERSION: u32 = 1;

const SEPARATOR: char = ':';

/// Actions understood by the `timer` command area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Create,
    Join,
    Leave,
    Start,
    Pause,
    Resume,
}

impl TimerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerAction::Create => "create",
            TimerAction::Join => "join",
            TimerAction::Leave => "leave",
            TimerAction::Start => "start",
            TimerAction::Pause => "pause",
            TimerAction::Resume => "resume",
        }
    }
}

/// Outbound command frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `1:cmd:auth:setid:<clientId>`, always the first frame on a connection
    Auth(ClientId),
    /// `1:cmd:timer:<action>:<timerId>`
    Timer { action: TimerAction, timer_id: TimerId },
}

impl Command {
    pub fn timer(action: TimerAction, timer_id: &TimerId) -> Self {
        Command::Timer {
            action,
            timer_id: timer_id.clone(),
        }
    }

    /// Encode into the text frame sent over the connection
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Auth(client_id) => {
                write!(f, "{PROTOCOL_VERSION}:cmd:auth:setid:{client_id}")
            }
            Command::Timer { action, timer_id } => {
                write!(f, "{PROTOCOL_VERSION}:cmd:timer:{}:{timer_id}", action.as_str())
            }
        }
    }
}

/// Broadcast events a session reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Start,
    Resume,
    Pause,
    Join,
    Leave,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::Resume => "resume",
            EventKind::Pause => "pause",
            EventKind::Join => "join",
            EventKind::Leave => "leave",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "start" => Some(EventKind::Start),
            "resume" => Some(EventKind::Resume),
            "pause" => Some(EventKind::Pause),
            "join" => Some(EventKind::Join),
            "leave" => Some(EventKind::Leave),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successfully decoded event with any trailing arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    pub kind: EventKind,
    pub args: Vec<String>,
}

/// Reasons an inbound frame is dropped. None of these are fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unsupported protocol version token {0:?}")]
    VersionMismatch(String),
    #[error("frame not addressed to this timer: {0:?}")]
    Unaddressed(String),
    #[error("unknown event {0:?}")]
    UnknownEvent(String),
}

/// Decode an event frame for the session owning `timer_id`
pub fn decode(frame: &str, timer_id: &TimerId) -> Result<DecodedEvent, DecodeError> {
    let mut fields = frame.trim_end_matches(&['\r', '\n'][..]).split(SEPARATOR);

    let version = fields.next().unwrap_or_default();
    match version.trim().parse::<u32>() {
        Ok(PROTOCOL_VERSION) => {}
        _ => return Err(DecodeError::VersionMismatch(version.to_string())),
    }

    let kind = fields.next();
    let area = fields.next();
    let id = fields.next();
    let addressed = kind == Some("event")
        && area == Some("timer")
        && id == Some(timer_id.as_str());
    if !addressed {
        return Err(DecodeError::Unaddressed(frame.to_string()));
    }

    let name = fields.next().unwrap_or_default();
    let kind = EventKind::parse(name).ok_or_else(|| DecodeError::UnknownEvent(name.to_string()))?;

    Ok(DecodedEvent {
        kind,
        args: fields.map(str::to_string).collect(),
    })
}

/// Whether an encoded outbound frame is the auth command
pub fn is_handshake(frame: &str) -> bool {
    let mut fields = frame.split(SEPARATOR);
    fields.next().and_then(|v| v.parse::<u32>().ok()) == Some(PROTOCOL_VERSION)
        && fields.next() == Some("cmd")
        && fields.next() == Some("auth")
}

/// Encode an event frame as the server broadcasts it
pub fn encode_event(timer_id: &TimerId, kind: EventKind) -> String {
    format!("{PROTOCOL_VERSION}:event:timer:{timer_id}:{kind}")
}
