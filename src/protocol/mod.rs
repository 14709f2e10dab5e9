//! Wire protocol module
//!
//! Encoding of outbound commands and decoding of inbound timer events.

pub mod codec;

pub use codec::{decode, encode_event, is_handshake, Command, DecodeError, DecodedEvent, EventKind, TimerAction};
