//! Share Timer - a participant in a shared, live-synchronized countdown
//! 
//! This library implements the timer synchronization protocol: the wire
//! codec, the per-connection role handshake, reconciliation of remaining
//! time from server timestamps, the local countdown ticker and the timer
//! session state machine, plus the plumbing to run one session as a daemon.

pub mod api;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod session;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use connection::{Connection, ConnectionEvent};
pub use protocol::{Command, DecodeError, EventKind};
pub use session::{ClientId, Role, RoleSession};
pub use state::{AppState, Phase, TimerSession, TimerSnapshot};
pub use tasks::{LocalCommand, SessionDriver, SessionHandle};
pub use utils::signals::shutdown_signal;
