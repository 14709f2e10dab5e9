//! State management module
//!
//! Authoritative snapshots, reconciliation of remaining time, and the
//! local timer session state machine.

pub mod app_state;
pub mod machine;
pub mod reconcile;
pub mod snapshot;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use machine::{CommandRejected, TickOutcome, TimerSession};
pub use reconcile::{reconcile, Reconciliation};
pub use snapshot::{InvalidTimerId, TimerId, TimerSnapshot};
pub use timer_state::{Phase, SessionState, SessionStatus};
