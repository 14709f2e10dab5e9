//! Background tasks module
//! 
//! The countdown ticker and the driver loop that owns a timer session.

pub mod session_driver;
pub mod ticker;

// Re-export main types
pub use session_driver::{ControlError, LocalCommand, SessionDriver, SessionHandle};
pub use ticker::{Ticker, END_THRESHOLD_MS, TICK_PERIOD};
