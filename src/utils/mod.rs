//! Utility functions module
//! 
//! This module contains utility functions used throughout the application.

pub mod clock;
pub mod format;
pub mod signals;

// Re-export main functions
pub use clock::now_millis;
pub use format::format_remaining;
pub use signals::shutdown_signal;
