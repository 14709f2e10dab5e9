//! Shared state of the local control API

use std::time::Instant;

use crate::{
    session::{ClientId, Role},
    tasks::SessionHandle,
};

/// State handed to every HTTP handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handle to the single session driver
    pub session: SessionHandle,
    pub client_id: ClientId,
    pub role: Role,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
}

impl AppState {
    pub fn new(session: SessionHandle, client_id: ClientId, role: Role, port: u16, host: String) -> Self {
        Self {
            session,
            client_id,
            role,
            start_time: Instant::now(),
            port,
            host,
        }
    }

    /// Calculate uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
