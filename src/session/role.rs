//! Participant identity and authority for one timer

use serde::{Deserialize, Serialize};

use super::ClientId;
use crate::{protocol::Command, state::TimerId};

/// Authority a participant holds over a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Creates, starts, pauses and resumes the timer
    Owner,
    /// Observes the timer without controlling it
    Client,
}

impl Role {
    pub fn from_owner_flag(is_owner: bool) -> Self {
        if is_owner {
            Role::Owner
        } else {
            Role::Client
        }
    }
}

/// Who this participant is and what it may do on `timer_id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSession {
    client_id: ClientId,
    timer_id: TimerId,
    role: Role,
}

impl RoleSession {
    pub fn new(client_id: ClientId, timer_id: TimerId, role: Role) -> Self {
        Self {
            client_id,
            timer_id,
            role,
        }
    }

    pub fn timer_id(&self) -> &TimerId {
        &self.timer_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }

    /// Auth command that must precede every timer command on a fresh connection
    pub fn handshake(&self) -> Command {
        Command::Auth(self.client_id.clone())
    }
}
