//! Participant identity and role module

pub mod identity;
pub mod role;

pub use identity::{load_or_create, ClientId, InvalidClientId};
pub use role::{Role, RoleSession};
