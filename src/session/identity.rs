//! Persistent participant identity

use std::{
    fmt,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use rand::{distributions::Alphanumeric, Rng};
use thiserror::Error;
use tracing::{debug, info};

/// Length of generated identifiers
pub const CLIENT_ID_LEN: usize = 21;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid client id {0:?}: must be non-empty and free of ':' and whitespace")]
pub struct InvalidClientId(pub String);

/// Identifier the server uses to associate commands with a participant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(CLIENT_ID_LEN)
            .map(char::from)
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ClientId {
    type Err = InvalidClientId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.contains(':') || trimmed.contains(char::is_whitespace) {
            return Err(InvalidClientId(s.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Default location of the identity file under the user config directory
pub fn default_identity_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("share-timer").join("client-id"))
}

/// Read the identity stored at `path`, creating and persisting one if absent
pub fn load_or_create(path: &Path) -> anyhow::Result<ClientId> {
    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read identity file {}", path.display()))?;
        let id = raw
            .parse()
            .with_context(|| format!("Corrupt identity file {}", path.display()))?;
        debug!("Loaded client identity from {}", path.display());
        return Ok(id);
    }

    let id = ClientId::generate();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, id.as_str())
        .with_context(|| format!("Failed to write identity file {}", path.display()))?;
    info!("Created new client identity at {}", path.display());
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_alphanumeric() {
        let a = ClientId::generate();
        let b = ClientId::generate();
        assert_eq!(a.as_str().len(), CLIENT_ID_LEN);
        assert!(a.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_ids_that_break_framing() {
        assert!("".parse::<ClientId>().is_err());
        assert!("a:b".parse::<ClientId>().is_err());
        assert!("a b".parse::<ClientId>().is_err());
        assert_eq!("  abc\n".parse::<ClientId>().unwrap().as_str(), "abc");
    }

    #[test]
    fn identity_is_created_once_then_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("client-id");

        let first = load_or_create(&path).unwrap();
        let second = load_or_create(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&path).unwrap(), first.as_str());
    }

    #[test]
    fn corrupt_identity_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client-id");
        fs::write(&path, "   ").unwrap();
        assert!(load_or_create(&path).is_err());
    }
}
