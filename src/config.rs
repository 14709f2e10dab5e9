//! Configuration and CLI argument handling

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{info, warn};

use crate::{
    session::{identity, ClientId},
    state::{TimerId, TimerSnapshot},
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "share-timer")]
#[command(about = "Join a shared countdown as its owner or as a live observer")]
#[command(version)]
pub struct Config {
    /// WebSocket endpoint of the timer server
    #[arg(long, default_value = "ws://localhost:8080/ws")]
    pub server: String,

    /// JSON snapshot of the timer as returned by the lookup service
    #[arg(long, conflicts_with_all = ["timer_id", "duration"])]
    pub snapshot: Option<PathBuf>,

    /// Timer to attach to when no snapshot file is given
    #[arg(long, requires = "duration")]
    pub timer_id: Option<TimerId>,

    /// Timer length in milliseconds when no snapshot file is given
    #[arg(long)]
    pub duration: Option<u64>,

    /// Attach as the timer owner when no snapshot file is given
    #[arg(long)]
    pub owner: bool,

    /// Explicit client identity, bypasses the identity file
    #[arg(long, conflicts_with = "guest")]
    pub client_id: Option<ClientId>,

    /// Use a throw-away identity for this run
    #[arg(long)]
    pub guest: bool,

    /// Where the persistent client identity is stored
    #[arg(long)]
    pub identity_file: Option<PathBuf>,

    /// Port of the local control API
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address of the local control API
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the control API address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Resolve the authoritative snapshot to start from
    pub fn snapshot(&self) -> anyhow::Result<TimerSnapshot> {
        if let Some(path) = &self.snapshot {
            return TimerSnapshot::load(path);
        }

        match (&self.timer_id, self.duration) {
            (Some(timer_id), Some(duration)) => {
                Ok(TimerSnapshot::fresh(timer_id.clone(), duration, self.owner))
            }
            _ => bail!("either --snapshot or --timer-id with --duration is required"),
        }
    }

    /// Resolve the client identity: explicit, guest, or persisted
    pub fn client_id(&self) -> anyhow::Result<ClientId> {
        if let Some(id) = &self.client_id {
            return Ok(id.clone());
        }
        if self.guest {
            info!("Guest mode, using an ephemeral identity");
            return Ok(ClientId::generate());
        }

        let path = match &self.identity_file {
            Some(path) => path.clone(),
            None => match identity::default_identity_path() {
                Some(path) => path,
                None => {
                    warn!("No config directory available, identity will not persist");
                    return Ok(ClientId::generate());
                }
            },
        };
        identity::load_or_create(&path).context("Failed to resolve client identity")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::try_parse_from(std::iter::once("share-timer").chain(args.iter().copied()))
    }

    #[test]
    fn builds_fresh_snapshot_from_flags() {
        let config = parse(&["--timer-id", "abc123", "--duration", "60000", "--owner"]).unwrap();
        let snapshot = config.snapshot().unwrap();
        assert_eq!(snapshot.timer_id.as_str(), "ABC123");
        assert_eq!(snapshot.duration, 60_000);
        assert!(snapshot.is_owner);
        assert!(!snapshot.is_started());
        assert_eq!(config.address(), "127.0.0.1:20554");
    }

    #[test]
    fn requires_some_snapshot_source() {
        let config = parse(&[]).unwrap();
        assert!(config.snapshot().is_err());
        assert!(parse(&["--timer-id", "ABC123"]).is_err());
        assert!(parse(&["--timer-id", "nope", "--duration", "1"]).is_err());
    }

    #[test]
    fn loads_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timer.json");
        std::fs::write(
            &path,
            r#"{"timerId":"QWERTY","isOwner":false,"duration":5000,"isRunning":true,
                "startTime":1,"lastPause":0,"timeInPause":0}"#,
        )
        .unwrap();

        let config = parse(&["--snapshot", path.to_str().unwrap()]).unwrap();
        let snapshot = config.snapshot().unwrap();
        assert_eq!(snapshot.timer_id.as_str(), "QWERTY");
        assert!(snapshot.is_running);
    }

    #[test]
    fn identity_resolution_order() {
        let explicit = parse(&["--client-id", "fixed1"]).unwrap();
        assert_eq!(explicit.client_id().unwrap().as_str(), "fixed1");
        assert!(parse(&["--client-id", "fixed1", "--guest"]).is_err());

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("id");
        let args = ["--identity-file", file.to_str().unwrap()];
        let first = parse(&args).unwrap().client_id().unwrap();
        let second = parse(&args).unwrap().client_id().unwrap();
        assert_eq!(first, second);

        let mut guest_args = args.to_vec();
        guest_args.push("--guest");
        let guest = parse(&guest_args).unwrap().client_id().unwrap();
        assert_ne!(guest, first);
    }
}
