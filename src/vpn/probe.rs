//! Peer telemetry probes.
//!
//! The concrete probe shells out to `wg show <interface> dump`. Its output is
//! one interface line followed by one tab-separated line per peer:
//!
//! ```text
//! public-key  preshared-key  endpoint  allowed-ips  latest-handshake  rx  tx  keepalive
//! ```
//!
//! `endpoint` is `(none)` for peers that never connected, `allowed-ips` is a
//! comma-joined CIDR list and a handshake of `0` means "never".

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use ipnetwork::IpNetwork;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

use crate::config::MonitorConfig;

const MIN_PEER_FIELDS: usize = 7;
const NONE_MARKER: &str = "(none)";

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("VPN status tool '{0}' is not installed")]
    ToolUnavailable(String),

    #[error("VPN status tool exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("Probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unparsable probe output at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Probe I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One peer as reported by a single probe run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerSample {
    pub public_key: String,
    pub endpoint: Option<String>,
    pub allowed_ips: Vec<IpNetwork>,
    pub last_handshake: Option<DateTime<Utc>>,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    pub is_connected: bool,
}

impl PeerSample {
    /// Recompute `is_connected` against the handshake timeout
    pub fn refresh_liveness(&mut self, now: DateTime<Utc>, handshake_timeout: Duration) {
        self.is_connected = is_connected(self.last_handshake, now, handshake_timeout);
    }
}

/// Connected iff a handshake happened strictly less than `timeout` ago
pub fn is_connected(
    last_handshake: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    timeout: Duration,
) -> bool {
    match last_handshake {
        None => false,
        Some(at) => match (now - at).to_std() {
            Ok(elapsed) => elapsed < timeout,
            // Handshake stamped ahead of our clock
            Err(_) => true,
        },
    }
}

#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn probe(&self) -> Result<Vec<PeerSample>, ProbeError>;
}

/// Run a probe with a hard deadline; a hung tool counts as a probe failure
pub async fn probe_with_timeout(
    probe: &dyn ConnectivityProbe,
    timeout: Duration,
) -> Result<Vec<PeerSample>, ProbeError> {
    match tokio::time::timeout(timeout, probe.probe()).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::Timeout(timeout)),
    }
}

/// Parse `wg show <interface> dump` output
pub fn parse_dump(output: &str) -> Result<Vec<PeerSample>, ProbeError> {
    let mut samples = Vec::new();

    // First line describes the interface itself
    for (index, line) in output.lines().enumerate().skip(1) {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < MIN_PEER_FIELDS {
            tracing::debug!("Skipping probe line {}: {} fields", line_no, fields.len());
            continue;
        }

        let parse_error = |message: String| ProbeError::Parse {
            line: line_no,
            message,
        };

        let endpoint = match fields[2] {
            NONE_MARKER | "" => None,
            other => Some(other.to_string()),
        };

        let allowed_ips = parse_allowed_ips(fields[3], line_no);

        let handshake_secs: i64 = fields[4]
            .parse()
            .map_err(|_| parse_error(format!("invalid handshake '{}'", fields[4])))?;
        let last_handshake = if handshake_secs == 0 {
            None
        } else {
            let at = Utc
                .timestamp_opt(handshake_secs, 0)
                .single()
                .ok_or_else(|| parse_error(format!("handshake out of range '{}'", fields[4])))?;
            Some(at)
        };

        let rx_bytes: u64 = fields[5]
            .parse()
            .map_err(|_| parse_error(format!("invalid rx bytes '{}'", fields[5])))?;
        let tx_bytes: u64 = fields[6]
            .parse()
            .map_err(|_| parse_error(format!("invalid tx bytes '{}'", fields[6])))?;

        samples.push(PeerSample {
            public_key: fields[0].to_string(),
            endpoint,
            allowed_ips,
            last_handshake,
            rx_bytes,
            tx_bytes,
            is_connected: false,
        });
    }

    Ok(samples)
}

fn parse_allowed_ips(field: &str, line_no: usize) -> Vec<IpNetwork> {
    if field == NONE_MARKER {
        return Vec::new();
    }

    field
        .split(',')
        .map(str::trim)
        .filter(|cidr| !cidr.is_empty())
        .filter_map(|cidr| match cidr.parse::<IpNetwork>() {
            Ok(net) => Some(net),
            Err(e) => {
                tracing::warn!("Ignoring allowed IP '{}' on probe line {}: {}", cidr, line_no, e);
                None
            }
        })
        .collect()
}

/// Live probe backed by the `wg` command line tool
pub struct WgProbe {
    binary: String,
    interface: String,
}

impl WgProbe {
    pub fn new(binary: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            interface: interface.into(),
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(&config.wg_binary, &config.interface)
    }
}

#[async_trait]
impl ConnectivityProbe for WgProbe {
    async fn probe(&self) -> Result<Vec<PeerSample>, ProbeError> {
        // kill_on_drop reaps the child when a timeout drops this future
        let output = Command::new(&self.binary)
            .arg("show")
            .arg(&self.interface)
            .arg("dump")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ProbeError::ToolUnavailable(self.binary.clone()),
                _ => ProbeError::Io(e),
            })?;

        if !output.status.success() {
            return Err(ProbeError::CommandFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| ProbeError::Parse {
            line: 0,
            message: "output is not valid UTF-8".to_string(),
        })?;

        parse_dump(&stdout)
    }
}

/// Reads a dump captured by another process (e.g. a sidecar owning the interface)
pub struct DumpFileProbe {
    path: PathBuf,
}

impl DumpFileProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ConnectivityProbe for DumpFileProbe {
    async fn probe(&self) -> Result<Vec<PeerSample>, ProbeError> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        parse_dump(&contents)
    }
}
