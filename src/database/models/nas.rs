use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Connectivity state persisted on a NAS row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NasStatus {
    Online,
    Offline,
    Pending,
}

impl NasStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NasStatus::Online => "ONLINE",
            NasStatus::Offline => "OFFLINE",
            NasStatus::Pending => "PENDING",
        }
    }
}

impl fmt::Display for NasStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NasStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ONLINE" => Ok(NasStatus::Online),
            "OFFLINE" => Ok(NasStatus::Offline),
            "PENDING" => Ok(NasStatus::Pending),
            other => Err(format!("unknown NAS status '{}'", other)),
        }
    }
}

/// Router acting as RADIUS client, reachable over the VPN mesh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nas {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub vpn_ip: Option<String>,
    pub vpn_public_key: Option<String>,
    pub status: NasStatus,
    pub last_seen: Option<DateTime<Utc>>,
    pub uptime: Option<String>,
}
