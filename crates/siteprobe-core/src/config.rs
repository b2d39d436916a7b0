//! siteprobe.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
pub const DEFAULT_SITES_FILE: &str = "config/probe/sites.json";
pub const DEFAULT_PROBE_TIMEOUT: &str = "10s";
pub const DEFAULT_USER_AGENT: &str = "siteprobe/0.1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExporterConfig {
    /// Address the API and metrics server binds to.
    pub listen: String,
    /// JSON file holding the persisted target list.
    pub sites_file: PathBuf,
    /// Upper bound for a single probe, e.g. "10s" or "500ms".
    pub probe_timeout: String,
    /// User-Agent header sent with every probe.
    pub user_agent: String,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            sites_file: PathBuf::from(DEFAULT_SITES_FILE),
            probe_timeout: DEFAULT_PROBE_TIMEOUT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ExporterConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ExporterConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid listen address {:?}: {e}", self.listen))
    }

    pub fn probe_timeout(&self) -> anyhow::Result<Duration> {
        parse_duration(&self.probe_timeout)
            .ok_or_else(|| anyhow::anyhow!("invalid probe_timeout {:?}", self.probe_timeout))
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
///
/// A bare number is read as seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
