use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Highest accepted concurrency (segments per download).
pub const MAX_SEGMENTS: usize = 8;

/// Global configuration loaded from `~/.config/splitget/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitgetConfig {
    /// Concurrency used when the command line does not give one.
    pub segments: usize,
    /// Seconds allowed for the TCP/TLS connect phase.
    pub connect_timeout_secs: u64,
    /// A transfer slower than this (bytes/s) for `low_speed_time_secs` is aborted.
    pub low_speed_limit_bytes: u32,
    pub low_speed_time_secs: u64,
    /// Hard limit for a single request, body included.
    pub timeout_secs: u64,
    pub max_redirections: u32,
    /// libcurl receive buffer size in bytes (None = libcurl default).
    pub buffer_size: Option<usize>,
    /// Overrides the default `splitget/<version>` user agent.
    pub user_agent: Option<String>,
    /// How often the coordinator publishes progress while workers run.
    pub poll_interval_ms: u64,
    /// Where session directories are created (None = next to the destination).
    pub temp_dir: Option<PathBuf>,
}

impl Default for SplitgetConfig {
    fn default() -> Self {
        Self {
            segments: 4,
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            timeout_secs: 3600,
            max_redirections: 10,
            buffer_size: None,
            user_agent: None,
            poll_interval_ms: 100,
            temp_dir: None,
        }
    }
}

impl SplitgetConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.segments == 0 || self.segments > MAX_SEGMENTS {
            bail!(
                "segments = {} is out of range (1..={})",
                self.segments,
                MAX_SEGMENTS
            );
        }
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than 0");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("splitget")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SplitgetConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SplitgetConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SplitgetConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
