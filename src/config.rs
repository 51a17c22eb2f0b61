//! # Configuration
//! Tracker settings with TOML/JSON file loading and env overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

pub const ENV_CONFIG_PATH: &str = "TREND_TRACKER_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/trend_tracker.toml";

fn default_window_length_secs() -> u64 {
    6
}
fn default_emit_frequency_secs() -> u64 {
    2
}
fn default_report_frequency_secs() -> u64 {
    3
}
fn default_report_top() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Total span covered by the sliding window, in seconds.
    #[serde(default = "default_window_length_secs")]
    pub window_length_secs: u64,
    /// Interval between window emissions (one advance each), in seconds.
    #[serde(default = "default_emit_frequency_secs")]
    pub emit_frequency_secs: u64,
    /// Interval between ranking reports, in seconds.
    #[serde(default = "default_report_frequency_secs")]
    pub report_frequency_secs: u64,
    /// How many leading entries of the ranking each report logs.
    #[serde(default = "default_report_top")]
    pub report_top: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            window_length_secs: default_window_length_secs(),
            emit_frequency_secs: default_emit_frequency_secs(),
            report_frequency_secs: default_report_frequency_secs(),
            report_top: default_report_top(),
        }
    }
}

impl TrackerConfig {
    pub fn window_length(&self) -> Duration {
        Duration::from_secs(self.window_length_secs)
    }

    pub fn emit_frequency(&self) -> Duration {
        Duration::from_secs(self.emit_frequency_secs)
    }

    pub fn report_frequency(&self) -> Duration {
        Duration::from_secs(self.report_frequency_secs)
    }

    /// Derived bucket count, truncating division. Remainder seconds are
    /// dropped from the effective window span.
    pub fn num_slots(&self) -> u64 {
        self.window_length_secs / self.emit_frequency_secs
    }

    /// A window needs at least two buckets; the derived count below two must
    /// stop startup rather than silently fall back to a different size.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.emit_frequency_secs > 0,
            "emit_frequency_secs must be positive"
        );
        ensure!(
            self.report_frequency_secs > 0,
            "report_frequency_secs must be positive"
        );
        let slots = self.num_slots();
        ensure!(
            slots >= 2,
            "window must cover at least two emit intervals (got {slots} from {}s / {}s)",
            self.window_length_secs,
            self.emit_frequency_secs
        );
        Ok(())
    }

    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, ext.as_str())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load using env var + fallbacks:
    /// 1) $TREND_TRACKER_CONFIG_PATH
    /// 2) config/trend_tracker.toml
    /// 3) built-in defaults
    ///
    /// Individual fields can then be overridden via TREND_WINDOW_LENGTH_SECS,
    /// TREND_EMIT_FREQUENCY_SECS, TREND_REPORT_FREQUENCY_SECS and
    /// TREND_REPORT_TOP.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            ensure!(
                pb.exists(),
                "{ENV_CONFIG_PATH} points to non-existent path"
            );
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                Self::default()
            }
        };

        if let Some(v) = env_u64("TREND_WINDOW_LENGTH_SECS") {
            cfg.window_length_secs = v;
        }
        if let Some(v) = env_u64("TREND_EMIT_FREQUENCY_SECS") {
            cfg.emit_frequency_secs = v;
        }
        if let Some(v) = env_u64("TREND_REPORT_FREQUENCY_SECS") {
            cfg.report_frequency_secs = v;
        }
        if let Some(v) = env_u64("TREND_REPORT_TOP") {
            cfg.report_top = v as usize;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

fn env_u64(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<TrackerConfig> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains('=');
    if try_toml {
        if let Ok(cfg) = toml::from_str(s) {
            return Ok(cfg);
        }
    }
    if let Ok(cfg) = serde_json::from_str(s) {
        return Ok(cfg);
    }
    if !try_toml {
        if let Ok(cfg) = toml::from_str(s) {
            return Ok(cfg);
        }
    }
    anyhow::bail!("unsupported config format")
}
