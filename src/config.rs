/// User preferences stored as JSON next to the other per-user config files.
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::report::{OrphanPolicy, ReportOptions, WeekStart};
use crate::storage;

pub const DB_ENV: &str = "BILLABLE_DB";
pub const LOG_ENV: &str = "BILLABLE_LOG";
const TICK_MILLIS: RangeInclusive<u64> = 50..=5000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub week_start: WeekStart,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub orphan_policy: OrphanPolicy,
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            week_start: WeekStart::default(),
            currency: default_currency(),
            orphan_policy: OrphanPolicy::default(),
            tick_millis: default_tick_millis(),
            log_level: None,
        }
    }
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_tick_millis() -> u64 {
    250
}

impl Config {
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            week_start: self.week_start,
            orphan_policy: self.orphan_policy,
        }
    }

    /// Applies `billable config set <key> <value>`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "week_start" => {
                self.week_start = match value.to_lowercase().as_str() {
                    "monday" => WeekStart::Monday,
                    "sunday" => WeekStart::Sunday,
                    _ => bail!("week_start must be 'monday' or 'sunday'"),
                }
            }
            "currency" => {
                if value.is_empty() {
                    bail!("currency must not be empty");
                }
                self.currency = value.to_string();
            }
            "orphan_policy" => {
                self.orphan_policy = match value.to_lowercase().as_str() {
                    "zero-rate" => OrphanPolicy::ZeroRate,
                    "exclude" => OrphanPolicy::Exclude,
                    _ => bail!("orphan_policy must be 'zero-rate' or 'exclude'"),
                }
            }
            "tick_millis" => {
                let millis: u64 = value
                    .parse()
                    .with_context(|| format!("'{value}' is not a number of milliseconds"))?;
                if !TICK_MILLIS.contains(&millis) {
                    bail!("tick_millis must be between 50 and 5000");
                }
                self.tick_millis = millis;
            }
            "log_level" => {
                self.log_level = if value.is_empty() || value == "default" {
                    None
                } else {
                    Some(value.to_lowercase())
                };
            }
            _ => bail!(
                "unknown config key '{key}' (expected week_start, currency, orphan_policy, tick_millis or log_level)"
            ),
        }
        Ok(())
    }
}

pub fn config_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("billable");
    path.push("config.json");
    Some(path)
}

/// A missing file yields defaults. A broken one is an error for the caller to report.
pub fn read_config() -> Result<Config> {
    match config_path() {
        Some(path) => read_config_from(&path),
        None => Ok(Config::default()),
    }
}

pub fn read_config_from(path: &Path) -> Result<Config> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Config::default()),
        Err(err) => {
            return Err(err).with_context(|| format!("cannot read {}", path.display()));
        }
    };
    let mut config: Config = serde_json::from_str(&contents)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    // Same bounds `set` enforces.
    config.tick_millis = config
        .tick_millis
        .clamp(*TICK_MILLIS.start(), *TICK_MILLIS.end());
    Ok(config)
}

pub fn write_config(config: &Config) -> Result<PathBuf> {
    let path = config_path().context("no config directory on this system")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(&path, json)?;
    Ok(path)
}

/// `--db` wins over `BILLABLE_DB`, which wins over the data directory default.
pub fn resolve_db_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| {
        env::var(DB_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
    })
    .unwrap_or_else(storage::default_db_path)
}
