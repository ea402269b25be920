use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
    /// Growth factor between consecutive delays.
    #[serde(default = "default_multiplier")]
    pub backoff_multiplier: f64,
    /// Relative jitter applied to each delay (0.0 disables it).
    #[serde(default = "default_jitter")]
    pub jitter_factor: f64,
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_jitter() -> f64 {
    0.1
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.25,
            max_delay_secs: 5,
            backoff_multiplier: default_multiplier(),
            jitter_factor: default_jitter(),
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            multiplier: self.backoff_multiplier,
            max_delay: Duration::from_secs(self.max_delay_secs),
            jitter_factor: self.jitter_factor,
        }
    }
}

/// HTTP client settings (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    /// Hard limit for one transfer; protects against a completely stuck source.
    pub timeout_secs: u64,
    /// Bytes per second below which a transfer counts as stalled.
    pub low_speed_limit: u32,
    pub low_speed_time_secs: u64,
    pub max_redirections: u32,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 3600,
            low_speed_limit: 1024,
            low_speed_time_secs: 60,
            max_redirections: 10,
            user_agent: None,
        }
    }
}

/// Compression applied to archive members. `stored` needs no buffering and
/// almost no CPU, which suits streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Stored,
    Deflated,
}

impl From<Compression> for zip::CompressionMethod {
    fn from(c: Compression) -> Self {
        match c {
            Compression::Stored => zip::CompressionMethod::Stored,
            Compression::Deflated => zip::CompressionMethod::Deflated,
        }
    }
}

/// Global configuration loaded from `~/.config/zipstream/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZipstreamConfig {
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional HTTP client settings; if missing, built-in defaults are used.
    #[serde(default)]
    pub http: Option<HttpConfig>,
    #[serde(default)]
    pub compression: Compression,
}

impl ZipstreamConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    pub fn http(&self) -> HttpConfig {
        self.http.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("zipstream")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ZipstreamConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ZipstreamConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit path; the file must exist.
pub fn load_from_path(path: &Path) -> Result<ZipstreamConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: ZipstreamConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ZipstreamConfig::default();
        assert!(cfg.retry.is_none());
        assert!(cfg.http.is_none());
        assert_eq!(cfg.compression, Compression::Stored);
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(cfg.http().max_redirections, 10);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = ZipstreamConfig {
            retry: Some(RetryConfig::default()),
            http: Some(HttpConfig::default()),
            compression: Compression::Deflated,
        };
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ZipstreamConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.compression, Compression::Deflated);
        assert_eq!(parsed.retry.unwrap().max_attempts, 3);
        assert_eq!(parsed.http.unwrap().timeout_secs, 3600);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: ZipstreamConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.compression, Compression::Stored);
        assert!(cfg.retry.is_none());
    }

    #[test]
    fn config_toml_retry_and_http() {
        let toml = r#"
            compression = "deflated"

            [retry]
            max_attempts = 5
            base_delay_secs = 0.5
            max_delay_secs = 15

            [http]
            connect_timeout_secs = 5
            timeout_secs = 600
            low_speed_limit = 10
            low_speed_time_secs = 20
            max_redirections = 3
            user_agent = "zipstream-test"
        "#;
        let cfg: ZipstreamConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.compression, Compression::Deflated);
        let retry = cfg.retry.as_ref().unwrap();
        assert_eq!(retry.max_attempts, 5);
        assert!((retry.backoff_multiplier - 2.0).abs() < 1e-9, "multiplier defaulted");
        let policy = cfg.retry_policy();
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(15));
        let http = cfg.http();
        assert_eq!(http.max_redirections, 3);
        assert_eq!(http.user_agent.as_deref(), Some("zipstream-test"));
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let retry = RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        };
        assert_eq!(retry.to_policy().max_attempts, 1);
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "compression = \"stored\"\n[retry]\nmax_attempts = 2\nbase_delay_secs = 0.0\nmax_delay_secs = 0\n").unwrap();
        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.retry_policy().max_attempts, 2);
        assert!(load_from_path(&dir.path().join("missing.toml")).is_err());
    }
}
