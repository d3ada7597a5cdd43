use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::pool::{HostSpec, DEFAULT_WORKER_PORT};
use crate::sync::DEFAULT_IMPORT_PAD_SECS;

/// Global configuration loaded from `~/.config/mdsync/config.toml`.
///
/// Host order is priority order: the first `[[hosts]]` entry is preferred
/// when the capacity pool hands out tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MdsyncConfig {
    /// Worker hosts in priority order.
    pub hosts: Vec<HostSpec>,
    /// Seconds of padding applied to each side of an imported gap.
    #[serde(default = "default_import_pad_secs")]
    pub import_pad_secs: i64,
    /// Timeout for worker API requests, in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_import_pad_secs() -> i64 {
    DEFAULT_IMPORT_PAD_SECS
}

fn default_http_timeout_secs() -> u64 {
    30
}

impl Default for MdsyncConfig {
    fn default() -> Self {
        Self {
            hosts: vec![HostSpec::new("127.0.0.1", DEFAULT_WORKER_PORT, 1)],
            import_pad_secs: default_import_pad_secs(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mdsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MdsyncConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MdsyncConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: MdsyncConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = MdsyncConfig::default();
        assert_eq!(cfg.hosts.len(), 1);
        assert_eq!(cfg.hosts[0].port, DEFAULT_WORKER_PORT);
        assert_eq!(cfg.import_pad_secs, 86_400);
        assert_eq!(cfg.http_timeout_secs, 30);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = MdsyncConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: MdsyncConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.hosts, cfg.hosts);
        assert_eq!(parsed.import_pad_secs, cfg.import_pad_secs);
        assert_eq!(parsed.http_timeout_secs, cfg.http_timeout_secs);
    }

    #[test]
    fn config_toml_hosts_keep_priority_order() {
        let toml = r#"
            [[hosts]]
            address = "worker-a"
            threads = 12

            [[hosts]]
            address = "worker-b"
            port = 3001
            threads = 4
        "#;
        let cfg: MdsyncConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.hosts.len(), 2);
        assert_eq!(cfg.hosts[0].address, "worker-a");
        assert_eq!(cfg.hosts[0].port, DEFAULT_WORKER_PORT);
        assert_eq!(cfg.hosts[0].threads, 12);
        assert_eq!(cfg.hosts[1].address, "worker-b");
        assert_eq!(cfg.hosts[1].port, 3001);
        // Optional sections fall back to defaults.
        assert_eq!(cfg.import_pad_secs, 86_400);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            import_pad_secs = 3600
            http_timeout_secs = 5

            [[hosts]]
            address = "10.0.0.5"
            threads = 2
        "#;
        let cfg: MdsyncConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.import_pad_secs, 3600);
        assert_eq!(cfg.http_timeout_secs, 5);
        assert_eq!(cfg.hosts[0].threads, 2);
    }
}
