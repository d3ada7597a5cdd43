//! Worker host description.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Port a worker listens on when the config does not say otherwise.
pub const DEFAULT_WORKER_PORT: u16 = 3000;

/// One worker host. Hosts are supplied in priority order (index 0 highest);
/// the spec is immutable for the lifetime of the pool built from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostSpec {
    /// Hostname or IP address.
    pub address: String,
    /// API port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Number of jobs this host may run concurrently.
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_port() -> u16 {
    DEFAULT_WORKER_PORT
}

fn default_threads() -> usize {
    1
}

impl HostSpec {
    pub fn new(address: impl Into<String>, port: u16, threads: usize) -> Self {
        Self { address: address.into(), port, threads }
    }

    /// `address:port`, the identity used for host dedupe and log lines.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl fmt::Display for HostSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_fills_defaults() {
        let spec: HostSpec = toml::from_str(r#"address = "10.0.0.5""#).unwrap();
        assert_eq!(spec.port, DEFAULT_WORKER_PORT);
        assert_eq!(spec.threads, 1);
    }

    #[test]
    fn endpoint_format() {
        let spec = HostSpec::new("worker-a", 3001, 4);
        assert_eq!(spec.endpoint(), "worker-a:3001");
        assert_eq!(spec.to_string(), "worker-a:3001");
    }
}
