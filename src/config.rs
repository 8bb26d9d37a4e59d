//! Minimal CLI configuration layer. The core library reads no
//! configuration of its own — every knob below is consumed by the
//! example binaries in `src/bin/`. Grounded on
//! `fabriziosalmi-secbeat`'s `mitigation-node/src/config.rs` for the
//! layering pattern (`config::Config` builder + typed `serde` struct +
//! environment overrides), scaled down from that repo's dozen nested
//! sections to the handful of fields a raw-socket HTTP client actually
//! needs.

use crate::error::{HaquestsError, Result};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "HAQUESTS";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Verify the peer's TLS certificate. Defaults to `true`; only
    /// `tls_get`'s `--insecure` flag turns it off, never the default.
    #[serde(default = "default_verify_peer")]
    pub verify_peer: bool,

    #[serde(default)]
    pub use_tls: bool,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_verify_peer() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            timeout_secs: default_timeout_secs(),
            verify_peer: default_verify_peer(),
            use_tls: false,
            log_level: default_log_level(),
        }
    }
}

impl CliConfig {
    /// Load defaults, then apply `HAQUESTS_*` environment overrides
    /// (e.g. `HAQUESTS_TIMEOUT_SECS=10`). No config file is read — the
    /// binaries this serves take their target URL as a positional
    /// argument, not from a file.
    pub fn load() -> Result<Self> {
        let builder = config::Config::builder()
            .add_source(
                config::Config::try_from(&CliConfig::default())
                    .map_err(|e| HaquestsError::Parse(format!("invalid configuration: {e}")))?,
            )
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("_"));

        builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| HaquestsError::Parse(format!("invalid configuration: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = CliConfig::default();
        assert_eq!(cfg.timeout_secs, 5);
        assert!(cfg.verify_peer);
        assert!(!cfg.use_tls);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn load_falls_back_to_defaults_without_env_vars() {
        std::env::remove_var("HAQUESTS_TIMEOUT_SECS");
        let cfg = CliConfig::load().unwrap();
        assert_eq!(cfg.timeout_secs, 5);
    }
}
