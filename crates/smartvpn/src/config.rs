//! CLI configuration: thin wrapper around `smartvpn_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (`--config`, `--backend`, `--timeout`).

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use smartvpn_core::{SyncConfig, TransportConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use smartvpn_config::{Config, parse_backend_url, save_config_to};

/// Everything a command needs to open a session.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub backend_url: Url,
    pub transport: TransportConfig,
    pub sync: SyncConfig,
}

/// Config file in effect: `--config` / `SMARTVPN_CONFIG`, else the default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(smartvpn_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(smartvpn_config::load_config_from(&config_path(global))?)
}

/// Load the config and apply flag overrides (flag > env > file > default).
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load(global)?;

    let backend_url = match global.backend.as_deref() {
        Some(raw) => parse_backend_url(raw)?,
        None => cfg.backend_url()?,
    };

    let transport = match global.timeout {
        Some(0) => TransportConfig::default(),
        Some(secs) => TransportConfig::default().with_timeout(Duration::from_secs(secs)),
        None => cfg.transport_config(),
    };

    Ok(Resolved {
        backend_url,
        transport,
        sync: cfg.sync_config(),
    })
}
