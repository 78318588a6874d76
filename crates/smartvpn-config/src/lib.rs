//! Configuration for the Smart VPN CLI.
//!
//! TOML file plus `SMARTVPN_` environment overrides, and translation to
//! `smartvpn_core::SyncConfig` / `TransportConfig`. The CLI layers its own
//! flag overrides on top.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use smartvpn_core::{DEFAULT_POLL_INTERVAL, ScreenKind, SyncConfig, TransportConfig};

/// Backend used when no file, variable or flag names one.
pub use smartvpn_core::DEFAULT_BASE_URL as DEFAULT_BACKEND_URL;

/// Environment prefix; nested keys split on `__` (`SMARTVPN_POLLING__INTERVAL_MS`).
pub const ENV_PREFIX: &str = "SMARTVPN_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendSection,

    #[serde(default)]
    pub polling: PollingSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendSection {
    /// Base URL the endpoint paths are joined under.
    #[serde(default = "default_url")]
    pub url: String,

    /// Request timeout in seconds. Unset leaves the platform default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PollingSection {
    /// Refresh period for periodic screens; 0 disables periodic refresh.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Screens that fetch only on mount.
    #[serde(default = "default_one_shot_screens")]
    pub one_shot_screens: Vec<ScreenKind>,

    /// Let all status screens share one poller.
    #[serde(default)]
    pub shared_feed: bool,
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            one_shot_screens: default_one_shot_screens(),
            shared_feed: false,
        }
    }
}

fn default_url() -> String {
    DEFAULT_BACKEND_URL.into()
}
fn default_interval_ms() -> u64 {
    u64::try_from(DEFAULT_POLL_INTERVAL.as_millis()).unwrap_or(3000)
}
fn default_one_shot_screens() -> Vec<ScreenKind> {
    SyncConfig::default().one_shot_screens.into_iter().collect()
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    pub fn backend_url(&self) -> Result<Url, ConfigError> {
        parse_backend_url(&self.backend.url)
    }

    pub fn transport_config(&self) -> TransportConfig {
        match self.backend.timeout_secs {
            Some(secs) if secs > 0 => {
                TransportConfig::default().with_timeout(Duration::from_secs(secs))
            }
            _ => TransportConfig::default(),
        }
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            poll_interval: Duration::from_millis(self.polling.interval_ms),
            one_shot_screens: self
                .polling
                .one_shot_screens
                .iter()
                .copied()
                .collect::<BTreeSet<_>>(),
            shared_feed: self.polling.shared_feed,
        }
    }

    /// Check everything extraction cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend_url()?;
        Ok(())
    }
}

/// Parse a backend base URL; only http(s) is accepted.
pub fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Validation {
        field: "backend.url".into(),
        reason: format!("{e}: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "backend.url".into(),
            reason: format!("expected an http or https URL, got '{raw}'"),
        });
    }
    Ok(url)
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "smartvpn", "smartvpn").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("smartvpn");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file at `path` (a missing file is fine), then
/// `SMARTVPN_*` variables.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        // Flag-level variables belong to the CLI, not the file schema.
        .merge(
            Env::prefixed(ENV_PREFIX)
                .split("__")
                .ignore(&["backend", "config"]),
        );

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parent dirs.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use smartvpn_core::RefreshPolicy;

    use super::*;

    fn write(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.backend_url().unwrap().as_str(), DEFAULT_BACKEND_URL);
        assert_eq!(config.sync_config(), SyncConfig::default());
    }

    #[test]
    fn file_overrides_polling() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
[backend]
url = "http://10.0.0.5:3001/api"
timeout_secs = 5

[polling]
interval_ms = 1500
one_shot_screens = ["history"]
shared_feed = true
"#,
        );

        let config = load_config_from(&path).unwrap();
        let sync = config.sync_config();

        assert_eq!(config.backend_url().unwrap().host_str(), Some("10.0.0.5"));
        assert_eq!(
            sync.policy_for(ScreenKind::Servers),
            RefreshPolicy::Periodic(Duration::from_millis(1500))
        );
        assert_eq!(sync.policy_for(ScreenKind::History), RefreshPolicy::OneShot);
        assert!(sync.shared_feed);
        assert_eq!(
            config.transport_config().timeout,
            Some(Duration::from_secs(5))
        );
    }

    #[test]
    fn unknown_screen_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "[polling]\none_shot_screens = [\"settings\"]\n");

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Figment(_)), "got: {err:?}");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "[polling]\nintervall_ms = 10\n");

        assert!(load_config_from(&path).is_err());
    }

    #[test]
    fn non_http_backend_url_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "[backend]\nurl = \"ftp://example.com\"\n");

        match load_config_from(&path).unwrap_err() {
            ConfigError::Validation { field, .. } => assert_eq!(field, "backend.url"),
            other => panic!("expected Validation, got: {other:?}"),
        }
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.polling.shared_feed = true;
        config.backend.timeout_secs = Some(10);

        save_config_to(&config, &path).unwrap();

        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn zero_timeout_means_platform_default() {
        let mut config = Config::default();
        config.backend.timeout_secs = Some(0);
        assert_eq!(config.transport_config().timeout, None);
    }
}
