//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use smartvpn_config::ConfigError;
use smartvpn_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend at {url}: {reason}")]
    #[diagnostic(
        code(smartvpn::unreachable),
        help(
            "Check that the backend is running and accessible.\n\
             Point at a different one with --backend <URL> or SMARTVPN_BACKEND."
        )
    )]
    Unreachable { url: String, reason: String },

    #[error("Backend request timed out")]
    #[diagnostic(
        code(smartvpn::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    // ── Backend ──────────────────────────────────────────────────────
    #[error("Backend rejected the request: {message}")]
    #[diagnostic(code(smartvpn::rejected))]
    Rejected { message: String },

    #[error("Backend error (HTTP {status}): {message}")]
    #[diagnostic(code(smartvpn::http))]
    Http { status: u16, message: String },

    #[error("Backend sent a malformed response: {message}")]
    #[diagnostic(
        code(smartvpn::malformed),
        help("Is --backend pointing at the API base path (e.g. http://localhost:3001/api)?")
    )]
    Malformed { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(smartvpn::validation))]
    Validation { field: String, reason: String },

    #[error("Unknown screen '{name}'")]
    #[diagnostic(
        code(smartvpn::unknown_screen),
        help("Available screens: home, servers, rules, history")
    )]
    UnknownScreen { name: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(smartvpn::config),
        help("Check the file shown by `smartvpn config path` and SMARTVPN_* variables.")
    )]
    Config { message: String },

    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(smartvpn::config_exists),
        help("Pass --force to overwrite it.")
    )]
    ConfigExists { path: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(smartvpn::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable { .. } | Self::Timeout => exit_code::CONNECTION,
            Self::Validation { .. } => exit_code::USAGE,
            Self::UnknownScreen { .. } | Self::Config { .. } => exit_code::CONFIG,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unreachable { url, reason } => CliError::Unreachable { url, reason },
            CoreError::Timeout => CliError::Timeout,
            CoreError::Http { status, message } => CliError::Http { status, message },
            CoreError::Malformed { message } => CliError::Malformed { message },
            CoreError::Rejected { message } => CliError::Rejected { message },
            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Render(err.to_string())
    }
}
