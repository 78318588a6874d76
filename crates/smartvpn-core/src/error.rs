// ── Core error types ──
//
// User-facing errors from smartvpn-core. Consumers never see reqwest or
// serde errors directly; the `From<smartvpn_api::Error>` impl folds them
// into these variants. `CoreError` is `Clone` so a poller can keep the
// last failure on its feed.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Transport errors ─────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Backend request timed out")]
    Timeout,

    #[error("Backend returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Malformed backend response: {message}")]
    Malformed { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation rejected by backend: {message}")]
    Rejected { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` if the backend could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::Timeout)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<smartvpn_api::Error> for CoreError {
    fn from(err: smartvpn_api::Error) -> Self {
        use smartvpn_api::{Error as ApiError, ErrorKind};

        match (err.kind(), err) {
            (_, ApiError::Http { status, message }) => CoreError::Http { status, message },
            (_, ApiError::Rejected { message }) => CoreError::Rejected { message },
            (_, ApiError::Deserialization { message, body: _ }) => {
                CoreError::Malformed { message }
            }
            (ErrorKind::Timeout, _) => CoreError::Timeout,
            (ErrorKind::Unreachable, other) => CoreError::Unreachable {
                url: other
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                reason: other.to_string(),
            },
            (ErrorKind::Malformed, other) => CoreError::Malformed {
                message: other.to_string(),
            },
            (ErrorKind::Config | ErrorKind::Http | ErrorKind::Rejected, other) => {
                CoreError::Config {
                    message: other.to_string(),
                }
            }
        }
    }
}
