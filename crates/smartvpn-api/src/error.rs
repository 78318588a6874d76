use thiserror::Error;

/// Top-level error type for the `smartvpn-api` crate.
///
/// Every variant is a transport-level failure from the caller's point of
/// view: the backend was unreachable, answered with a non-2xx status,
/// returned something that is not the expected JSON, or explicitly
/// reported `success: false`. `smartvpn-core` maps these into `CoreError`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-2xx response.
    #[error("Backend returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The envelope carried `success: false`.
    #[error("Backend rejected the request: {message}")]
    Rejected { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// Coarse classification of an [`Error`], used for logging and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Could not reach the backend at all.
    Unreachable,
    /// The request timed out (only with an explicit timeout configured).
    Timeout,
    /// The backend answered with a non-2xx status.
    Http,
    /// Response body was not the expected JSON.
    Malformed,
    /// The backend answered `success: false`.
    Rejected,
    /// Client-side misconfiguration (bad URL, client build failure).
    Config,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(e) if e.is_timeout() => ErrorKind::Timeout,
            Self::Transport(e) if e.is_builder() => ErrorKind::Config,
            Self::Transport(e) if e.is_decode() => ErrorKind::Malformed,
            Self::Transport(_) => ErrorKind::Unreachable,
            Self::InvalidUrl(_) => ErrorKind::Config,
            Self::Http { .. } => ErrorKind::Http,
            Self::Rejected { .. } => ErrorKind::Rejected,
            Self::Deserialization { .. } => ErrorKind::Malformed,
        }
    }

    /// The request URL, for transport failures that carry one.
    pub fn url(&self) -> Option<&url::Url> {
        match self {
            Self::Transport(e) => e.url(),
            _ => None,
        }
    }

    /// Returns `true` if the backend could not be reached (as opposed to
    /// reachable but unhappy).
    pub fn is_unreachable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Unreachable | ErrorKind::Timeout)
    }
}
