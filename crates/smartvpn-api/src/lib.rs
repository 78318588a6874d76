//! Async client for the Smart VPN management backend.
//!
//! The backend exposes a small JSON API under a fixed base path. Every
//! response is wrapped in a `{ success, data }` envelope; [`Client`] checks
//! `success` on every endpoint and hands callers the unwrapped `data`.
//!
//! - [`Client::get_status`] — `GET /status`, the full [`SystemStatus`] snapshot
//! - [`Client::get_history`] — `GET /history`, connect/disconnect log
//! - [`Client::connect`] / [`Client::disconnect`] — connection mutations
//!
//! No retries, no caching and no authentication happen at this layer.

pub mod client;
mod connection;
pub mod error;
pub mod models;
mod status;
pub mod transport;

pub use client::Client;
pub use error::{Error, ErrorKind};
pub use models::{
    Ack, ConnectionState, Envelope, HistoryEntry, HistoryKind, RuleSummary, ServerSummary,
    StatsSummary, SystemStatus,
};
pub use transport::{DEFAULT_BASE_URL, TransportConfig};
