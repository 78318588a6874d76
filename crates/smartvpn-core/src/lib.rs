//! State-synchronization core between `smartvpn-api` and screen consumers.
//!
//! The backend is the single source of truth; this crate keeps
//! independently mounted screens consistent with it:
//!
//! - **[`Poller`]** — Lease-counted fetch loop publishing a [`Feed`] through
//!   `tokio::sync::watch`. Every poll carries a monotonic sequence number and
//!   only the latest issued one may write, so a slow response never
//!   overwrites a newer one. Timer ticks coalesce while a fetch is in flight.
//!
//! - **[`Reconcile`]** — Pure mapping from a snapshot to a screen's view
//!   model ([`HomeView`], [`ServersView`], [`RulesView`], [`HistoryView`]).
//!
//! - **[`Screen`]** — A mounted screen: one lease plus reconciled local
//!   state. Unmounting cancels its timer share and drops late responses.
//!
//! - **[`Dispatcher`]** — Connect/disconnect followed by exactly one forced
//!   re-poll, without optimistic updates.
//!
//! - **[`Session`]** — Facade that mounts screens with the refresh policy
//!   from [`SyncConfig`] and routes actions to the right feed.
//!
//! The [`Backend`] trait is the seam to the outside world;
//! `smartvpn_api::Client` implements it.

pub mod backend;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod poller;
pub mod screen;
pub mod session;
pub mod view;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::Backend;
pub use config::{DEFAULT_POLL_INTERVAL, SyncConfig};
pub use dispatch::{Action, ActionReport, Dispatcher, plan_toggle};
pub use error::CoreError;
pub use poller::{Feed, Lease, PollOutcome, PollPhase, Poller, RefreshPolicy};
pub use screen::{Screen, ScreenKind, ScreenState};
pub use session::Session;
pub use view::{
    History, HistoryRow, HistoryView, Home, HomeView, NO_SERVER, Reconcile, RuleRow, Rules,
    RulesView, ServerRow, Servers, ServersView,
};

// Transport and wire models consumers use alongside views.
pub use smartvpn_api::{
    Ack, Client, ConnectionState, DEFAULT_BASE_URL, HistoryEntry, HistoryKind, RuleSummary,
    ServerSummary, StatsSummary, SystemStatus, TransportConfig,
};
