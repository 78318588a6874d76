// ── Action dispatch ──
//
// Connect/disconnect mutations. Each one is followed by exactly one forced
// re-poll of the status feed, whether or not the mutation succeeded. There
// is no optimistic update: the view changes only when the re-poll lands.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use smartvpn_api::{Ack, SystemStatus};

use crate::backend::Backend;
use crate::error::CoreError;
use crate::poller::{PollOutcome, Poller};

/// A planned mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Connect { server_id: String },
    Disconnect,
    /// Nothing to do (disconnected and no servers known).
    Noop,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect { server_id } => write!(f, "connect {server_id}"),
            Self::Disconnect => f.write_str("disconnect"),
            Self::Noop => f.write_str("noop"),
        }
    }
}

/// Decide what a connect/disconnect toggle does, from the last fetched
/// snapshot: disconnect when connected, otherwise connect to the first
/// known server.
pub fn plan_toggle(snapshot: Option<&SystemStatus>) -> Action {
    let Some(status) = snapshot else {
        return Action::Noop;
    };
    if status.connection.connected {
        return Action::Disconnect;
    }
    status
        .servers
        .first()
        .map_or(Action::Noop, |first| Action::Connect {
            server_id: first.id.clone(),
        })
}

/// What a dispatched action did.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionReport {
    pub action: Action,
    /// Backend acknowledgement, or why the mutation failed. `Noop` reports
    /// `Ok(Null)`.
    pub result: Result<Ack, CoreError>,
    pub repoll: PollOutcome,
}

impl ActionReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&CoreError> {
        self.result.as_ref().err()
    }
}

pub struct Dispatcher<B> {
    backend: Arc<B>,
    poller: Poller<SystemStatus>,
}

impl<B: Backend> Dispatcher<B> {
    /// `poller` is the feed re-polled after every mutation.
    pub fn new(backend: Arc<B>, poller: Poller<SystemStatus>) -> Self {
        Self { backend, poller }
    }

    pub fn plan_toggle(&self) -> Action {
        plan_toggle(self.poller.current().data.as_deref())
    }

    pub async fn toggle_connection(&self) -> ActionReport {
        let action = self.plan_toggle();
        self.perform(action).await
    }

    /// Connect to `server_id` as given; the backend validates it.
    pub async fn connect_to_server(&self, server_id: impl Into<String>) -> ActionReport {
        self.perform(Action::Connect {
            server_id: server_id.into(),
        })
        .await
    }

    pub async fn disconnect(&self) -> ActionReport {
        self.perform(Action::Disconnect).await
    }

    pub async fn perform(&self, action: Action) -> ActionReport {
        debug!(%action, "dispatching");
        let result = match &action {
            Action::Connect { server_id } => self.backend.connect(server_id).await,
            Action::Disconnect => self.backend.disconnect().await,
            Action::Noop => Ok(Ack::Null),
        };
        if let Err(ref error) = result {
            warn!(%action, error = %error, "mutation failed");
        }

        let repoll = self.poller.refresh().await;
        ActionReport {
            action,
            result,
            repoll,
        }
    }
}
