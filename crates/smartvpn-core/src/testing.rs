// Scripted in-memory backend for core tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use smartvpn_api::{
    Ack, ConnectionState, HistoryEntry, HistoryKind, ServerSummary, StatsSummary, SystemStatus,
};

use crate::backend::Backend;
use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Status,
    History,
    Connect(String),
    Disconnect,
}

#[derive(Default)]
struct FakeState {
    status: SystemStatus,
    history: Vec<HistoryEntry>,
    failing: Option<CoreError>,
}

/// Connect/disconnect flip the connection the way the real backend does;
/// status reads can be held back with [`FakeBackend::gate_status`].
pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
    calls: Mutex<Vec<Call>>,
    status_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

impl FakeBackend {
    pub(crate) fn new(status: SystemStatus) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState {
                status,
                ..FakeState::default()
            }),
            calls: Mutex::new(Vec::new()),
            status_gates: Mutex::new(VecDeque::new()),
        })
    }

    pub(crate) fn set_status(&self, status: SystemStatus) {
        self.state.lock().unwrap().status = status;
    }

    pub(crate) fn set_history(&self, history: Vec<HistoryEntry>) {
        self.state.lock().unwrap().history = history;
    }

    /// Every call fails with `error` until cleared.
    pub(crate) fn set_failing(&self, error: Option<CoreError>) {
        self.state.lock().unwrap().failing = error;
    }

    /// Hold the next status read until the returned sender fires. The
    /// snapshot it returns is captured when the request arrives.
    pub(crate) fn gate_status(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.status_gates.lock().unwrap().push_back(rx);
        tx
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn status_calls(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Status).count()
    }

    pub(crate) fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Connect(_) | Call::Disconnect))
            .collect()
    }

    fn record(&self, call: Call) -> Result<(), CoreError> {
        self.calls.lock().unwrap().push(call);
        match &self.state.lock().unwrap().failing {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Backend for FakeBackend {
    async fn status(&self) -> Result<SystemStatus, CoreError> {
        self.record(Call::Status)?;
        let snapshot = self.state.lock().unwrap().status.clone();
        let gate = self.status_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(snapshot)
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, CoreError> {
        self.record(Call::History)?;
        Ok(self.state.lock().unwrap().history.clone())
    }

    async fn connect(&self, server_id: &str) -> Result<Ack, CoreError> {
        self.record(Call::Connect(server_id.to_owned()))?;
        let mut state = self.state.lock().unwrap();
        let Some(server) = state.status.servers.iter().find(|s| s.id == server_id) else {
            return Err(CoreError::Http {
                status: 404,
                message: "Server not found".into(),
            });
        };
        let connection = ConnectionState {
            connected: true,
            server_id: Some(server.id.clone()),
            server_name: Some(server.name.clone()),
        };
        state.status.connection = connection;
        Ok(serde_json::json!({ "connected": true }))
    }

    async fn disconnect(&self) -> Result<Ack, CoreError> {
        self.record(Call::Disconnect)?;
        self.state.lock().unwrap().status.connection = ConnectionState::default();
        Ok(Ack::Null)
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────

pub(crate) fn server(id: &str, name: &str) -> ServerSummary {
    ServerSummary {
        id: id.into(),
        name: name.into(),
        host: format!("{id}.vpn.example"),
        protocol: "wireguard".into(),
        country: "XX".into(),
    }
}

/// Disconnected, two servers known.
pub(crate) fn disconnected_with_servers() -> SystemStatus {
    SystemStatus {
        connection: ConnectionState::default(),
        servers: vec![server("sg-1", "Singapore"), server("us-1", "New York")],
        rules: Vec::new(),
        stats: StatsSummary {
            total_servers: 2,
            active_rules: 3,
        },
    }
}

/// Connected to `sg-1`.
pub(crate) fn singapore() -> SystemStatus {
    let mut status = disconnected_with_servers();
    status.connection = ConnectionState {
        connected: true,
        server_id: Some("sg-1".into()),
        server_name: Some("Singapore".into()),
    };
    status
}

pub(crate) fn history_entry(id: &str, kind: HistoryKind) -> HistoryEntry {
    HistoryEntry {
        id: id.into(),
        kind,
        server: "Singapore".into(),
        timestamp: "2024-06-15T10:30:00Z".into(),
    }
}

/// Let spawned tasks run until they park.
pub(crate) async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}
