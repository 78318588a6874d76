// Backend wire types
//
// Everything the backend returns is wrapped in `Envelope<T>`. Field names are
// camelCase on the wire. Fields use `#[serde(default)]` so a partial status
// payload still decodes into a usable snapshot.

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard backend response envelope.
///
/// ```json
/// { "success": true, "data": { ... } }
/// ```
///
/// Failures may carry an `error` or `message` string instead of `data`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// The backend's own failure text, if it sent any.
    pub fn failure_message(&mut self) -> Option<String> {
        self.error.take().or_else(|| self.message.take())
    }
}

/// Backend-defined acknowledgement returned by the mutation endpoints.
pub type Ack = serde_json::Value;

// ── Status ───────────────────────────────────────────────────────────

/// Aggregate snapshot returned by `GET /status`.
///
/// Produced wholesale by the backend; the client only ever replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStatus {
    #[serde(default)]
    pub connection: ConnectionState,
    #[serde(default)]
    pub servers: Vec<ServerSummary>,
    #[serde(default)]
    pub rules: Vec<RuleSummary>,
    #[serde(default)]
    pub stats: StatsSummary,
}

/// Current tunnel state. `server_id`/`server_name` are expected only while
/// `connected` is true; the backend is trusted on that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionState {
    #[serde(default)]
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    #[serde(default)]
    pub total_servers: u32,
    #[serde(default)]
    pub active_rules: u32,
}

// ── History ──────────────────────────────────────────────────────────

/// One row of `GET /history`, kept in backend order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    #[serde(default)]
    pub server: String,
    /// ISO-8601, passed through untouched.
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Connect,
    Disconnect,
    /// Anything the backend adds later.
    #[serde(other)]
    Other,
}

// ── Requests ─────────────────────────────────────────────────────────

/// Body of `POST /connection/connect`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConnectRequest<'a> {
    pub server_id: &'a str,
}
