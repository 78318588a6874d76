// ── View reconcilers ──
//
// Pure derivations from a polled snapshot to the fields a screen renders.
// No I/O, no shared state; absent data degrades to "None", zero counts and
// empty lists.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::Serialize;

use smartvpn_api::{HistoryEntry, HistoryKind, SystemStatus};

use crate::screen::ScreenKind;

/// Placeholder shown when no server name is known.
pub const NO_SERVER: &str = "None";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Maps a poller's snapshot to one screen's view model.
pub trait Reconcile: Send + Sync + 'static {
    /// The polled payload this screen consumes.
    type Input: Send + Sync + 'static;
    /// The derived view model.
    type View: Clone + Default + PartialEq + Send + Sync + 'static;

    const KIND: ScreenKind;

    fn reconcile(input: Option<&Self::Input>) -> Self::View;
}

// ── Home ─────────────────────────────────────────────────────────────

/// Connection summary and headline counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeView {
    pub is_connected: bool,
    pub server_name: String,
    /// `Server: <name>`, only while connected.
    pub server_line: Option<String>,
    pub status_label: &'static str,
    pub action_label: &'static str,
    pub total_servers: u32,
    pub active_rules: u32,
}

impl Default for HomeView {
    fn default() -> Self {
        Home::reconcile(None)
    }
}

pub enum Home {}

impl Reconcile for Home {
    type Input = SystemStatus;
    type View = HomeView;
    const KIND: ScreenKind = ScreenKind::Home;

    fn reconcile(input: Option<&SystemStatus>) -> HomeView {
        let connected = input.is_some_and(|s| s.connection.connected);
        // A name left over from a disconnected state, or an empty one, counts
        // as missing.
        let server_name = input
            .filter(|s| s.connection.connected)
            .and_then(|s| s.connection.server_name.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or(NO_SERVER)
            .to_owned();
        let stats = input.map(|s| s.stats).unwrap_or_default();

        HomeView {
            is_connected: connected,
            server_line: connected.then(|| format!("Server: {server_name}")),
            server_name,
            status_label: if connected { "Connected" } else { "Disconnected" },
            action_label: if connected { "Disconnect" } else { "Connect" },
            total_servers: stats.total_servers,
            active_rules: stats.active_rules,
        }
    }
}

// ── Servers ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServersView {
    pub rows: Vec<ServerRow>,
}

impl ServersView {
    pub fn active(&self) -> Option<&ServerRow> {
        self.rows.iter().find(|row| row.active)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerRow {
    pub id: String,
    pub name: String,
    pub host: String,
    pub protocol: String,
    pub country: String,
    /// This is the server the tunnel is currently on.
    pub active: bool,
}

pub enum Servers {}

impl Reconcile for Servers {
    type Input = SystemStatus;
    type View = ServersView;
    const KIND: ScreenKind = ScreenKind::Servers;

    fn reconcile(input: Option<&SystemStatus>) -> ServersView {
        let Some(status) = input else {
            return ServersView::default();
        };
        let active_id = status
            .connection
            .connected
            .then_some(status.connection.server_id.as_deref())
            .flatten();

        let rows = status
            .servers
            .iter()
            .map(|s| ServerRow {
                id: s.id.clone(),
                name: s.name.clone(),
                host: s.host.clone(),
                protocol: s.protocol.clone(),
                country: s.country.clone(),
                active: active_id == Some(s.id.as_str()),
            })
            .collect();
        ServersView { rows }
    }
}

// ── Rules ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RulesView {
    pub rows: Vec<RuleRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleRow {
    pub id: String,
    pub name: String,
    pub pattern: String,
    pub enabled: bool,
    pub badge: &'static str,
}

pub enum Rules {}

impl Reconcile for Rules {
    type Input = SystemStatus;
    type View = RulesView;
    const KIND: ScreenKind = ScreenKind::Rules;

    fn reconcile(input: Option<&SystemStatus>) -> RulesView {
        let rows = input
            .map(|s| s.rules.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|r| RuleRow {
                id: r.id.clone(),
                name: r.name.clone(),
                pattern: r.pattern.clone(),
                enabled: r.enabled,
                badge: if r.enabled { "Active" } else { "Disabled" },
            })
            .collect();
        RulesView { rows }
    }
}

// ── History ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryView {
    pub rows: Vec<HistoryRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
    pub id: String,
    pub kind: HistoryKind,
    pub glyph: char,
    pub server: String,
    /// Raw backend timestamp.
    pub timestamp: String,
    /// Timestamp rendered in the local zone, or the raw value if unparseable.
    pub local_time: String,
}

pub enum History {}

impl History {
    /// Zone-generic reconciliation.
    pub fn reconcile_in<Tz>(input: Option<&Vec<HistoryEntry>>, tz: &Tz) -> HistoryView
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let rows = input
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|e| HistoryRow {
                id: e.id.clone(),
                kind: e.kind,
                glyph: glyph(e.kind),
                server: e.server.clone(),
                timestamp: e.timestamp.clone(),
                local_time: format_timestamp(&e.timestamp, tz),
            })
            .collect();
        HistoryView { rows }
    }
}

impl Reconcile for History {
    type Input = Vec<HistoryEntry>;
    type View = HistoryView;
    const KIND: ScreenKind = ScreenKind::History;

    fn reconcile(input: Option<&Vec<HistoryEntry>>) -> HistoryView {
        Self::reconcile_in(input, &Local)
    }
}

/// `↑` for connect, `↓` for everything else.
pub fn glyph(kind: HistoryKind) -> char {
    match kind {
        HistoryKind::Connect => '↑',
        HistoryKind::Disconnect | HistoryKind::Other => '↓',
    }
}

/// Render an ISO-8601 timestamp in `tz`.
///
/// RFC 3339 (with offset) is shifted into `tz`. A bare
/// `YYYY-MM-DDTHH:MM:SS[.fff]` is already wall time in `tz`, and a bare
/// `YYYY-MM-DD` is UTC midnight. Anything else is returned unchanged.
pub fn format_timestamp<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        // Skipped by a DST jump: nothing to render but the input.
        return tz
            .from_local_datetime(&naive)
            .earliest()
            .map_or_else(|| raw.to_owned(), |ts| ts.format(TIMESTAMP_FORMAT).to_string());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_time(NaiveTime::MIN)
            .and_utc()
            .with_timezone(tz)
            .format(TIMESTAMP_FORMAT)
            .to_string();
    }
    raw.to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{FixedOffset, Utc};
    use pretty_assertions::assert_eq;
    use smartvpn_api::{ConnectionState, RuleSummary, ServerSummary, StatsSummary};

    use super::*;

    fn server(id: &str, name: &str) -> ServerSummary {
        ServerSummary {
            id: id.into(),
            name: name.into(),
            host: format!("{id}.vpn.example"),
            protocol: "wireguard".into(),
            country: "XX".into(),
        }
    }

    fn connected_to_singapore() -> SystemStatus {
        SystemStatus {
            connection: ConnectionState {
                connected: true,
                server_id: Some("sg-1".into()),
                server_name: Some("Singapore".into()),
            },
            servers: vec![server("sg-1", "Singapore"), server("us-1", "New York")],
            rules: vec![
                RuleSummary {
                    id: "r1".into(),
                    name: "Streaming".into(),
                    pattern: "*.netflix.com".into(),
                    enabled: true,
                },
                RuleSummary {
                    id: "r2".into(),
                    name: "Banking".into(),
                    pattern: "*.bank.example".into(),
                    enabled: false,
                },
            ],
            stats: StatsSummary {
                total_servers: 2,
                active_rules: 3,
            },
        }
    }

    #[test]
    fn home_connected_scenario() {
        let view = Home::reconcile(Some(&connected_to_singapore()));
        assert_eq!(
            view,
            HomeView {
                is_connected: true,
                server_name: "Singapore".into(),
                server_line: Some("Server: Singapore".into()),
                status_label: "Connected",
                action_label: "Disconnect",
                total_servers: 2,
                active_rules: 3,
            }
        );
    }

    #[test]
    fn home_disconnected_shows_none_without_server_line() {
        let status = SystemStatus {
            servers: vec![server("us-1", "New York")],
            ..SystemStatus::default()
        };
        let view = Home::reconcile(Some(&status));
        assert!(!view.is_connected);
        assert_eq!(view.server_name, NO_SERVER);
        assert_eq!(view.server_line, None);
        assert_eq!(view.status_label, "Disconnected");
        assert_eq!(view.action_label, "Connect");
    }

    #[test]
    fn home_without_snapshot_degrades() {
        let view = Home::reconcile(None);
        assert_eq!(view, HomeView::default());
        assert_eq!(view.server_name, "None");
        assert_eq!(view.total_servers, 0);
        assert_eq!(view.active_rules, 0);
    }

    #[test]
    fn home_empty_server_name_counts_as_missing() {
        let mut status = connected_to_singapore();
        status.connection.server_name = Some(String::new());
        let view = Home::reconcile(Some(&status));
        assert_eq!(view.server_line.as_deref(), Some("Server: None"));
    }

    #[test]
    fn home_ignores_stale_server_name_when_disconnected() {
        let mut status = connected_to_singapore();
        status.connection.connected = false;
        let view = Home::reconcile(Some(&status));
        assert_eq!(view.server_name, NO_SERVER);
        assert_eq!(view.server_line, None);
        assert!(!view.is_connected);
    }

    #[test]
    fn servers_highlights_exactly_the_connected_row() {
        let view = Servers::reconcile(Some(&connected_to_singapore()));
        let active: Vec<_> = view.rows.iter().filter(|r| r.active).map(|r| r.id.as_str()).collect();
        assert_eq!(active, vec!["sg-1"]);
        assert_eq!(view.active().map(|r| r.name.as_str()), Some("Singapore"));
    }

    #[test]
    fn servers_ignores_stale_server_id_when_disconnected() {
        let mut status = connected_to_singapore();
        status.connection.connected = false;
        let view = Servers::reconcile(Some(&status));
        assert_eq!(view.rows.len(), 2);
        assert!(view.active().is_none());
    }

    #[test]
    fn rules_pass_enabled_through_with_badge() {
        let view = Rules::reconcile(Some(&connected_to_singapore()));
        let badges: Vec<_> = view.rows.iter().map(|r| (r.id.as_str(), r.enabled, r.badge)).collect();
        assert_eq!(badges, vec![("r1", true, "Active"), ("r2", false, "Disabled")]);
        assert!(Rules::reconcile(None).rows.is_empty());
    }

    #[test]
    fn history_glyphs_and_order() {
        let entries = vec![
            HistoryEntry {
                id: "h2".into(),
                kind: HistoryKind::Disconnect,
                server: "Singapore".into(),
                timestamp: "2024-06-15T11:00:00Z".into(),
            },
            HistoryEntry {
                id: "h1".into(),
                kind: HistoryKind::Connect,
                server: "Singapore".into(),
                timestamp: "2024-06-15T10:30:00Z".into(),
            },
            HistoryEntry {
                id: "h0".into(),
                kind: HistoryKind::Other,
                server: "Tokyo".into(),
                timestamp: "yesterday".into(),
            },
        ];
        let view = History::reconcile_in(Some(&entries), &Utc);
        let rows: Vec<_> = view
            .rows
            .iter()
            .map(|r| (r.id.as_str(), r.glyph, r.local_time.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("h2", '↓', "2024-06-15 11:00:00"),
                ("h1", '↑', "2024-06-15 10:30:00"),
                ("h0", '↓', "yesterday"),
            ]
        );
    }

    #[test]
    fn timestamps_shift_into_the_given_zone() {
        let plus_eight = FixedOffset::east_opt(8 * 3600).unwrap();
        assert_eq!(
            format_timestamp("2024-06-15T10:30:00Z", &plus_eight),
            "2024-06-15 18:30:00"
        );
        assert_eq!(format_timestamp("", &plus_eight), "");
    }

    #[test]
    fn offsetless_timestamps_are_local_wall_time() {
        let plus_eight = FixedOffset::east_opt(8 * 3600).unwrap();
        assert_eq!(
            format_timestamp("2024-06-15T10:30:00", &plus_eight),
            "2024-06-15 10:30:00"
        );
        assert_eq!(
            format_timestamp("2024-06-15T10:30:00.123", &plus_eight),
            "2024-06-15 10:30:00"
        );
    }

    #[test]
    fn date_only_is_utc_midnight() {
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(
            format_timestamp("2024-06-15", &minus_five),
            "2024-06-14 19:00:00"
        );
        assert_eq!(format_timestamp("15/06/2024", &minus_five), "15/06/2024");
    }

    #[test]
    fn reconcile_is_idempotent() {
        let status = connected_to_singapore();
        assert_eq!(Home::reconcile(Some(&status)), Home::reconcile(Some(&status)));
        assert_eq!(Servers::reconcile(Some(&status)), Servers::reconcile(Some(&status)));
    }
}
