//! Servers screen: inventory with the connected row marked, and
//! connect-by-id.

use tabled::Tabled;

use smartvpn_core::{Client, ServerRow, ServersView, Session};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::{RenderView, finish, warn_if_degraded};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ServerTableRow {
    #[tabled(rename = "")]
    active: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Country")]
    country: String,
}

impl From<&ServerRow> for ServerTableRow {
    fn from(s: &ServerRow) -> Self {
        Self {
            active: if s.active { "*" } else { "" },
            id: s.id.clone(),
            name: s.name.clone(),
            host: s.host.clone(),
            protocol: s.protocol.to_uppercase(),
            country: s.country.clone(),
        }
    }
}

impl RenderView for ServersView {
    fn render(&self, global: &GlobalOpts) -> Result<String, CliError> {
        output::render_list(
            &global.output,
            &self.rows,
            |s| ServerTableRow::from(s),
            |s| s.id.clone(),
        )
    }
}

// ── Handler ─────────────────────────────────────────────────────────

/// Row tap on the Servers screen. The id is sent as given; the backend
/// decides whether it exists.
pub async fn connect(
    session: &Session<Client>,
    server_id: String,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let servers = session.servers();
    let loaded = servers.settled().await;
    warn_if_degraded(&loaded, global);

    let report = session.connect_to_server(&servers, server_id).await;
    if !global.quiet {
        eprintln!("-> {}", report.action);
    }

    output::print_output(&servers.view().render(global)?, global.quiet);
    finish(&report)
}
