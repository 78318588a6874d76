//! Home screen: connection summary, toggle and disconnect.

use smartvpn_core::{Client, HomeView, ScreenKind, Session};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::{RenderView, finish, warn_if_degraded};

impl RenderView for HomeView {
    fn render(&self, global: &GlobalOpts) -> Result<String, CliError> {
        let color = output::should_color(&global.color);
        output::render_single(
            &global.output,
            self,
            |v| home_detail(v, color),
            |v| v.status_label.to_owned(),
        )
    }
}

fn home_detail(view: &HomeView, color: bool) -> String {
    let mut pairs = vec![(
        "Status",
        output::status_paint(view.status_label, view.is_connected, color),
    )];
    if let Some(ref line) = view.server_line {
        pairs.push(("Server", line.trim_start_matches("Server: ").to_owned()));
    }
    pairs.push(("Servers", view.total_servers.to_string()));
    pairs.push(("Active rules", view.active_rules.to_string()));

    format!(
        "{}\n{}",
        output::heading(ScreenKind::Home.label(), color),
        output::detail_lines(&pairs)
    )
}

/// Home's connect/disconnect button.
pub async fn toggle(session: &Session<Client>, global: &GlobalOpts) -> Result<(), CliError> {
    let home = session.home();
    let loaded = home.settled().await;
    warn_if_degraded(&loaded, global);

    let report = session.toggle_connection(&home).await;
    if !global.quiet {
        eprintln!("-> {}", report.action);
    }

    output::print_output(&home.view().render(global)?, global.quiet);
    finish(&report)
}

pub async fn disconnect(session: &Session<Client>, global: &GlobalOpts) -> Result<(), CliError> {
    let home = session.home();
    let report = session.disconnect(&home).await;

    output::print_output(&home.view().render(global)?, global.quiet);
    finish(&report)
}
