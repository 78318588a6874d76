//! History screen.

use tabled::Tabled;

use smartvpn_core::{HistoryKind, HistoryRow, HistoryView};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::RenderView;

#[derive(Tabled)]
struct HistoryTableRow {
    #[tabled(rename = "")]
    glyph: char,
    #[tabled(rename = "Event")]
    event: &'static str,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "Time")]
    time: String,
}

impl From<&HistoryRow> for HistoryTableRow {
    fn from(h: &HistoryRow) -> Self {
        Self {
            glyph: h.glyph,
            event: match h.kind {
                HistoryKind::Connect => "Connected",
                HistoryKind::Disconnect => "Disconnected",
                HistoryKind::Other => "Other",
            },
            server: h.server.clone(),
            time: h.local_time.clone(),
        }
    }
}

impl RenderView for HistoryView {
    fn render(&self, global: &GlobalOpts) -> Result<String, CliError> {
        output::render_list(
            &global.output,
            &self.rows,
            |h| HistoryTableRow::from(h),
            |h| format!("{} {} {}", h.glyph, h.server, h.local_time),
        )
    }
}
