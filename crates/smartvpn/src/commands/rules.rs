//! Rules screen.

use tabled::Tabled;

use smartvpn_core::{RuleRow, RulesView};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::RenderView;

#[derive(Tabled)]
struct RuleTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Pattern")]
    pattern: String,
    #[tabled(rename = "State")]
    badge: &'static str,
}

impl From<&RuleRow> for RuleTableRow {
    fn from(r: &RuleRow) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            pattern: r.pattern.clone(),
            badge: r.badge,
        }
    }
}

impl RenderView for RulesView {
    fn render(&self, global: &GlobalOpts) -> Result<String, CliError> {
        output::render_list(
            &global.output,
            &self.rows,
            |r| RuleTableRow::from(r),
            |r| r.id.clone(),
        )
    }
}
