//! Command dispatch: bridges CLI args -> core screens/actions -> output formatting.

pub mod config_cmd;
pub mod history;
pub mod rules;
pub mod servers;
pub mod status;
pub mod watch;

use smartvpn_core::{ActionReport, Client, Reconcile, Screen, ScreenState, Session};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// State rendering shared by one-shot commands and `watch`.
pub trait RenderView {
    fn render(&self, global: &GlobalOpts) -> Result<String, CliError>;
}

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    session: &Session<Client>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => show(&session.home(), global).await,
        Command::Servers => show(&session.servers(), global).await,
        Command::Rules => show(&session.rules(), global).await,
        Command::History => show(&session.history(), global).await,
        Command::Toggle => status::toggle(session, global).await,
        Command::Connect { server_id } => servers::connect(session, server_id, global).await,
        Command::Disconnect => status::disconnect(session, global).await,
        Command::Watch(args) => watch::handle(session, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}

/// Mount, wait for the first load, render. A failed load still renders
/// the degraded view and exits successfully.
async fn show<R>(screen: &Screen<R>, global: &GlobalOpts) -> Result<(), CliError>
where
    R: Reconcile,
    R::View: RenderView,
{
    let state = screen.settled().await;
    warn_if_degraded(&state, global);
    output::print_output(&state.view.render(global)?, global.quiet);
    Ok(())
}

pub(crate) fn warn_if_degraded<V>(state: &ScreenState<V>, global: &GlobalOpts) {
    if global.quiet {
        return;
    }
    if let Some(ref err) = state.last_error {
        if state.seq == 0 {
            eprintln!("warning: {err}; showing defaults");
        } else {
            eprintln!("warning: {err}; showing last known state");
        }
    }
}

/// Surface a failed mutation after the re-polled view has been shown.
pub(crate) fn finish(report: &ActionReport) -> Result<(), CliError> {
    match report.error() {
        Some(err) => Err(err.clone().into()),
        None => Ok(()),
    }
}
