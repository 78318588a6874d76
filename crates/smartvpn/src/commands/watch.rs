//! `watch`: keep one screen mounted and print it after every refresh.
//!
//! The watched screen always refreshes periodically, even if the config
//! lists it as one-shot; otherwise there would be nothing to watch.

use std::time::Duration;

use tokio_stream::StreamExt;
use tracing::debug;

use smartvpn_core::{
    Client, DEFAULT_POLL_INTERVAL, History, Home, PollPhase, Poller, Reconcile, RefreshPolicy,
    Rules, Screen, ScreenKind, Servers, Session,
};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::{RenderView, warn_if_degraded};

pub async fn handle(
    session: &Session<Client>,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let kind: ScreenKind = args
        .screen
        .parse()
        .map_err(|_| CliError::UnknownScreen {
            name: args.screen.clone(),
        })?;
    let policy = watch_policy(session.config().poll_interval);
    debug!(screen = %kind, ?policy, count = ?args.count, "watching");

    match kind {
        ScreenKind::Home => run::<Home>(session.status_poller(), policy, args.count, global).await,
        ScreenKind::Servers => {
            run::<Servers>(session.status_poller(), policy, args.count, global).await
        }
        ScreenKind::Rules => run::<Rules>(session.status_poller(), policy, args.count, global).await,
        ScreenKind::History => {
            run::<History>(session.history_poller(), policy, args.count, global).await
        }
    }
}

/// Configured interval, or the default one when periodic refresh is off.
fn watch_policy(interval: Duration) -> RefreshPolicy {
    if interval.is_zero() {
        RefreshPolicy::Periodic(DEFAULT_POLL_INTERVAL)
    } else {
        RefreshPolicy::Periodic(interval)
    }
}

async fn run<R>(
    poller: Poller<R::Input>,
    policy: RefreshPolicy,
    count: Option<usize>,
    global: &GlobalOpts,
) -> Result<(), CliError>
where
    R: Reconcile,
    R::View: RenderView,
{
    let mut screen = Screen::<R>::mount(poller, policy);
    let mut updates = screen.updates();
    let mut printed = 0usize;
    let separate = matches!(global.output, OutputFormat::Table);

    loop {
        let state = tokio::select! {
            next = updates.next() => match next {
                Some(state) => state,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        };
        // Loading/Refreshing are transitional; print each landed poll once.
        if state.phase != PollPhase::Ready {
            continue;
        }

        warn_if_degraded(&state, global);
        if separate && printed > 0 && !global.quiet {
            println!();
        }
        output::print_output(&state.view.render(global)?, global.quiet);

        printed += 1;
        if count.is_some_and(|n| printed >= n) {
            break;
        }
    }

    screen.unmount();
    Ok(())
}
