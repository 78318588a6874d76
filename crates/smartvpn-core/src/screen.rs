// ── Screens ──
//
// A mounted screen holds one poller lease and a reconciled, screen-local
// view state. A forwarder task re-reconciles on every feed change; nothing
// is published once the screen is unmounted.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::CoreError;
use crate::poller::{Feed, Lease, PollOutcome, PollPhase, Poller, RefreshPolicy};
use crate::view::Reconcile;

// ── ScreenKind ───────────────────────────────────────────────────────

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ScreenKind {
    Home,
    Servers,
    Rules,
    History,
}

impl ScreenKind {
    pub const ALL: [Self; 4] = [Self::Home, Self::Servers, Self::Rules, Self::History];

    /// Title shown above the screen.
    pub fn label(self) -> &'static str {
        match self {
            Self::Home => "Smart VPN",
            Self::Servers => "VPN Servers",
            Self::Rules => "Routing Rules",
            Self::History => "Connection History",
        }
    }
}

// ── ScreenState ──────────────────────────────────────────────────────

/// Screen-local state, derived wholesale from the poller feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenState<V> {
    pub phase: PollPhase,
    pub view: V,
    pub last_error: Option<CoreError>,
    /// Sequence of the snapshot `view` was reconciled from (0 = none).
    pub seq: u64,
    pub mounted: bool,
}

impl<V> ScreenState<V> {
    /// No snapshot has been applied yet, or the latest poll failed.
    pub fn is_degraded(&self) -> bool {
        self.seq == 0 || self.last_error.is_some()
    }
}

// ── Screen ───────────────────────────────────────────────────────────

pub struct Screen<R: Reconcile> {
    poller: Poller<R::Input>,
    lease: Option<Lease<R::Input>>,
    state: Arc<watch::Sender<ScreenState<R::View>>>,
    cancel: CancellationToken,
}

impl<R: Reconcile> Screen<R> {
    /// Mount on `poller`: take a lease (which issues the mount fetch) and
    /// start forwarding feed changes into this screen's state.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(poller: Poller<R::Input>, policy: RefreshPolicy) -> Self {
        // Subscribe before the lease goes out so the mount fetch is not missed.
        let mut feed = poller.subscribe();
        let initial = reconciled::<R>(&feed.borrow_and_update());
        let (state, _) = watch::channel(initial);
        let state = Arc::new(state);

        let lease = poller.acquire(policy);
        let cancel = CancellationToken::new();
        tokio::spawn(forward::<R>(feed, Arc::clone(&state), cancel.clone()));
        debug!(screen = %R::KIND, poller = poller.name(), ?policy, "screen mounted");

        Self {
            poller,
            lease: Some(lease),
            state,
            cancel,
        }
    }

    pub fn kind(&self) -> ScreenKind {
        R::KIND
    }

    pub fn poller(&self) -> &Poller<R::Input> {
        &self.poller
    }

    pub fn is_mounted(&self) -> bool {
        self.state.borrow().mounted
    }

    pub fn state(&self) -> ScreenState<R::View> {
        self.state.borrow().clone()
    }

    pub fn view(&self) -> R::View {
        self.state.borrow().view.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScreenState<R::View>> {
        self.state.subscribe()
    }

    /// Stream of state changes, starting with the current state.
    pub fn updates(&self) -> WatchStream<ScreenState<R::View>> {
        WatchStream::new(self.state.subscribe())
    }

    /// Wait until the screen reaches `Ready` (after success or failure).
    pub async fn settled(&self) -> ScreenState<R::View> {
        let mut rx = self.state.subscribe();
        match rx.wait_for(|s| s.phase == PollPhase::Ready || !s.mounted).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    /// Forced poll through this screen's poller. The resulting feed is
    /// reconciled before this returns.
    pub async fn refresh(&self) -> PollOutcome {
        if !self.is_mounted() {
            return PollOutcome::Inert;
        }
        let outcome = self.poller.refresh().await;
        self.sync();
        outcome
    }

    /// Reconcile the poller's current feed into this screen now instead of
    /// waiting for the forwarder.
    pub fn sync(&self) {
        publish::<R>(&self.state, &self.poller.current());
    }

    /// Stop forwarding and release the lease. Idempotent.
    pub fn unmount(&mut self) {
        // Wakes `settled()` waiters; only the first call counts as a change.
        self.state
            .send_if_modified(|s| std::mem::replace(&mut s.mounted, false));
        self.cancel.cancel();
        if let Some(lease) = self.lease.take() {
            lease.release();
            debug!(screen = %R::KIND, "screen unmounted");
        }
    }
}

impl<R: Reconcile> Drop for Screen<R> {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn reconciled<R: Reconcile>(feed: &Feed<R::Input>) -> ScreenState<R::View> {
    ScreenState {
        phase: feed.phase,
        view: R::reconcile(feed.data.as_deref()),
        last_error: feed.last_error.clone(),
        seq: feed.seq,
        mounted: true,
    }
}

/// Write `feed` into `state` unless the screen was unmounted. The mounted
/// check and the write share the watch lock.
fn publish<R: Reconcile>(state: &watch::Sender<ScreenState<R::View>>, feed: &Feed<R::Input>) {
    state.send_if_modified(|current| {
        if !current.mounted {
            return false;
        }
        let next = reconciled::<R>(feed);
        if *current == next {
            return false;
        }
        *current = next;
        true
    });
}

async fn forward<R: Reconcile>(
    mut feed: watch::Receiver<Feed<R::Input>>,
    state: Arc<watch::Sender<ScreenState<R::View>>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = feed.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = feed.borrow_and_update().clone();
                publish::<R>(&state, &snapshot);
            }
        }
    }
}
