// ── Poller ──
//
// Lease-counted polling loop that publishes a `Feed<T>` through a `watch`
// channel. Every fetch is tagged with a monotonic sequence number, and only
// a response carrying the latest issued sequence may write the feed. The
// check and the write happen under the watch channel's lock.

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;

// ── Policy & phase ───────────────────────────────────────────────

/// How a lease wants its poller to refresh after the mount fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Re-fetch on a fixed period while the lease is held.
    Periodic(Duration),
    /// Fetch once on mount; only forced polls afterward.
    OneShot,
}

impl RefreshPolicy {
    /// A zero period cannot drive `tokio::time::interval`; treat it as one-shot.
    fn period(self) -> Option<Duration> {
        match self {
            Self::Periodic(period) if !period.is_zero() => Some(period),
            _ => None,
        }
    }
}

/// Lifecycle of a feed.
///
/// `Idle → Loading → Ready` on first load, `Ready → Refreshing → Ready`
/// afterwards. A failed fetch also lands in `Ready`, keeping whatever data
/// was there before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PollPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Refreshing,
}

// ── Feed ─────────────────────────────────────────────────────────

/// The published state of a poller.
#[derive(Debug)]
pub struct Feed<T> {
    pub phase: PollPhase,
    /// Last successfully fetched value. Replaced wholesale, never merged.
    pub data: Option<Arc<T>>,
    /// Sequence number of the request that produced `data` (0 = none yet).
    pub seq: u64,
    /// Failure of the most recent applied poll, cleared on the next success.
    pub last_error: Option<CoreError>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for Feed<T> {
    fn default() -> Self {
        Self {
            phase: PollPhase::Idle,
            data: None,
            seq: 0,
            last_error: None,
            updated_at: None,
        }
    }
}

impl<T> Clone for Feed<T> {
    fn clone(&self) -> Self {
        Self {
            phase: self.phase,
            data: self.data.clone(),
            seq: self.seq,
            last_error: self.last_error.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// What happened to a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Fresh data was written to the feed.
    Applied { seq: u64 },
    /// The fetch failed; the feed kept its previous data.
    Failed { seq: u64, error: CoreError },
    /// A newer poll was issued while this one was in flight; discarded.
    Stale { seq: u64 },
    /// A timer tick fired while another fetch was outstanding.
    Skipped,
    /// Nobody holds a lease; nothing was fetched or applied.
    Inert,
}

impl PollOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Mount,
    Tick,
    Forced,
}

// ── Poller ───────────────────────────────────────────────────────

type FetchFn<T> = dyn Fn() -> BoxFuture<'static, Result<T, CoreError>> + Send + Sync;

/// A polled remote resource.
///
/// Cheaply cloneable; clones share one feed, one sequence counter and one
/// timer. Screens hold a [`Lease`] while mounted: the first periodic lease
/// arms the timer, the last one disarms it, and once no lease remains
/// every in-flight response is dropped on arrival.
pub struct Poller<T> {
    inner: Arc<PollerInner<T>>,
}

impl<T> Clone for Poller<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct PollerInner<T> {
    name: &'static str,
    fetch: Box<FetchFn<T>>,
    feed: watch::Sender<Feed<T>>,
    issued: AtomicU64,
    in_flight: AtomicUsize,
    leases: Mutex<LeaseBook>,
}

#[derive(Default)]
struct LeaseBook {
    mounted: usize,
    periodic: usize,
    timer: Option<CancellationToken>,
}

impl<T> Poller<T> {
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Snapshot of the current feed.
    pub fn current(&self) -> Feed<T> {
        self.inner.feed.borrow().clone()
    }

    /// Subscribe to feed changes.
    pub fn subscribe(&self) -> watch::Receiver<Feed<T>> {
        self.inner.feed.subscribe()
    }

    /// Whether at least one lease is held.
    pub fn is_mounted(&self) -> bool {
        self.book().mounted > 0
    }

    pub fn lease_count(&self) -> usize {
        self.book().mounted
    }

    pub fn is_timer_armed(&self) -> bool {
        self.book().timer.is_some()
    }

    /// Highest sequence number issued so far.
    pub fn issued(&self) -> u64 {
        self.inner.issued.load(Ordering::SeqCst)
    }

    fn book(&self) -> MutexGuard<'_, LeaseBook> {
        self.inner
            .leases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn release_lease(&self, periodic: bool) {
        let mut book = self.book();
        book.mounted = book.mounted.saturating_sub(1);
        if periodic {
            book.periodic = book.periodic.saturating_sub(1);
            if book.periodic == 0 {
                if let Some(timer) = book.timer.take() {
                    timer.cancel();
                }
            }
        }
        debug!(poller = self.inner.name, leases = book.mounted, "lease released");
    }
}

impl<T: Send + Sync + 'static> Poller<T> {
    /// Create a poller around an async fetch function.
    pub fn new<F, Fut>(name: &'static str, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        let (feed, _) = watch::channel(Feed::default());
        Self {
            inner: Arc::new(PollerInner {
                name,
                fetch: Box::new(move || fetch().boxed()),
                feed,
                issued: AtomicU64::new(0),
                in_flight: AtomicUsize::new(0),
                leases: Mutex::new(LeaseBook::default()),
            }),
        }
    }

    /// Take a lease: issue the mount fetch immediately and, for a periodic
    /// policy, arm the timer if it is not already running.
    ///
    /// With several periodic leases the first one's period wins.
    /// Must be called from within a tokio runtime.
    pub fn acquire(&self, policy: RefreshPolicy) -> Lease<T> {
        let period = policy.period();
        {
            let mut book = self.book();
            book.mounted += 1;
            if let Some(period) = period {
                book.periodic += 1;
                if book.timer.is_none() {
                    let token = CancellationToken::new();
                    tokio::spawn(timer_task(self.clone(), period, token.clone()));
                    book.timer = Some(token);
                }
            }
            debug!(poller = self.inner.name, ?policy, leases = book.mounted, "lease acquired");
        }

        let poller = self.clone();
        tokio::spawn(async move {
            poller.poll(Trigger::Mount).await;
        });

        Lease {
            poller: self.clone(),
            periodic: period.is_some(),
            released: false,
        }
    }

    /// Forced poll: always issues a request, superseding anything in flight.
    pub async fn refresh(&self) -> PollOutcome {
        self.poll(Trigger::Forced).await
    }

    async fn poll(&self, trigger: Trigger) -> PollOutcome {
        let inner = &self.inner;
        if !self.is_mounted() {
            return PollOutcome::Inert;
        }
        if trigger == Trigger::Tick && inner.in_flight.load(Ordering::SeqCst) > 0 {
            debug!(poller = inner.name, "previous fetch still in flight, skipping tick");
            return PollOutcome::Skipped;
        }

        let seq = inner.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let result = {
            let _in_flight = InFlight::enter(&inner.in_flight);
            inner.feed.send_modify(|feed| {
                feed.phase = if feed.data.is_some() {
                    PollPhase::Refreshing
                } else {
                    PollPhase::Loading
                };
            });
            debug!(poller = inner.name, seq, ?trigger, "polling");
            (inner.fetch)().await
        };

        if !self.is_mounted() {
            debug!(poller = inner.name, seq, "no lease left, discarding response");
            return PollOutcome::Inert;
        }
        self.apply(seq, result)
    }

    fn apply(&self, seq: u64, result: Result<T, CoreError>) -> PollOutcome {
        let inner = &self.inner;
        let mut outcome = PollOutcome::Stale { seq };

        inner.feed.send_if_modified(|feed| {
            if inner.issued.load(Ordering::SeqCst) != seq {
                return false;
            }
            feed.phase = PollPhase::Ready;
            match result {
                Ok(data) => {
                    feed.data = Some(Arc::new(data));
                    feed.seq = seq;
                    feed.last_error = None;
                    feed.updated_at = Some(Utc::now());
                    outcome = PollOutcome::Applied { seq };
                }
                Err(error) => {
                    warn!(poller = inner.name, seq, error = %error, "poll failed, keeping previous data");
                    feed.last_error = Some(error.clone());
                    outcome = PollOutcome::Failed { seq, error };
                }
            }
            true
        });

        if let PollOutcome::Stale { seq } = outcome {
            debug!(poller = inner.name, seq, latest = self.issued(), "discarding stale response");
        }
        outcome
    }
}

/// Counts an outstanding fetch; decrements even if the poll future is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Periodically poll until the last periodic lease cancels `cancel`.
async fn timer_task<T: Send + Sync + 'static>(
    poller: Poller<T>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await; // consume the immediate first tick; the mount fetch covers it

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                poller.poll(Trigger::Tick).await;
            }
        }
    }
    debug!(poller = poller.name(), "timer stopped");
}

// ── Lease ────────────────────────────────────────────────────────

/// A mounted screen's claim on a [`Poller`]. Released on drop.
pub struct Lease<T> {
    poller: Poller<T>,
    periodic: bool,
    released: bool,
}

impl<T> Lease<T> {
    pub fn poller(&self) -> &Poller<T> {
        &self.poller
    }

    /// Release explicitly (same as dropping).
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.poller.release_lease(self.periodic);
        }
    }
}

impl<T> Drop for Lease<T> {
    fn drop(&mut self) {
        self.release_once();
    }
}
