// ── Synchronization configuration ──
//
// How screens refresh. Core never reads config files; the CLI builds a
// `SyncConfig` from its own configuration layer and hands it in.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::poller::RefreshPolicy;
use crate::screen::ScreenKind;

/// Refresh period for periodic screens.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Period for screens not listed in `one_shot_screens`. Zero disables
    /// periodic refresh everywhere.
    pub poll_interval: Duration,
    /// Screens that fetch once on mount and only re-poll when forced.
    pub one_shot_screens: BTreeSet<ScreenKind>,
    /// All status screens of a session lease one poller instead of one each.
    pub shared_feed: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            one_shot_screens: BTreeSet::from([
                ScreenKind::Servers,
                ScreenKind::Rules,
                ScreenKind::History,
            ]),
            shared_feed: false,
        }
    }
}

impl SyncConfig {
    pub fn policy_for(&self, kind: ScreenKind) -> RefreshPolicy {
        if self.poll_interval.is_zero() || self.one_shot_screens.contains(&kind) {
            RefreshPolicy::OneShot
        } else {
            RefreshPolicy::Periodic(self.poll_interval)
        }
    }

    /// Every screen periodic at `interval`.
    pub fn all_periodic(interval: Duration) -> Self {
        Self {
            poll_interval: interval,
            one_shot_screens: BTreeSet::new(),
            ..Self::default()
        }
    }
}
