// ── Session facade ──
//
// Ties a backend to a `SyncConfig`: vends pollers, mounts screens with the
// configured refresh policy, and routes actions so they re-poll the feed
// the acting screen is mounted on.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use smartvpn_api::{Client, HistoryEntry, SystemStatus, TransportConfig};

use crate::backend::Backend;
use crate::config::SyncConfig;
use crate::dispatch::{ActionReport, Dispatcher};
use crate::error::CoreError;
use crate::poller::Poller;
use crate::screen::Screen;
use crate::view::{History, Home, Reconcile, Rules, Servers};

// ── Session ──────────────────────────────────────────────────────

pub struct Session<B: Backend> {
    backend: Arc<B>,
    config: SyncConfig,
    shared: Option<Poller<SystemStatus>>,
}

impl Session<Client> {
    /// Session over the HTTP backend at `base_url`.
    pub fn from_url(
        base_url: Url,
        transport: &TransportConfig,
        config: SyncConfig,
    ) -> Result<Self, CoreError> {
        debug!(url = %base_url, "opening session");
        let client = Client::new(base_url, transport)?;
        Ok(Self::new(Arc::new(client), config))
    }
}

impl<B: Backend> Session<B> {
    pub fn new(backend: Arc<B>, config: SyncConfig) -> Self {
        let shared = config
            .shared_feed
            .then(|| status_poller(&backend, "status (shared)"));
        Self {
            backend,
            config,
            shared,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The shared status poller, or a fresh one per call.
    pub fn status_poller(&self) -> Poller<SystemStatus> {
        match &self.shared {
            Some(poller) => poller.clone(),
            None => status_poller(&self.backend, "status"),
        }
    }

    pub fn history_poller(&self) -> Poller<Vec<HistoryEntry>> {
        let backend = Arc::clone(&self.backend);
        Poller::new("history", move || {
            let backend = Arc::clone(&backend);
            async move { backend.history().await }
        })
    }

    // ── Screens ──────────────────────────────────────────────────

    pub fn home(&self) -> Screen<Home> {
        self.mount(self.status_poller())
    }

    pub fn servers(&self) -> Screen<Servers> {
        self.mount(self.status_poller())
    }

    pub fn rules(&self) -> Screen<Rules> {
        self.mount(self.status_poller())
    }

    pub fn history(&self) -> Screen<History> {
        self.mount(self.history_poller())
    }

    fn mount<R: Reconcile>(&self, poller: Poller<R::Input>) -> Screen<R> {
        Screen::mount(poller, self.config.policy_for(R::KIND))
    }

    // ── Actions ──────────────────────────────────────────────────

    /// A dispatcher that re-polls `poller` after each mutation.
    pub fn dispatcher(&self, poller: &Poller<SystemStatus>) -> Dispatcher<B> {
        Dispatcher::new(Arc::clone(&self.backend), poller.clone())
    }

    /// Home's toggle button. The screen's view reflects the re-poll on return.
    pub async fn toggle_connection(&self, home: &Screen<Home>) -> ActionReport {
        let report = self.dispatcher(home.poller()).toggle_connection().await;
        home.sync();
        report
    }

    /// Servers' row tap.
    pub async fn connect_to_server(
        &self,
        servers: &Screen<Servers>,
        server_id: impl Into<String>,
    ) -> ActionReport {
        let report = self
            .dispatcher(servers.poller())
            .connect_to_server(server_id)
            .await;
        servers.sync();
        report
    }

    /// Disconnect, re-polling `screen`'s feed.
    pub async fn disconnect<R>(&self, screen: &Screen<R>) -> ActionReport
    where
        R: Reconcile<Input = SystemStatus>,
    {
        let report = self.dispatcher(screen.poller()).disconnect().await;
        screen.sync();
        report
    }
}

fn status_poller<B: Backend>(backend: &Arc<B>, name: &'static str) -> Poller<SystemStatus> {
    let backend = Arc::clone(backend);
    Poller::new(name, move || {
        let backend = Arc::clone(&backend);
        async move { backend.status().await }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use smartvpn_api::HistoryKind;

    use super::*;
    use crate::dispatch::Action;
    use crate::poller::PollPhase;
    use crate::testing::{
        Call, FakeBackend, disconnected_with_servers, history_entry, settle, singapore,
    };

    #[tokio::test]
    async fn home_scenario_end_to_end() {
        let backend = FakeBackend::new(singapore());
        let session = Session::new(Arc::clone(&backend), SyncConfig::default());

        let home = session.home();
        let servers = session.servers();
        let home_state = home.settled().await;
        servers.settled().await;

        assert_eq!(home_state.view.status_label, "Connected");
        assert_eq!(home_state.view.server_line.as_deref(), Some("Server: Singapore"));
        assert_eq!(home_state.view.total_servers, 2);
        assert_eq!(home_state.view.active_rules, 3);
        let active: Vec<_> = servers
            .view()
            .rows
            .into_iter()
            .filter(|r| r.active)
            .map(|r| r.id)
            .collect();
        assert_eq!(active, vec!["sg-1".to_owned()]);
    }

    #[tokio::test]
    async fn toggle_reflects_repoll_on_return() {
        let backend = FakeBackend::new(disconnected_with_servers());
        let session = Session::new(Arc::clone(&backend), SyncConfig::default());
        let home = session.home();
        home.settled().await;

        let report = session.toggle_connection(&home).await;

        assert_eq!(
            report.action,
            Action::Connect {
                server_id: "sg-1".into()
            }
        );
        let state = home.state();
        assert_eq!(state.phase, PollPhase::Ready);
        assert_eq!(state.view.server_name, "Singapore");
        // View equals a fresh reconciliation of the re-polled snapshot.
        assert_eq!(
            state.view,
            Home::reconcile(home.poller().current().data.as_deref())
        );
    }

    #[tokio::test]
    async fn independent_screens_do_not_see_each_others_repolls() {
        let backend = FakeBackend::new(disconnected_with_servers());
        let session = Session::new(Arc::clone(&backend), SyncConfig::default());
        let home = session.home();
        let servers = session.servers();
        home.settled().await;
        servers.settled().await;

        session.connect_to_server(&servers, "us-1").await;
        settle().await;

        assert_eq!(servers.view().active().map(|r| r.id.as_str()), Some("us-1"));
        // Home is on its own poller and has not re-polled yet.
        assert!(!home.view().is_connected);
    }

    #[tokio::test]
    async fn shared_feed_propagates_across_screens() {
        let backend = FakeBackend::new(disconnected_with_servers());
        let config = SyncConfig {
            shared_feed: true,
            ..SyncConfig::default()
        };
        let session = Session::new(Arc::clone(&backend), config);
        let home = session.home();
        let servers = session.servers();
        home.settled().await;
        servers.settled().await;

        session.connect_to_server(&servers, "us-1").await;
        settle().await;

        assert!(home.view().is_connected);
        assert_eq!(home.view().server_name, "New York");
        assert_eq!(session.status_poller().lease_count(), 2);
    }

    #[tokio::test]
    async fn disconnect_from_servers_screen() {
        let backend = FakeBackend::new(singapore());
        let session = Session::new(Arc::clone(&backend), SyncConfig::default());
        let servers = session.servers();
        servers.settled().await;

        let report = session.disconnect(&servers).await;

        assert!(report.is_success());
        assert!(servers.view().active().is_none());
        assert_eq!(
            backend.calls(),
            vec![Call::Status, Call::Disconnect, Call::Status]
        );
    }

    #[tokio::test]
    async fn history_screen_polls_history_endpoint() {
        let backend = FakeBackend::new(singapore());
        backend.set_history(vec![
            history_entry("h2", HistoryKind::Disconnect),
            history_entry("h1", HistoryKind::Connect),
        ]);
        let session = Session::new(Arc::clone(&backend), SyncConfig::default());

        let history = session.history();
        let state = history.settled().await;

        let glyphs: Vec<_> = state.view.rows.iter().map(|r| (r.id.as_str(), r.glyph)).collect();
        assert_eq!(glyphs, vec![("h2", '↓'), ("h1", '↑')]);
        assert_eq!(backend.calls(), vec![Call::History]);
    }

    #[tokio::test(start_paused = true)]
    async fn one_shot_screens_do_not_tick() {
        let backend = FakeBackend::new(singapore());
        let session = Session::new(Arc::clone(&backend), SyncConfig::default());
        let _servers = session.servers();
        let _rules = session.rules();
        settle().await;

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(backend.status_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn home_ticks_every_interval() {
        let backend = FakeBackend::new(singapore());
        let session = Session::new(Arc::clone(&backend), SyncConfig::default());
        let home = session.home();
        settle().await;

        tokio::time::sleep(Duration::from_millis(9_100)).await;
        assert_eq!(backend.status_calls(), 4);

        drop(home);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(backend.status_calls(), 4);
    }
}
