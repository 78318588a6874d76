// ── Backend seam ──
//
// Everything the core needs from the outside world. `smartvpn_api::Client`
// is the production implementation; tests drive the core with a scripted
// fake.

use std::future::Future;

use smartvpn_api::{Ack, Client, HistoryEntry, SystemStatus};

use crate::error::CoreError;

/// The four backend operations the synchronization core uses.
pub trait Backend: Send + Sync + 'static {
    /// `GET /status`
    fn status(&self) -> impl Future<Output = Result<SystemStatus, CoreError>> + Send;

    /// `GET /history`
    fn history(&self) -> impl Future<Output = Result<Vec<HistoryEntry>, CoreError>> + Send;

    /// `POST /connection/connect`
    fn connect(&self, server_id: &str) -> impl Future<Output = Result<Ack, CoreError>> + Send;

    /// `POST /connection/disconnect`
    fn disconnect(&self) -> impl Future<Output = Result<Ack, CoreError>> + Send;
}

impl Backend for Client {
    async fn status(&self) -> Result<SystemStatus, CoreError> {
        Ok(self.get_status().await?)
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, CoreError> {
        Ok(self.get_history().await?)
    }

    async fn connect(&self, server_id: &str) -> Result<Ack, CoreError> {
        Ok(Client::connect(self, server_id).await?)
    }

    async fn disconnect(&self) -> Result<Ack, CoreError> {
        Ok(Client::disconnect(self).await?)
    }
}
