// Read endpoints: full status snapshot and connection history.

use tracing::debug;

use crate::client::Client;
use crate::error::Error;
use crate::models::{HistoryEntry, SystemStatus};

impl Client {
    /// Fetch the full system snapshot.
    ///
    /// `GET /status`
    pub async fn get_status(&self) -> Result<SystemStatus, Error> {
        debug!("fetching status");
        self.get("status").await
    }

    /// Fetch the connection history, in backend order.
    ///
    /// `GET /history`
    pub async fn get_history(&self) -> Result<Vec<HistoryEntry>, Error> {
        debug!("fetching history");
        self.get("history").await
    }
}
