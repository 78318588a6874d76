// Connection mutations.
//
// The client never validates a server id before sending it; an unknown id
// comes back from the backend as `Error::Rejected` or `Error::Http`.

use tracing::debug;

use crate::client::Client;
use crate::error::Error;
use crate::models::{Ack, ConnectRequest};

impl Client {
    /// Ask the backend to connect to `server_id`.
    ///
    /// `POST /connection/connect` with `{"serverId": "..."}`
    pub async fn connect(&self, server_id: &str) -> Result<Ack, Error> {
        debug!(server_id, "connecting");
        self.post("connection/connect", Some(&ConnectRequest { server_id }))
            .await
    }

    /// Tear down the current connection.
    ///
    /// `POST /connection/disconnect` (no body)
    pub async fn disconnect(&self) -> Result<Ack, Error> {
        debug!("disconnecting");
        self.post::<()>("connection/disconnect", None).await
    }
}
