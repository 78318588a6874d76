// Backend HTTP client
//
// Wraps `reqwest::Client` with base-path URL construction and envelope
// unwrapping. Endpoint methods live in `status.rs` and `connection.rs`
// so this module stays focused on transport mechanics.

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::Envelope;
use crate::transport::TransportConfig;

/// Longest body prefix quoted in error messages.
const BODY_PREVIEW_CHARS: usize = 200;

/// Raw HTTP client for the Smart VPN backend.
///
/// All endpoint paths are resolved below `base_url` (e.g.
/// `http://localhost:3001/api`). Every method checks the envelope's
/// `success` flag and returns the unwrapped `data`.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
}

impl Client {
    /// Create a client for `base_url` from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path below the base URL: `{base}/{path}`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Issue an arbitrary request and return the envelope's `data` as raw
    /// JSON (`null` when the backend sent none).
    ///
    /// `body`, when present, is serialized as JSON with the matching
    /// content type.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, Error> {
        let envelope: Envelope<serde_json::Value> = self.send(method, path, body).await?;
        Ok(envelope.data.unwrap_or(serde_json::Value::Null))
    }

    /// Send a GET request and unwrap the envelope. `data` is required.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let envelope: Envelope<T> = self.send::<T, ()>(Method::GET, path, None).await?;
        envelope.data.ok_or_else(|| Error::Deserialization {
            message: format!("response from /{path} carried no data"),
            body: String::new(),
        })
    }

    /// Send a POST request with an optional JSON body. Acknowledgements are
    /// backend-defined, so a missing `data` becomes `null`.
    pub(crate) async fn post<B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<serde_json::Value, Error> {
        let envelope: Envelope<serde_json::Value> = self.send(Method::POST, path, body).await?;
        Ok(envelope.data.unwrap_or(serde_json::Value::Null))
    }

    async fn send<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Envelope<T>, Error> {
        let url = self.url(path)?;
        debug!("{method} {url}");

        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let resp = builder.send().await.map_err(Error::Transport)?;

        parse_envelope(resp).await
    }
}

/// Parse the `{ success, data }` envelope.
///
/// Non-2xx statuses become `Error::Http` (quoting the backend's own error
/// text when the body is an envelope), undecodable bodies become
/// `Error::Deserialization`, and `success: false` becomes `Error::Rejected`.
async fn parse_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Envelope<T>, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;
    trace!(status = status.as_u16(), body = %preview(&body), "response");

    if !status.is_success() {
        let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
            .ok()
            .and_then(|mut env| env.failure_message())
            .unwrap_or_else(|| preview(&body));
        return Err(Error::Http {
            status: status.as_u16(),
            message,
        });
    }

    let mut envelope: Envelope<T> =
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })?;

    if !envelope.success {
        return Err(Error::Rejected {
            message: envelope
                .failure_message()
                .unwrap_or_else(|| "backend reported success: false".into()),
        });
    }

    Ok(envelope)
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> Client {
        Client::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn url_joins_below_base_path() {
        let c = client("http://localhost:3001/api");
        assert_eq!(
            c.url("status").unwrap().as_str(),
            "http://localhost:3001/api/status"
        );
    }

    #[test]
    fn url_tolerates_redundant_slashes() {
        let c = client("http://localhost:3001/api/");
        assert_eq!(
            c.url("/connection/connect").unwrap().as_str(),
            "http://localhost:3001/api/connection/connect"
        );
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let body = "é".repeat(300);
        assert_eq!(preview(&body).chars().count(), BODY_PREVIEW_CHARS);
    }
}
