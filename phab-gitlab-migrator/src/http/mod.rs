//! HTTP plumbing shared by the Conduit and GitLab clients.

mod error;

pub use error::{Service, UpstreamError};

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Longest response body excerpt kept in a [`UpstreamError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Builds the HTTP client used for every request of a run.
///
/// Without a timeout a stalled request blocks the run until the remote end
/// gives up.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn build_client(timeout: Option<Duration>) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// Sends a prepared request, mapping transport failures and non-2xx statuses.
pub(crate) async fn send(
    service: Service,
    request: reqwest::RequestBuilder,
) -> Result<Response, UpstreamError> {
    let response = request
        .send()
        .await
        .map_err(|source| UpstreamError::Transport { service, source })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(UpstreamError::Status {
        service,
        status: status.as_u16(),
        body: excerpt(&body),
    })
}

/// Reads a response body and decodes it as JSON.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    service: Service,
    response: Response,
) -> Result<T, UpstreamError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|source| UpstreamError::Transport { service, source })?;
    serde_json::from_slice(&bytes).map_err(|source| UpstreamError::Decode { service, source })
}

/// Reads a response body as raw bytes.
pub(crate) async fn read_bytes(
    service: Service,
    response: Response,
) -> Result<Vec<u8>, UpstreamError> {
    response
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|source| UpstreamError::Transport { service, source })
}

/// Joins an API base URL and an endpoint path with exactly one slash.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn excerpt(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
