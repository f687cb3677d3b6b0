//! Authenticated provider transport.
//!
//! Wraps an [`HttpClient`] and re-issues a request exactly once when the
//! provider answers 401 or 403. No credentials are refreshed between the two
//! attempts; the second request is byte-identical to the first.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn, Instrument};

use crate::config::ConfigSource;
use crate::http_client::{HttpClient, HttpError, HttpRequest};

/// Statuses that trigger the single re-issue.
pub const RETRIABLE_AUTH_STATUS_CODES: [u16; 2] = [401, 403];

/// Attribute map attached to the tracing span of each provider request.
pub type RequestTags = BTreeMap<String, String>;

/// Provider-facing transport: base URL, credentials, auth retry and
/// non-success classification.
#[derive(Clone)]
pub struct AuthenticatedTransport {
    http_client: Arc<dyn HttpClient>,
    config: Arc<dyn ConfigSource>,
}

impl AuthenticatedTransport {
    pub fn new(http_client: Arc<dyn HttpClient>, config: Arc<dyn ConfigSource>) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// GETs `path_and_query` relative to the configured base URL and returns
    /// the response body.
    ///
    /// # Errors
    ///
    /// [`HttpError`] with status and body when the (possibly retried) response
    /// is non-success; [`HttpError`] without status for network failures.
    pub async fn fetch(&self, path_and_query: &str, tags: &RequestTags) -> Result<String, HttpError> {
        let config = self.config.snapshot();
        let url = join_url(&config.base_url, path_and_query);
        let request = HttpRequest::get(&url)
            .with_header("accept", "application/json")
            .with_auth(&config.auth)
            .with_timeout_ms(config.timeout_ms);

        let span = tracing::info_span!("provider_request", url = %url, tags = ?tags);
        async move {
            info!("requesting provider data");
            let body = self.get_with_auth_retry(request).await?;
            debug!(body = %body, "received provider data");
            Ok(body)
        }
        .instrument(span)
        .await
    }

    async fn get_with_auth_retry(&self, request: HttpRequest) -> Result<String, HttpError> {
        let mut response = self.http_client.execute(request.clone()).await?;

        if RETRIABLE_AUTH_STATUS_CODES.contains(&response.status) {
            warn!(
                status = response.status,
                "provider rejected credentials; re-issuing request once"
            );
            response = self.http_client.execute(request).await?;
        }

        if !response.is_success() {
            error!(
                status = response.status,
                body = %response.body,
                "provider returned non-success status"
            );
            let message = format!("error getting data from provider: status {}", response.status);
            return Err(HttpError::from_response(message, response));
        }

        Ok(response.body)
    }
}

/// Joins a base URL and a relative path, tolerating slashes on either side.
/// A path that starts with `?` is appended directly.
fn join_url(base_url: &str, path_and_query: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path_and_query.is_empty() {
        return base.to_owned();
    }
    if path_and_query.starts_with('?') {
        return format!("{base}{path_and_query}");
    }
    format!("{base}/{}", path_and_query.trim_start_matches('/'))
}
