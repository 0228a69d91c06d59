//! Where suggestions come from.

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::Value;
use typeahead_core::CancellationToken;
use typeahead_core::logging::targets;
use typeahead_net::HttpClient;

use crate::error::FetchError;
use crate::suggestion::{Suggestion, normalize_results};
use crate::template::encode_component;

/// A backend that answers suggestion queries.
///
/// Implementations should stop work once `cancel` fires, but are not required
/// to: the lifecycle discards the result of any superseded call regardless.
pub trait SuggestionSource: Send + Sync {
    /// Fetch suggestions for `query` from `endpoint`.
    fn fetch<'a>(
        &'a self,
        endpoint: &'a str,
        query: &'a str,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Vec<Suggestion>, FetchError>>;
}

/// Append the `q` parameter to an endpoint, joining with `&` when the
/// endpoint already has a query string.
pub fn build_request_url(endpoint: &str, query: &str) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{separator}q={}", encode_component(query))
}

/// Suggestions fetched from a JSON endpoint over HTTP.
///
/// The marker header, base URL and timeouts come from the [`HttpClient`]
/// (see [`TypeaheadSettings::http_client`](crate::TypeaheadSettings::http_client)).
#[derive(Clone, Debug)]
pub struct HttpSuggestionSource {
    client: HttpClient,
}

impl HttpSuggestionSource {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    async fn fetch_json(
        &self,
        endpoint: &str,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Suggestion>, FetchError> {
        let url = build_request_url(endpoint, query);
        let response = self.client.get(&url).send_cancellable(cancel).await?;

        if !response.is_success() {
            tracing::debug!(
                target: targets::LIFECYCLE,
                status = response.status(),
                %url,
                "non-success status, no suggestions"
            );
            return Ok(Vec::new());
        }

        let body = response.bytes().await?;
        let body: Value = serde_json::from_slice(&body)?;
        Ok(normalize_results(&body))
    }
}

impl SuggestionSource for HttpSuggestionSource {
    fn fetch<'a>(
        &'a self,
        endpoint: &'a str,
        query: &'a str,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Vec<Suggestion>, FetchError>> {
        self.fetch_json(endpoint, query, cancel).boxed()
    }
}
