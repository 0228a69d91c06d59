//! HTTP request types and builder.

use std::time::Duration;

use typeahead_core::CancellationToken;
use typeahead_core::logging::targets;

use super::client::HttpClient;
use super::response::HttpResponse;
use crate::error::{NetworkError, Result};

/// A built HTTP GET request ready to be sent.
#[derive(Debug)]
pub struct HttpRequest {
    /// The request URL, possibly relative to the client's base URL.
    pub url: String,
    /// Request headers.
    pub headers: http::HeaderMap,
    /// Request timeout override.
    pub timeout: Option<Duration>,
}

/// Builder for constructing HTTP requests.
pub struct HttpRequestBuilder {
    client: HttpClient,
    url: String,
    headers: http::HeaderMap,
    timeout: Option<Duration>,
}

impl HttpRequestBuilder {
    pub(crate) fn new(client: HttpClient, url: String) -> Self {
        Self {
            client,
            url,
            headers: http::HeaderMap::new(),
            timeout: None,
        }
    }

    /// Add a header to the request.
    ///
    /// Invalid names or values are dropped.
    pub fn header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Self {
        if let (Ok(name), Ok(value)) = (name.try_into(), value.try_into()) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set a timeout for this specific request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the request without sending it.
    pub fn build(self) -> HttpRequest {
        HttpRequest {
            url: self.url,
            headers: self.headers,
            timeout: self.timeout,
        }
    }

    /// Send the request and wait for the response.
    pub async fn send(self) -> Result<HttpResponse> {
        let client = self.client.clone();
        let request = self.build();

        let url = client.resolve(&request.url)?;
        tracing::debug!(target: targets::HTTP, %url, "GET");

        let mut req_builder = client.reqwest_client().get(url);
        for (name, value) in request.headers.iter() {
            req_builder = req_builder.header(name, value);
        }
        if let Some(timeout) = request.timeout {
            req_builder = req_builder.timeout(timeout);
        }

        let response = req_builder.send().await?;
        tracing::trace!(
            target: targets::HTTP,
            status = response.status().as_u16(),
            "response headers received"
        );
        Ok(HttpResponse::from_reqwest(response))
    }

    /// Send the request, abandoning it as soon as `token` is cancelled.
    ///
    /// Dropping the in-flight future closes the underlying connection.
    pub async fn send_cancellable(self, token: &CancellationToken) -> Result<HttpResponse> {
        if token.is_cancelled() {
            return Err(NetworkError::Cancelled);
        }
        tokio::select! {
            result = self.send() => result,
            _ = token.cancelled() => {
                tracing::trace!(target: targets::HTTP, "request cancelled in flight");
                Err(NetworkError::Cancelled)
            }
        }
    }
}
