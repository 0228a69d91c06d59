//! HTTP client for Typeahead.
//!
//! A small GET-oriented client for suggestion endpoints: relative URLs
//! resolve against a configured base, default headers are sent with every
//! request, and in-flight requests can be abandoned through a
//! [`CancellationToken`](typeahead_core::CancellationToken).
//!
//! # Example
//!
//! ```ignore
//! use typeahead_core::CancellationToken;
//! use typeahead_net::http::HttpClient;
//!
//! let client = HttpClient::builder()
//!     .base_url(url::Url::parse("https://escola.example/")?)
//!     .build()?;
//!
//! let token = CancellationToken::new();
//! let response = client
//!     .get("/alunos/autocomplete/?q=jo")
//!     .send_cancellable(&token)
//!     .await?;
//! println!("Status: {}", response.status());
//! ```

mod client;
mod request;
mod response;

pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig};
pub use request::{HttpRequest, HttpRequestBuilder};
pub use response::HttpResponse;
