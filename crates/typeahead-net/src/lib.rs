//! Networking for Typeahead.
//!
//! This crate provides the HTTP layer suggestion sources are built on. See the
//! [`http`] module for the client, request builder and response types.
//!
//! Requests carry no timeout by default: a suggestion request lives until it
//! settles or until the widget supersedes it by cancelling its token.

pub mod error;
pub mod http;

pub use error::{NetworkError, Result};
pub use http::{HttpClient, HttpClientBuilder, HttpClientConfig, HttpRequest, HttpRequestBuilder, HttpResponse};
