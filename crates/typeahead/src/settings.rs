//! Page-wide widget settings.
//!
//! Per-input options live on the input elements themselves (see
//! [`WidgetConfig`](crate::WidgetConfig)); everything shared by all widgets on
//! a page lives here and is usually loaded from TOML:
//!
//! ```toml
//! base_url = "https://escola.example/"
//! attribute_prefix = "data-autocomplete-"
//! request_timeout_ms = 10000
//!
//! [request_header]
//! name = "X-Requested-With"
//! value = "fetch"
//!
//! [defaults]
//! min_query_length = 2
//! debounce_ms = 250
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use typeahead_net::HttpClient;
use url::Url;

use crate::error::SettingsError;

/// Default prefix of the per-input configuration attributes.
pub const DEFAULT_ATTRIBUTE_PREFIX: &str = "data-autocomplete-";

/// The header that marks a request as coming from the widget.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RequestHeader {
    pub name: String,
    pub value: String,
}

impl Default for RequestHeader {
    fn default() -> Self {
        Self {
            name: "X-Requested-With".to_string(),
            value: "fetch".to_string(),
        }
    }
}

/// Fallbacks for per-input options that are absent or unparsable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub min_query_length: usize,
    pub debounce_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            min_query_length: 2,
            debounce_ms: 250,
        }
    }
}

/// Settings shared by every widget on a page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TypeaheadSettings {
    /// Base URL relative endpoints resolve against.
    pub base_url: Option<String>,
    /// Prefix of the per-input configuration attributes.
    pub attribute_prefix: String,
    /// Marker header sent with every suggestion request.
    pub request_header: RequestHeader,
    /// Optional client-side request timeout. Unset means requests only end by
    /// settling or being superseded.
    pub request_timeout_ms: Option<u64>,
    /// HTTP user agent; the client default is used when unset.
    pub user_agent: Option<String>,
    /// Fallbacks for per-input options.
    pub defaults: Defaults,
}

impl Default for TypeaheadSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            attribute_prefix: DEFAULT_ATTRIBUTE_PREFIX.to_string(),
            request_header: RequestHeader::default(),
            request_timeout_ms: None,
            user_agent: None,
            defaults: Defaults::default(),
        }
    }
}

impl TypeaheadSettings {
    /// Parse settings from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(text)?;
        settings.base_url()?;
        Ok(settings)
    }

    /// Read and parse a TOML settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SettingsError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Use `base` for resolving relative endpoints.
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url = Some(base.into());
        self
    }

    /// The parsed base URL, if one is configured.
    pub fn base_url(&self) -> Result<Option<Url>, SettingsError> {
        self.base_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|source| SettingsError::InvalidBaseUrl {
                    url: raw.to_string(),
                    source,
                })
            })
            .transpose()
    }

    /// The full attribute name for a configuration key, e.g. `url`.
    pub fn attribute(&self, key: &str) -> String {
        format!("{}{}", self.attribute_prefix, key)
    }

    /// Build the HTTP client suggestion requests go through.
    ///
    /// The marker header is installed as a default header, the base URL is
    /// used for relative endpoints, and cookies are kept so session-protected
    /// endpoints work.
    pub fn http_client(&self) -> Result<HttpClient, SettingsError> {
        let mut builder = HttpClient::builder().default_header(
            self.request_header.name.as_str(),
            self.request_header.value.as_str(),
        )?;
        if let Some(base) = self.base_url()? {
            builder = builder.base_url(base);
        }
        builder = match self.request_timeout_ms {
            Some(ms) => builder.timeout(Duration::from_millis(ms)),
            None => builder.no_timeout(),
        };
        if let Some(ua) = &self.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        Ok(builder.build()?)
    }
}
