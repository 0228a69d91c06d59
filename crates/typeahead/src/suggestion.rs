//! Canonical suggestion records.
//!
//! Endpoints return loosely shaped JSON. Everything is normalized into
//! [`Suggestion`] as soon as a payload arrives, so rendering never has to
//! look at alternative field names.

use serde_json::Value;

/// Field names that may carry the title, in priority order.
const TITLE_FIELDS: [&str; 3] = ["title", "nome", "text"];
/// Field names that may carry the secondary line, in priority order.
const META_FIELDS: [&str; 2] = ["meta", "subtitle"];

/// One suggestion as rendered by the panel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Suggestion {
    /// Identifier; empty when the result carried none.
    pub id: String,
    /// Visible title; empty when the result carried none.
    pub title: String,
    /// Secondary line, only when present and non-empty.
    pub meta: Option<String>,
}

impl Suggestion {
    /// Create a suggestion without a meta line.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            meta: None,
        }
    }

    /// Set the meta line. Empty text means no meta line.
    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        let meta = meta.into();
        self.meta = (!meta.is_empty()).then_some(meta);
        self
    }

    /// Normalize one raw result. Returns `None` for non-object entries.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let first_present = |fields: &[&str]| {
            fields
                .iter()
                .filter_map(|f| object.get(*f).and_then(scalar_to_string))
                .find(|s| !s.is_empty())
        };

        Some(Self {
            id: object.get("id").and_then(scalar_to_string).unwrap_or_default(),
            title: first_present(&TITLE_FIELDS[..]).unwrap_or_default(),
            meta: first_present(&META_FIELDS[..]),
        })
    }
}

/// Normalize a whole response body.
///
/// Reads the `results` array; any other shape yields no suggestions.
pub fn normalize_results(body: &Value) -> Vec<Suggestion> {
    body.get("results")
        .and_then(Value::as_array)
        .map(|results| results.iter().filter_map(Suggestion::from_value).collect())
        .unwrap_or_default()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
