//! Link templates for suggestions.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::suggestion::Suggestion;

/// Characters left unescaped in a URI component: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Href used when no template is configured.
pub const PLACEHOLDER_HREF: &str = "#";

/// Percent-encode a value for use as a single URI component.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Expand a link template for one suggestion.
///
/// `{id}`, `{q}` and `{nome}` are replaced with the encoded suggestion id,
/// query and title. Other text is kept as is.
pub fn expand_href(template: &str, suggestion: &Suggestion, query: &str) -> String {
    template
        .replace("{id}", &encode_component(&suggestion.id))
        .replace("{q}", &encode_component(query))
        .replace("{nome}", &encode_component(&suggestion.title))
}

/// The href for a suggestion, falling back to [`PLACEHOLDER_HREF`].
pub fn href_for(template: Option<&str>, suggestion: &Suggestion, query: &str) -> String {
    match template {
        Some(template) => expand_href(template, suggestion, query),
        None => PLACEHOLDER_HREF.to_string(),
    }
}
