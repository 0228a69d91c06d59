//! Per-input widget configuration.

use std::time::Duration;

use typeahead_core::{Document, ElementId};

use crate::settings::TypeaheadSettings;

/// What activating a suggestion does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionMode {
    /// Follow the suggestion's link.
    #[default]
    Navigate,
    /// Write the suggestion into the input and a paired field.
    Fill,
}

impl SelectionMode {
    /// Parse a mode attribute. Only `fill` selects [`Fill`](Self::Fill).
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("fill") {
            Self::Fill
        } else {
            Self::Navigate
        }
    }
}

/// Options for one bound input, resolved once at attach time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Suggestion endpoint, absolute or relative to the settings' base URL.
    pub endpoint: String,
    /// Minimum trimmed query length, in characters, that triggers a fetch.
    pub min_query_length: usize,
    /// Quiet period before a query is dispatched.
    pub debounce: Duration,
    /// Link template with `{id}`, `{q}` and `{nome}` placeholders.
    pub href_template: Option<String>,
    pub mode: SelectionMode,
    /// Selector of the field filled with the suggestion id in fill mode.
    pub fill_target_selector: Option<String>,
    /// Cap on the number of rendered suggestions.
    pub max_items: Option<usize>,
}

impl WidgetConfig {
    /// Read the configuration attributes of `input`.
    ///
    /// Returns `None` when the input declares no endpoint, which means no
    /// widget should be attached to it.
    pub fn resolve(
        document: &Document,
        input: ElementId,
        settings: &TypeaheadSettings,
    ) -> Option<Self> {
        let read = |key: &str| {
            document
                .attribute(input, &settings.attribute(key))
                .ok()
                .flatten()
                .filter(|v| !v.is_empty())
        };

        let endpoint = read("url")?;

        let min_query_length = read("min")
            .and_then(|v| parse_leading_int(&v))
            .map(|n| n.max(0) as usize)
            .unwrap_or(settings.defaults.min_query_length);
        let debounce_ms = read("delay")
            .and_then(|v| parse_leading_int(&v))
            .map(|n| n.max(0) as u64)
            .unwrap_or(settings.defaults.debounce_ms);
        let max_items = read("max")
            .and_then(|v| parse_leading_int(&v))
            .filter(|&n| n > 0)
            .map(|n| n as usize);

        Some(Self {
            endpoint,
            min_query_length,
            debounce: Duration::from_millis(debounce_ms),
            href_template: read("href"),
            mode: read("mode")
                .map(|m| SelectionMode::parse(&m))
                .unwrap_or_default(),
            fill_target_selector: read("fill-target"),
            max_items,
        })
    }
}

/// Parse an integer the lenient way form attributes are usually read:
/// optional leading whitespace, an optional sign, then as many decimal
/// digits as are present. Anything after the digits is ignored.
pub(crate) fn parse_leading_int(value: &str) -> Option<i64> {
    let s = value.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_with(attrs: &[(&str, &str)]) -> (Document, ElementId) {
        let doc = Document::new();
        let input = doc.create_element("input");
        for (name, value) in attrs {
            doc.set_attribute(input, name, *value).unwrap();
        }
        doc.append_child(doc.body(), input).unwrap();
        (doc, input)
    }

    #[test]
    fn test_missing_endpoint_skips() {
        let (doc, input) = input_with(&[("data-autocomplete-min", "3")]);
        assert_eq!(
            WidgetConfig::resolve(&doc, input, &TypeaheadSettings::default()),
            None
        );

        let (doc, input) = input_with(&[("data-autocomplete-url", "")]);
        assert_eq!(
            WidgetConfig::resolve(&doc, input, &TypeaheadSettings::default()),
            None
        );
    }

    #[test]
    fn test_defaults_applied() {
        let (doc, input) = input_with(&[("data-autocomplete-url", "/alunos/autocomplete/")]);
        let config = WidgetConfig::resolve(&doc, input, &TypeaheadSettings::default()).unwrap();

        assert_eq!(config.endpoint, "/alunos/autocomplete/");
        assert_eq!(config.min_query_length, 2);
        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(config.href_template, None);
        assert_eq!(config.mode, SelectionMode::Navigate);
        assert_eq!(config.fill_target_selector, None);
        assert_eq!(config.max_items, None);
    }

    #[test]
    fn test_all_attributes() {
        let (doc, input) = input_with(&[
            ("data-autocomplete-url", "/alunos/autocomplete/?ativos=1"),
            ("data-autocomplete-min", "3"),
            ("data-autocomplete-delay", "400"),
            ("data-autocomplete-href", "/alunos/{id}/"),
            ("data-autocomplete-mode", "FILL"),
            ("data-autocomplete-fill-target", "#id_aluno"),
            ("data-autocomplete-max", "8"),
        ]);
        let config = WidgetConfig::resolve(&doc, input, &TypeaheadSettings::default()).unwrap();

        assert_eq!(config.min_query_length, 3);
        assert_eq!(config.debounce, Duration::from_millis(400));
        assert_eq!(config.href_template.as_deref(), Some("/alunos/{id}/"));
        assert_eq!(config.mode, SelectionMode::Fill);
        assert_eq!(config.fill_target_selector.as_deref(), Some("#id_aluno"));
        assert_eq!(config.max_items, Some(8));
    }

    #[test]
    fn test_unparsable_numbers_fall_back() {
        let (doc, input) = input_with(&[
            ("data-autocomplete-url", "/x/"),
            ("data-autocomplete-min", "abc"),
            ("data-autocomplete-delay", " 300ms"),
            ("data-autocomplete-max", "0"),
        ]);
        let settings = TypeaheadSettings::default();
        let config = WidgetConfig::resolve(&doc, input, &settings).unwrap();

        assert_eq!(config.min_query_length, 2);
        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.max_items, None);
    }

    #[test]
    fn test_custom_prefix_and_defaults() {
        let (doc, input) = input_with(&[("data-suggest-url", "/x/")]);
        let mut settings = TypeaheadSettings::default();
        settings.attribute_prefix = "data-suggest-".into();
        settings.defaults.min_query_length = 1;

        let config = WidgetConfig::resolve(&doc, input, &settings).unwrap();
        assert_eq!(config.min_query_length, 1);
    }

    #[test]
    fn test_unknown_mode_navigates() {
        assert_eq!(SelectionMode::parse("navigate"), SelectionMode::Navigate);
        assert_eq!(SelectionMode::parse("popup"), SelectionMode::Navigate);
        assert_eq!(SelectionMode::parse(" Fill "), SelectionMode::Fill);
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("  7px"), Some(7));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("+5"), Some(5));
        assert_eq!(parse_leading_int("x1"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
    }
}
