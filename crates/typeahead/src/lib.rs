//! Debounced, race-safe autocomplete for form inputs.
//!
//! An [`Autocomplete`] binds to a text input in a [`Document`], reads its
//! `data-autocomplete-*` attributes, and as the user types:
//!
//! 1. debounces keystrokes into at most one pending query,
//! 2. fetches suggestions, cancelling whatever request it supersedes,
//! 3. renders them into a panel under the input, and
//! 4. on activation either lets the link navigate or fills a paired field.
//!
//! Every failure degrades to "no suggestions": nothing is surfaced to the
//! user and the input keeps working. Failures are visible in `tracing` logs
//! under the targets in [`typeahead_core::logging::targets`].
//!
//! # Page initialization
//!
//! ```ignore
//! use typeahead::{TypeaheadSettings, attach_all};
//!
//! let settings = TypeaheadSettings::load("typeahead.toml")?;
//! let widgets = attach_all(&document, &settings)?;
//! ```
//!
//! # Input attributes
//!
//! | Attribute | Default | Meaning |
//! |---|---|---|
//! | `data-autocomplete-url` | required | suggestion endpoint |
//! | `data-autocomplete-min` | 2 | minimum trimmed query length |
//! | `data-autocomplete-delay` | 250 | debounce in milliseconds |
//! | `data-autocomplete-href` | none | link template with `{id}`, `{q}`, `{nome}` |
//! | `data-autocomplete-mode` | `navigate` | `navigate` or `fill` |
//! | `data-autocomplete-fill-target` | none | selector of the field filled with the id |
//! | `data-autocomplete-max` | none | cap on rendered suggestions |

mod config;
mod dismissal;
mod dispatcher;
mod error;
mod lifecycle;
mod panel;
mod settings;
mod source;
mod suggestion;
mod template;
mod widget;

pub use config::{SelectionMode, WidgetConfig};
pub use dismissal::{DismissalDispatcher, DismissalKey};
pub use error::{FetchError, SettingsError};
pub use lifecycle::{FetchOutcome, RequestId};
pub use panel::{ITEM_CLASS, META_CLASS, PANEL_CLASS, TITLE_CLASS};
pub use settings::{DEFAULT_ATTRIBUTE_PREFIX, Defaults, RequestHeader, TypeaheadSettings};
pub use source::{HttpSuggestionSource, SuggestionSource, build_request_url};
pub use suggestion::{Suggestion, normalize_results};
pub use template::{PLACEHOLDER_HREF, encode_component, expand_href, href_for};
pub use widget::{Autocomplete, attach_all};

pub use typeahead_core::{ClickOutcome, Document, ElementId, EventKind};
