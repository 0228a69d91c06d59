//! The autocomplete widget and page initialization.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use typeahead_core::logging::targets;
use typeahead_core::{
    DebounceTimer, Document, ElementId, EventKind, ListenerId, Selector, Signal, runtime,
};

use crate::config::WidgetConfig;
use crate::dismissal::{DismissalDispatcher, DismissalKey};
use crate::error::SettingsError;
use crate::lifecycle::ActiveRequest;
use crate::panel::PANEL_CLASS;
use crate::settings::TypeaheadSettings;
use crate::source::{HttpSuggestionSource, SuggestionSource};
use crate::suggestion::Suggestion;

/// Mutable per-widget state. Always locked before any document access.
#[derive(Debug, Default)]
pub(crate) struct QueryState {
    pub(crate) last_submitted_query: String,
    pub(crate) timer: DebounceTimer,
    pub(crate) active_request: Option<ActiveRequest>,
    pub(crate) panel_visible: bool,
}

/// State shared between the widget handle, its listeners and its tasks.
pub(crate) struct WidgetShared {
    pub(crate) document: Document,
    pub(crate) input: ElementId,
    pub(crate) container: ElementId,
    pub(crate) panel: ElementId,
    pub(crate) config: WidgetConfig,
    pub(crate) source: Arc<dyn SuggestionSource>,
    pub(crate) handle: Handle,
    pub(crate) state: Mutex<QueryState>,
    pub(crate) activated: Signal<Suggestion>,
}

/// An autocomplete widget bound to one input.
///
/// The widget lives as long as its document: listeners keep it alive even if
/// this handle is dropped. Call [`detach`](Self::detach) to unbind it.
///
/// # Example
///
/// ```ignore
/// use typeahead::{Autocomplete, DismissalDispatcher, HttpSuggestionSource, TypeaheadSettings};
///
/// let settings = TypeaheadSettings::default().with_base_url("https://escola.example/");
/// let source = Arc::new(HttpSuggestionSource::new(settings.http_client()?));
/// let dismissal = DismissalDispatcher::new(&document);
///
/// if let Some(widget) = Autocomplete::attach(&document, input, &settings, source, &dismissal) {
///     widget.activated().connect(|s| println!("picked {}", s.title));
/// }
/// ```
pub struct Autocomplete {
    shared: Arc<WidgetShared>,
    listeners: Vec<ListenerId>,
    dismissal: Arc<DismissalDispatcher>,
    dismissal_key: DismissalKey,
}

impl Autocomplete {
    /// Bind a widget to `input`.
    ///
    /// Returns `None` when the input declares no endpoint, or when it is not
    /// attached to the document and so cannot be wrapped.
    pub fn attach(
        document: &Document,
        input: ElementId,
        settings: &TypeaheadSettings,
        source: Arc<dyn SuggestionSource>,
        dismissal: &Arc<DismissalDispatcher>,
    ) -> Option<Self> {
        let config = WidgetConfig::resolve(document, input, settings)?;

        let (container, panel) = match wrap_input(document, input) {
            Ok(elements) => elements,
            Err(err) => {
                tracing::debug!(target: targets::WIDGET, error = %err, "input cannot be wrapped");
                return None;
            }
        };

        let shared = Arc::new(WidgetShared {
            document: document.clone(),
            input,
            container,
            panel,
            config,
            source,
            handle: runtime::handle(),
            state: Mutex::new(QueryState::default()),
            activated: Signal::new(),
        });

        let mut listeners = Vec::with_capacity(2);
        let on_input = Arc::clone(&shared);
        listeners.extend(
            document
                .add_event_listener(input, EventKind::Input, move |_| on_input.handle_input())
                .ok(),
        );
        let on_click = Arc::clone(&shared);
        listeners.extend(
            document
                .add_event_listener(panel, EventKind::Click, move |event| {
                    on_click.handle_panel_click(event)
                })
                .ok(),
        );

        let on_dismiss = Arc::clone(&shared);
        let dismissal_key = dismissal.register(container, move || on_dismiss.hide());

        tracing::debug!(
            target: targets::WIDGET,
            endpoint = %shared.config.endpoint,
            mode = ?shared.config.mode,
            "widget attached"
        );

        Some(Self {
            shared,
            listeners,
            dismissal: Arc::clone(dismissal),
            dismissal_key,
        })
    }

    /// The resolved configuration.
    pub fn config(&self) -> &WidgetConfig {
        &self.shared.config
    }

    /// The bound input.
    pub fn input(&self) -> ElementId {
        self.shared.input
    }

    /// The wrapper holding the input and the panel.
    pub fn container(&self) -> ElementId {
        self.shared.container
    }

    /// The panel box.
    pub fn panel_element(&self) -> ElementId {
        self.shared.panel
    }

    /// Serialized panel content; empty while hidden.
    pub fn panel_html(&self) -> String {
        self.shared
            .document
            .inner_html(self.shared.panel)
            .unwrap_or_default()
    }

    /// Whether the panel is currently shown.
    pub fn is_panel_visible(&self) -> bool {
        self.shared.state.lock().panel_visible
    }

    /// The last query handed to the suggestion source.
    pub fn last_submitted_query(&self) -> String {
        self.shared.state.lock().last_submitted_query.clone()
    }

    /// Whether a debounce timer is waiting to fire.
    pub fn has_pending_timer(&self) -> bool {
        self.shared.state.lock().timer.is_pending()
    }

    /// Whether a fetch is in flight whose result would still be rendered.
    pub fn has_active_request(&self) -> bool {
        self.shared.state.lock().active_request.is_some()
    }

    /// Emitted when a suggestion is activated, in either mode.
    pub fn activated(&self) -> &Signal<Suggestion> {
        &self.shared.activated
    }

    /// Hide the panel.
    pub fn hide(&self) {
        self.shared.hide();
    }

    /// Unbind the widget: remove its listeners and dismissal registration,
    /// cancel its timer and its in-flight request, and hide the panel.
    ///
    /// The wrapper elements stay in the document.
    pub fn detach(self) {
        let shared = &self.shared;
        for id in &self.listeners {
            shared.document.remove_listener(*id);
        }
        self.dismissal.deregister(self.dismissal_key);

        let mut state = shared.state.lock();
        state.timer.cancel();
        if let Some(active) = state.active_request.take() {
            active.token.cancel();
        }
        shared.hide_locked(&mut state);
        tracing::debug!(target: targets::WIDGET, "widget detached");
    }
}

impl std::fmt::Debug for Autocomplete {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autocomplete")
            .field("input", &self.shared.input)
            .field("config", &self.shared.config)
            .finish()
    }
}

/// Move `input` into a positioned wrapper and add a hidden panel after it.
fn wrap_input(document: &Document, input: ElementId) -> typeahead_core::Result<(ElementId, ElementId)> {
    let parent = document
        .parent(input)?
        .ok_or(typeahead_core::DocumentError::NotAChild)?;

    let container = document.create_element("div");
    document.set_attribute(container, "style", "position: relative")?;
    document.insert_before(parent, container, input)?;
    document.append_child(container, input)?;

    let panel = document.create_element("div");
    document.set_attribute(panel, "class", PANEL_CLASS)?;
    document.set_attribute(panel, "hidden", "")?;
    document.set_attribute(
        panel,
        "style",
        "position: absolute; top: 100%; left: 0; right: 0; z-index: 60; margin-top: 6px",
    )?;
    document.append_child(container, panel)?;

    Ok((container, panel))
}

/// Bind a widget to every configured input in `document`.
///
/// All widgets share one HTTP client and one dismissal dispatcher. Inputs
/// without an endpoint are skipped.
pub fn attach_all(
    document: &Document,
    settings: &TypeaheadSettings,
) -> Result<Vec<Autocomplete>, SettingsError> {
    let marker = format!("input[{}]", settings.attribute("url"));
    let selector = Selector::parse(&marker).map_err(SettingsError::InvalidAttributePrefix)?;

    let source: Arc<dyn SuggestionSource> =
        Arc::new(HttpSuggestionSource::new(settings.http_client()?));
    let dismissal = DismissalDispatcher::new(document);

    let widgets: Vec<_> = document
        .query_selector_all_with(&selector)
        .into_iter()
        .filter_map(|input| {
            Autocomplete::attach(document, input, settings, Arc::clone(&source), &dismissal)
        })
        .collect();

    tracing::debug!(target: targets::WIDGET, count = widgets.len(), "page initialized");
    Ok(widgets)
}
