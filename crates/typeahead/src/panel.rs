//! Suggestion Panel: rendering, selection and hiding.

use typeahead_core::logging::targets;
use typeahead_core::{Document, ElementId, Event, EventKind};

use crate::config::SelectionMode;
use crate::suggestion::Suggestion;
use crate::template::href_for;
use crate::widget::{QueryState, WidgetShared};

/// Class of the panel box.
pub const PANEL_CLASS: &str = "suggest";
/// Class of each suggestion anchor.
pub const ITEM_CLASS: &str = "suggest__item";
/// Class of the title line.
pub const TITLE_CLASS: &str = "suggest__title";
/// Class of the optional meta line.
pub const META_CLASS: &str = "suggest__meta";

const ITEM_SELECTOR: &str = "a.suggest__item";

impl WidgetShared {
    /// Replace the panel content with `suggestions`, or hide it when there are none.
    pub(crate) fn render_locked(
        &self,
        state: &mut QueryState,
        suggestions: &[Suggestion],
        query: &str,
    ) {
        let limit = self.config.max_items.unwrap_or(usize::MAX);
        let visible = &suggestions[..suggestions.len().min(limit)];

        if visible.is_empty() {
            self.hide_locked(state);
            return;
        }

        if let Err(err) = self.build_items(visible, query) {
            tracing::debug!(target: targets::PANEL, error = %err, "render failed");
            self.hide_locked(state);
            return;
        }
        let _ = self.document.remove_attribute(self.panel, "hidden");
        state.panel_visible = true;
        tracing::trace!(target: targets::PANEL, count = visible.len(), "panel shown");
    }

    fn build_items(&self, suggestions: &[Suggestion], query: &str) -> typeahead_core::Result<()> {
        let doc = &self.document;
        doc.remove_children(self.panel)?;

        for suggestion in suggestions {
            let item = doc.create_element("a");
            doc.set_attribute(item, "class", ITEM_CLASS)?;
            doc.set_attribute(
                item,
                "href",
                href_for(self.config.href_template.as_deref(), suggestion, query),
            )?;
            doc.set_attribute(item, "data-id", suggestion.id.as_str())?;
            doc.set_attribute(item, "data-title", suggestion.title.as_str())?;

            append_line(doc, item, TITLE_CLASS, &suggestion.title)?;
            if let Some(meta) = &suggestion.meta {
                append_line(doc, item, META_CLASS, meta)?;
            }
            doc.append_child(self.panel, item)?;
        }
        Ok(())
    }

    /// Hide the panel and drop its content.
    pub(crate) fn hide_locked(&self, state: &mut QueryState) {
        if state.panel_visible {
            tracing::trace!(target: targets::PANEL, "panel hidden");
        }
        state.panel_visible = false;
        let _ = self.document.set_attribute(self.panel, "hidden", "");
        let _ = self.document.remove_children(self.panel);
    }

    pub(crate) fn hide(&self) {
        let mut state = self.state.lock();
        self.hide_locked(&mut state);
    }

    /// Resolve a click inside the panel.
    ///
    /// Navigate mode leaves the click alone so the anchor's href is followed.
    /// Fill mode prevents navigation and writes the suggestion into the form.
    pub(crate) fn handle_panel_click(&self, event: &Event) {
        let doc = &self.document;
        let Some(item) = doc.closest(event.target(), ITEM_SELECTOR).ok().flatten() else {
            return;
        };
        if !doc.contains(self.panel, item) {
            return;
        }
        let Some(suggestion) = read_item(doc, item) else {
            return;
        };

        tracing::debug!(target: targets::PANEL, id = %suggestion.id, mode = ?self.config.mode, "suggestion activated");
        self.activated.emit_ref(&suggestion);

        if self.config.mode != SelectionMode::Fill {
            return;
        }
        event.prevent_default();

        if let Some(selector) = &self.config.fill_target_selector {
            match doc.query_selector(selector) {
                Ok(Some(target)) => {
                    let _ = doc.set_value(target, suggestion.id.as_str());
                    let _ = doc.dispatch_event(target, EventKind::Change);
                }
                Ok(None) => {
                    tracing::debug!(target: targets::PANEL, %selector, "fill target not found");
                }
                Err(err) => {
                    tracing::debug!(target: targets::PANEL, error = %err, "invalid fill target selector");
                }
            }
        }

        if !suggestion.title.is_empty() {
            let _ = doc.set_value(self.input, suggestion.title.as_str());
        }
        self.hide();
    }
}

fn append_line(
    doc: &Document,
    item: ElementId,
    class: &str,
    text: &str,
) -> typeahead_core::Result<()> {
    let line = doc.create_element("div");
    doc.set_attribute(line, "class", class)?;
    doc.set_text(line, text)?;
    doc.append_child(item, line)
}

/// Read a suggestion back from a rendered item.
fn read_item(doc: &Document, item: ElementId) -> Option<Suggestion> {
    let id = doc.attribute(item, "data-id").ok()??;
    let title = doc.attribute(item, "data-title").ok()??;
    let meta = doc
        .children(item)
        .ok()?
        .into_iter()
        .find(|&child| {
            doc.attribute(child, "class").ok().flatten().as_deref() == Some(META_CLASS)
        })
        .and_then(|line| doc.text(line).ok());

    Some(Suggestion {
        id,
        title,
        meta,
    })
}
