//! Document model for Typeahead.
//!
//! A [`Document`] is the page a widget is bound to: an arena of elements with
//! attributes, form values and text, arranged in a parent/child tree under a
//! `body` root, plus event listeners.
//!
//! # Events
//!
//! [`Document::dispatch_event`] delivers an [`Event`] to listeners on the
//! target, then on each ancestor (bubbling), then to document-level
//! listeners. Listeners run with no document lock held, so they are free to
//! mutate the document. Any listener may call [`Event::prevent_default`];
//! [`Document::click`] honors that when computing anchor navigation.
//!
//! # Example
//!
//! ```
//! use typeahead_core::{Document, EventKind};
//!
//! let doc = Document::new();
//! let input = doc.create_element("input");
//! doc.set_attribute(input, "id", "q").unwrap();
//! doc.append_child(doc.body(), input).unwrap();
//!
//! doc.add_event_listener(input, EventKind::Input, |event| {
//!     println!("input on {:?}", event.target());
//! }).unwrap();
//!
//! doc.type_text(input, "hello").unwrap();
//! assert_eq!(doc.query_selector("#q").unwrap(), Some(input));
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use slotmap::{SlotMap, new_key_type};

use crate::error::{DocumentError, Result};
use crate::logging::{span_names, targets};
use crate::selector::{ElementLike, Selector};
use crate::signal::{ConnectionId, Signal};

new_key_type! {
    /// A stable identifier for an element in a [`Document`].
    ///
    /// IDs become invalid once the element is removed.
    pub struct ElementId;
}

/// The kinds of events a document dispatches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The user edited a field's value.
    Input,
    /// A field's value was committed or changed programmatically.
    Change,
    /// An element was activated (mouse click, tap, Enter on a link).
    Click,
}

/// An event being delivered to listeners.
///
/// Clones share the default-prevented flag, so a call to
/// [`prevent_default`](Self::prevent_default) in any listener is visible to
/// the dispatcher.
#[derive(Clone, Debug)]
pub struct Event {
    kind: EventKind,
    target: ElementId,
    current_target: Option<ElementId>,
    default_prevented: Arc<AtomicBool>,
}

impl Event {
    fn new(kind: EventKind, target: ElementId) -> Self {
        Self {
            kind,
            target,
            current_target: Some(target),
            default_prevented: Arc::new(AtomicBool::new(false)),
        }
    }

    fn at(&self, current_target: Option<ElementId>) -> Self {
        Self {
            current_target,
            ..self.clone()
        }
    }

    /// The kind of event.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The element the event was dispatched on.
    pub fn target(&self) -> ElementId {
        self.target
    }

    /// The element whose listener is running, or `None` for document-level
    /// listeners.
    pub fn current_target(&self) -> Option<ElementId> {
        self.current_target
    }

    /// Suppress the event's default action.
    pub fn prevent_default(&self) {
        self.default_prevented.store(true, Ordering::SeqCst);
    }

    /// Check whether a listener suppressed the default action.
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::SeqCst)
    }
}

/// Identifies a registered event listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId {
    element: Option<ElementId>,
    kind: EventKind,
    connection: ConnectionId,
}

/// The result of [`Document::click`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClickOutcome {
    /// Whether a listener suppressed the default action.
    pub default_prevented: bool,
    /// The href the browser would navigate to, if the click landed inside a
    /// navigating anchor and nothing prevented it.
    pub navigation: Option<String>,
}

#[derive(Debug)]
struct ElementData {
    tag: String,
    attributes: Vec<(String, String)>,
    value: String,
    text: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            value: String::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

impl ElementLike for ElementData {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

type Listeners = Arc<Signal<Event>>;

struct DocumentInner {
    elements: SlotMap<ElementId, ElementData>,
    body: ElementId,
    element_listeners: HashMap<(ElementId, EventKind), Listeners>,
    document_listeners: HashMap<EventKind, Listeners>,
}

impl DocumentInner {
    fn get(&self, id: ElementId) -> Result<&ElementData> {
        self.elements.get(id).ok_or(DocumentError::InvalidElement)
    }

    fn get_mut(&mut self, id: ElementId) -> Result<&mut ElementData> {
        self.elements.get_mut(id).ok_or(DocumentError::InvalidElement)
    }

    fn is_inclusive_ancestor(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.elements.get(id).and_then(|e| e.parent);
        }
        false
    }

    fn detach(&mut self, child: ElementId) {
        let Some(parent) = self.elements.get(child).and_then(|e| e.parent) else {
            return;
        };
        if let Some(parent) = self.elements.get_mut(parent) {
            parent.children.retain(|&c| c != child);
        }
        if let Some(child) = self.elements.get_mut(child) {
            child.parent = None;
        }
    }

    fn preorder(&self, root: ElementId, out: &mut Vec<ElementId>) {
        out.push(root);
        if let Some(element) = self.elements.get(root) {
            for &child in &element.children {
                self.preorder(child, out);
            }
        }
    }

    fn select(&self, selector: &Selector, first_only: bool) -> Vec<ElementId> {
        let mut candidates = Vec::new();
        self.preorder(self.body, &mut candidates);

        let parent_of = |e: &ElementData| e.parent.and_then(|p| self.elements.get(p));
        let mut found = Vec::new();
        for id in candidates {
            let Some(element) = self.elements.get(id) else {
                continue;
            };
            if selector.matches(element, parent_of) {
                found.push(id);
                if first_only {
                    break;
                }
            }
        }
        found
    }

    fn remove_subtree(&mut self, id: ElementId) {
        let Some(element) = self.elements.remove(id) else {
            return;
        };
        self.element_listeners.retain(|(el, _), _| *el != id);
        for child in element.children {
            self.remove_subtree(child);
        }
    }

    fn write_html(&self, id: ElementId, out: &mut String) {
        let Some(element) = self.elements.get(id) else {
            return;
        };
        let _ = write!(out, "<{}", element.tag);
        for (name, value) in &element.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape_attribute(value));
        }
        out.push('>');
        if is_void_element(&element.tag) {
            return;
        }
        out.push_str(&escape_text(&element.text));
        for &child in &element.children {
            self.write_html(child, out);
        }
        let _ = write!(out, "</{}>", element.tag);
    }

    fn write_text_content(&self, id: ElementId, out: &mut String) {
        if let Some(element) = self.elements.get(id) {
            out.push_str(&element.text);
            for &child in &element.children {
                self.write_text_content(child, out);
            }
        }
    }
}

/// A shared, thread-safe document tree.
///
/// `Document` is cheaply cloneable; clones refer to the same page.
#[derive(Clone)]
pub struct Document {
    inner: Arc<RwLock<DocumentInner>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only a `body` element.
    pub fn new() -> Self {
        let mut elements = SlotMap::with_key();
        let body = elements.insert(ElementData::new("body"));
        Self {
            inner: Arc::new(RwLock::new(DocumentInner {
                elements,
                body,
                element_listeners: HashMap::new(),
                document_listeners: HashMap::new(),
            })),
        }
    }

    /// The root `body` element.
    pub fn body(&self) -> ElementId {
        self.inner.read().body
    }

    /// Check whether two handles refer to the same document.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // =========================================================================
    // Tree Structure
    // =========================================================================

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> ElementId {
        self.inner.write().elements.insert(ElementData::new(tag))
    }

    /// Check whether an element exists.
    pub fn exists(&self, id: ElementId) -> bool {
        self.inner.read().elements.contains_key(id)
    }

    /// Number of live elements, attached or not.
    pub fn element_count(&self) -> usize {
        self.inner.read().elements.len()
    }

    /// The element's tag name (lowercase).
    pub fn tag_name(&self, id: ElementId) -> Result<String> {
        Ok(self.inner.read().get(id)?.tag.clone())
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere.
    pub fn append_child(&self, parent: ElementId, child: ElementId) -> Result<()> {
        let mut inner = self.inner.write();
        inner.get(parent)?;
        inner.get(child)?;
        if inner.is_inclusive_ancestor(child, parent) {
            return Err(DocumentError::CircularParentage);
        }
        inner.detach(child);
        inner.get_mut(parent)?.children.push(child);
        inner.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Insert `child` into `parent` immediately before `reference`.
    pub fn insert_before(
        &self,
        parent: ElementId,
        child: ElementId,
        reference: ElementId,
    ) -> Result<()> {
        let mut inner = self.inner.write();
        inner.get(parent)?;
        inner.get(child)?;
        if inner.get(reference)?.parent != Some(parent) {
            return Err(DocumentError::NotAChild);
        }
        if inner.is_inclusive_ancestor(child, parent) {
            return Err(DocumentError::CircularParentage);
        }
        if child == reference {
            return Ok(());
        }
        inner.detach(child);
        let siblings = &mut inner.get_mut(parent)?.children;
        let index = siblings
            .iter()
            .position(|&c| c == reference)
            .ok_or(DocumentError::NotAChild)?;
        siblings.insert(index, child);
        inner.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Remove and destroy every descendant of `id`, along with their listeners.
    pub fn remove_children(&self, id: ElementId) -> Result<()> {
        let mut inner = self.inner.write();
        let children = std::mem::take(&mut inner.get_mut(id)?.children);
        for child in children {
            inner.remove_subtree(child);
        }
        Ok(())
    }

    /// The element's parent, if attached.
    pub fn parent(&self, id: ElementId) -> Result<Option<ElementId>> {
        Ok(self.inner.read().get(id)?.parent)
    }

    /// The element's children, in order.
    pub fn children(&self, id: ElementId) -> Result<Vec<ElementId>> {
        Ok(self.inner.read().get(id)?.children.clone())
    }

    /// The element's ancestors, nearest first.
    pub fn ancestors(&self, id: ElementId) -> Result<Vec<ElementId>> {
        let inner = self.inner.read();
        let mut current = inner.get(id)?.parent;
        let mut ancestors = Vec::new();
        while let Some(parent) = current {
            ancestors.push(parent);
            current = inner.elements.get(parent).and_then(|e| e.parent);
        }
        Ok(ancestors)
    }

    /// Check whether `node` is `ancestor` or one of its descendants.
    ///
    /// Unknown IDs are never contained.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let inner = self.inner.read();
        inner.elements.contains_key(ancestor) && inner.is_inclusive_ancestor(ancestor, node)
    }

    // =========================================================================
    // Attributes, Values and Text
    // =========================================================================

    /// Get an attribute value.
    pub fn attribute(&self, id: ElementId, name: &str) -> Result<Option<String>> {
        Ok(self.inner.read().get(id)?.attribute(name).map(str::to_string))
    }

    /// Check whether an attribute is present.
    pub fn has_attribute(&self, id: ElementId, name: &str) -> Result<bool> {
        Ok(self.inner.read().get(id)?.attribute(name).is_some())
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attribute(&self, id: ElementId, name: &str, value: impl Into<String>) -> Result<()> {
        let mut inner = self.inner.write();
        let element = inner.get_mut(id)?;
        let value = value.into();
        match element.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => element.attributes.push((name.to_string(), value)),
        }
        Ok(())
    }

    /// Remove an attribute. Returns the previous value, if any.
    pub fn remove_attribute(&self, id: ElementId, name: &str) -> Result<Option<String>> {
        let mut inner = self.inner.write();
        let element = inner.get_mut(id)?;
        let index = element.attributes.iter().position(|(n, _)| n == name);
        Ok(index.map(|i| element.attributes.remove(i).1))
    }

    /// The element's current form value.
    pub fn value(&self, id: ElementId) -> Result<String> {
        Ok(self.inner.read().get(id)?.value.clone())
    }

    /// Set the element's form value without dispatching any event.
    pub fn set_value(&self, id: ElementId, value: impl Into<String>) -> Result<()> {
        self.inner.write().get_mut(id)?.value = value.into();
        Ok(())
    }

    /// The element's own text.
    pub fn text(&self, id: ElementId) -> Result<String> {
        Ok(self.inner.read().get(id)?.text.clone())
    }

    /// Set the element's own text.
    pub fn set_text(&self, id: ElementId, text: impl Into<String>) -> Result<()> {
        self.inner.write().get_mut(id)?.text = text.into();
        Ok(())
    }

    /// The concatenated text of the element and all its descendants.
    pub fn text_content(&self, id: ElementId) -> Result<String> {
        let inner = self.inner.read();
        inner.get(id)?;
        let mut out = String::new();
        inner.write_text_content(id, &mut out);
        Ok(out)
    }

    /// Serialize the element and its subtree as HTML.
    pub fn outer_html(&self, id: ElementId) -> Result<String> {
        let inner = self.inner.read();
        inner.get(id)?;
        let mut out = String::new();
        inner.write_html(id, &mut out);
        Ok(out)
    }

    /// Serialize the element's children as HTML.
    pub fn inner_html(&self, id: ElementId) -> Result<String> {
        let inner = self.inner.read();
        let mut out = String::new();
        for &child in &inner.get(id)?.children {
            inner.write_html(child, &mut out);
        }
        Ok(out)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The first attached element matching `selector`, in document order.
    pub fn query_selector(&self, selector: &str) -> Result<Option<ElementId>> {
        let selector = Selector::parse(selector)?;
        Ok(self.query_selector_with(&selector))
    }

    /// The first attached element matching a pre-parsed selector.
    pub fn query_selector_with(&self, selector: &Selector) -> Option<ElementId> {
        self.inner.read().select(selector, true).into_iter().next()
    }

    /// All attached elements matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementId>> {
        let selector = Selector::parse(selector)?;
        Ok(self.inner.read().select(&selector, false))
    }

    /// All attached elements matching a pre-parsed selector.
    pub fn query_selector_all_with(&self, selector: &Selector) -> Vec<ElementId> {
        self.inner.read().select(selector, false)
    }

    /// The nearest inclusive ancestor of `id` matching `selector`.
    pub fn closest(&self, id: ElementId, selector: &str) -> Result<Option<ElementId>> {
        let selector = Selector::parse(selector)?;
        let inner = self.inner.read();
        inner.get(id)?;

        let parent_of = |e: &ElementData| e.parent.and_then(|p| inner.elements.get(p));
        let mut current = Some(id);
        while let Some(candidate) = current {
            let element = inner.get(candidate)?;
            if selector.matches(element, parent_of) {
                return Ok(Some(candidate));
            }
            current = element.parent;
        }
        Ok(None)
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Listen for events of `kind` on `id` and its descendants.
    pub fn add_event_listener<F>(&self, id: ElementId, kind: EventKind, listener: F) -> Result<ListenerId>
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let mut inner = self.inner.write();
        inner.get(id)?;
        let signal = inner
            .element_listeners
            .entry((id, kind))
            .or_insert_with(|| Arc::new(Signal::new()))
            .clone();
        drop(inner);

        Ok(ListenerId {
            element: Some(id),
            kind,
            connection: signal.connect(listener),
        })
    }

    /// Listen for events of `kind` anywhere in the document.
    ///
    /// Document-level listeners run after all element listeners.
    pub fn add_document_listener<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let signal = self
            .inner
            .write()
            .document_listeners
            .entry(kind)
            .or_insert_with(|| Arc::new(Signal::new()))
            .clone();

        ListenerId {
            element: None,
            kind,
            connection: signal.connect(listener),
        }
    }

    /// Remove a listener. Returns `true` if it was registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let inner = self.inner.read();
        let signal = match id.element {
            Some(element) => inner.element_listeners.get(&(element, id.kind)),
            None => inner.document_listeners.get(&id.kind),
        };
        signal.is_some_and(|s| s.disconnect(id.connection))
    }

    /// Dispatch an event on `target`, bubbling to its ancestors and then to
    /// document-level listeners.
    pub fn dispatch_event(&self, target: ElementId, kind: EventKind) -> Result<Event> {
        let _span =
            tracing::trace_span!(target: targets::DOCUMENT, span_names::DISPATCH_EVENT, ?kind)
                .entered();
        let (path, document_listeners) = {
            let inner = self.inner.read();
            inner.get(target)?;

            let mut path = Vec::new();
            let mut current = Some(target);
            while let Some(id) = current {
                if let Some(signal) = inner.element_listeners.get(&(id, kind)) {
                    path.push((id, signal.clone()));
                }
                current = inner.elements.get(id).and_then(|e| e.parent);
            }
            (path, inner.document_listeners.get(&kind).cloned())
        };

        tracing::trace!(
            target: targets::DOCUMENT,
            ?kind,
            element_listeners = path.len(),
            "dispatching event"
        );

        let event = Event::new(kind, target);
        for (current, signal) in path {
            signal.emit(event.at(Some(current)));
        }
        if let Some(signal) = document_listeners {
            signal.emit(event.at(None));
        }
        Ok(event)
    }

    /// Simulate a user activation of `target`.
    ///
    /// Dispatches a click and then resolves the default action: navigation to
    /// the href of the nearest enclosing anchor, unless a listener prevented
    /// it or the href is empty or `#`.
    pub fn click(&self, target: ElementId) -> Result<ClickOutcome> {
        let event = self.dispatch_event(target, EventKind::Click)?;
        let default_prevented = event.is_default_prevented();

        let navigation = if default_prevented {
            None
        } else {
            // The target may have been removed by a listener.
            self.closest(target, "a[href]")
                .ok()
                .flatten()
                .and_then(|anchor| self.attribute(anchor, "href").ok().flatten())
                .filter(|href| !href.is_empty() && href != "#")
        };

        Ok(ClickOutcome {
            default_prevented,
            navigation,
        })
    }

    /// Simulate the user replacing a field's text: set the value and dispatch
    /// an input event.
    pub fn type_text(&self, input: ElementId, text: impl Into<String>) -> Result<Event> {
        self.set_value(input, text)?;
        self.dispatch_event(input, EventKind::Input)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("Document")
            .field("elements", &inner.elements.len())
            .finish()
    }
}

/// Escape a string for use inside a double-quoted attribute value.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Escape a string for use as element text.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

fn is_void_element(tag: &str) -> bool {
    matches!(tag, "input" | "br" | "hr" | "img" | "meta" | "link")
}
