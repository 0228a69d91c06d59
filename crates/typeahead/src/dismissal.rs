//! Outside-click dismissal shared by every widget on a document.
//!
//! One document-level click listener serves all registered containers. A
//! click hides every registration whose container does not contain the click
//! target, so clicks inside a widget never dismiss it.

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};
use typeahead_core::logging::targets;
use typeahead_core::{Document, ElementId, Event, EventKind, ListenerId};

new_key_type! {
    /// Identifies a container registered with a [`DismissalDispatcher`].
    pub struct DismissalKey;
}

type DismissFn = Arc<dyn Fn() + Send + Sync>;

struct Registration {
    container: ElementId,
    on_dismiss: DismissFn,
}

/// Routes document clicks to the widgets they fall outside of.
///
/// The document listener is installed with the first registration and
/// removed again when the last one is deregistered.
pub struct DismissalDispatcher {
    document: Document,
    registrations: Arc<Mutex<SlotMap<DismissalKey, Registration>>>,
    listener: Mutex<Option<ListenerId>>,
}

impl DismissalDispatcher {
    pub fn new(document: &Document) -> Arc<Self> {
        Arc::new(Self {
            document: document.clone(),
            registrations: Arc::new(Mutex::new(SlotMap::with_key())),
            listener: Mutex::new(None),
        })
    }

    /// The document this dispatcher listens on.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Call `on_dismiss` whenever a click lands outside `container`.
    pub fn register<F>(&self, container: ElementId, on_dismiss: F) -> DismissalKey
    where
        F: Fn() + Send + Sync + 'static,
    {
        let key = self.registrations.lock().insert(Registration {
            container,
            on_dismiss: Arc::new(on_dismiss),
        });

        let mut listener = self.listener.lock();
        if listener.is_none() {
            let registrations = Arc::clone(&self.registrations);
            let document = self.document.clone();
            *listener = Some(self.document.add_document_listener(
                EventKind::Click,
                move |event| dispatch(&document, &registrations, event),
            ));
            tracing::trace!(target: targets::PANEL, "dismissal listener installed");
        }
        key
    }

    /// Stop dismissing a container. Returns `true` if it was registered.
    pub fn deregister(&self, key: DismissalKey) -> bool {
        let (removed, now_empty) = {
            let mut registrations = self.registrations.lock();
            let removed = registrations.remove(key).is_some();
            (removed, registrations.is_empty())
        };

        if now_empty && let Some(id) = self.listener.lock().take() {
            self.document.remove_listener(id);
            tracing::trace!(target: targets::PANEL, "dismissal listener removed");
        }
        removed
    }

    /// Number of registered containers.
    pub fn len(&self) -> usize {
        self.registrations.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.lock().is_empty()
    }

    /// Check whether the document-level listener is installed.
    pub fn is_listening(&self) -> bool {
        self.listener.lock().is_some()
    }
}

impl std::fmt::Debug for DismissalDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DismissalDispatcher")
            .field("registrations", &self.len())
            .field("listening", &self.is_listening())
            .finish()
    }
}

fn dispatch(
    document: &Document,
    registrations: &Mutex<SlotMap<DismissalKey, Registration>>,
    event: &Event,
) {
    let snapshot: Vec<(ElementId, DismissFn)> = registrations
        .lock()
        .values()
        .map(|r| (r.container, Arc::clone(&r.on_dismiss)))
        .collect();

    let target = event.target();
    for (container, on_dismiss) in snapshot {
        if !document.contains(container, target) {
            on_dismiss();
        }
    }
}
