//! Debounced Query Dispatcher.
//!
//! Turns every input event into at most one pending timer. When the timer
//! fires and claims itself, the query becomes the last submitted query and is
//! handed to the lifecycle.

use std::sync::Arc;

use typeahead_core::TimerId;
use typeahead_core::logging::targets;

use crate::widget::WidgetShared;

impl WidgetShared {
    /// Evaluate the input's current value.
    pub(crate) fn handle_input(self: &Arc<Self>) {
        let Ok(value) = self.document.value(self.input) else {
            return;
        };
        let query = value.trim().to_string();
        let mut state = self.state.lock();

        if query.chars().count() < self.config.min_query_length {
            tracing::trace!(target: targets::DISPATCHER, query = %query, "below minimum length");
            state.timer.cancel();
            // Leave the network call running but make sure its result is ignored.
            if let Some(active) = state.active_request.take() {
                tracing::debug!(target: targets::DISPATCHER, id = %active.id, "result suppressed");
            }
            self.hide_locked(&mut state);
            return;
        }

        if query == state.last_submitted_query {
            tracing::trace!(target: targets::DISPATCHER, query = %query, "unchanged query");
            // A timer armed for an edit the user has since undone must not fire.
            state.timer.cancel();
            return;
        }

        tracing::trace!(target: targets::DISPATCHER, query = %query, "debouncing");
        let shared = Arc::clone(self);
        state
            .timer
            .start(&self.handle, self.config.debounce, move |id| {
                shared.debounce_elapsed(id, query);
            });
    }

    fn debounce_elapsed(self: &Arc<Self>, id: TimerId, query: String) {
        let mut state = self.state.lock();
        if !state.timer.claim(id) {
            return;
        }
        tracing::debug!(target: targets::DISPATCHER, query = %query, "dispatching query");
        state.last_submitted_query.clone_from(&query);
        self.start_request(&mut state, query);
    }
}
