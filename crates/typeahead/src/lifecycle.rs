//! Request Lifecycle Manager.
//!
//! Every fetch gets a [`RequestId`] and a [`CancellationToken`]. Starting a
//! request cancels the token of the one it supersedes, and settlement only
//! touches the panel if the settling request is still the active one with an
//! uncancelled token. The check runs under the widget lock, so a superseded
//! response can never render after its successor.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::Instrument;
use typeahead_core::CancellationToken;
use typeahead_core::logging::{span_names, targets};

use crate::suggestion::Suggestion;
use crate::widget::{QueryState, WidgetShared};

/// Unique identifier for a suggestion request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request#{}", self.0)
    }
}

/// The in-flight request of a widget.
#[derive(Debug)]
pub(crate) struct ActiveRequest {
    pub(crate) id: RequestId,
    pub(crate) token: CancellationToken,
}

/// How a fetch ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The source answered; an empty list hides the panel.
    Suggestions(Vec<Suggestion>),
    /// A newer request took over. Nothing is rendered.
    Superseded,
    /// Transport or payload failure. Nothing is rendered.
    Failed,
}

impl WidgetShared {
    /// Start fetching `query`, cancelling the active request first.
    pub(crate) fn start_request(self: &Arc<Self>, state: &mut QueryState, query: String) {
        if let Some(previous) = state.active_request.take() {
            previous.token.cancel();
            tracing::debug!(target: targets::LIFECYCLE, superseded = %previous.id, "request superseded");
        }

        let id = RequestId::next();
        let token = CancellationToken::new();
        state.active_request = Some(ActiveRequest {
            id,
            token: token.clone(),
        });
        tracing::debug!(target: targets::LIFECYCLE, %id, query = %query, "request started");

        let span = tracing::debug_span!(target: targets::LIFECYCLE, span_names::FETCH, %id);
        let shared = Arc::clone(self);
        self.handle.spawn(
            async move {
                let outcome = shared.fetch(&query, &token).await;
                shared.settle(id, &query, outcome);
            }
            .instrument(span),
        );
    }

    async fn fetch(&self, query: &str, token: &CancellationToken) -> FetchOutcome {
        match self.source.fetch(&self.config.endpoint, query, token).await {
            Ok(suggestions) => FetchOutcome::Suggestions(suggestions),
            Err(err) if err.is_cancelled() || token.is_cancelled() => FetchOutcome::Superseded,
            Err(err) => {
                tracing::debug!(target: targets::LIFECYCLE, error = %err, "fetch failed, suggestions suppressed");
                FetchOutcome::Failed
            }
        }
    }

    /// Apply a settled request, unless it has been superseded meanwhile.
    pub(crate) fn settle(&self, id: RequestId, query: &str, outcome: FetchOutcome) {
        let mut state = self.state.lock();

        let is_current = state
            .active_request
            .as_ref()
            .is_some_and(|active| active.id == id && !active.token.is_cancelled());
        if !is_current {
            tracing::debug!(target: targets::LIFECYCLE, %id, "discarding stale result");
            return;
        }
        state.active_request = None;

        match outcome {
            FetchOutcome::Suggestions(suggestions) => {
                tracing::debug!(target: targets::LIFECYCLE, %id, count = suggestions.len(), "request settled");
                self.render_locked(&mut state, &suggestions, query);
            }
            FetchOutcome::Superseded | FetchOutcome::Failed => {}
        }
    }
}
