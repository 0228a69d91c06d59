//! Core systems for Typeahead.
//!
//! This crate provides the foundational pieces the widget is built on:
//!
//! - [`Document`]: the element tree a widget binds to, with attributes, form
//!   values, selectors and bubbling events
//! - [`Signal`]: type-safe callbacks with snapshot-then-invoke emission
//! - [`DebounceTimer`]: a single-slot deferred callback
//! - [`CancellationToken`]: cooperative cancellation for in-flight work
//! - [`runtime`]: the tokio runtime widgets schedule onto

pub mod cancellation;
pub mod document;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod selector;
pub mod signal;
pub mod timer;

pub use cancellation::CancellationToken;
pub use document::{ClickOutcome, Document, ElementId, Event, EventKind, ListenerId};
pub use error::{DocumentError, Result};
pub use selector::Selector;
pub use signal::{ConnectionId, Signal};
pub use timer::{DebounceTimer, TimerId};
