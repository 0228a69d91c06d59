//! Logging facilities for Typeahead.
//!
//! Typeahead uses the `tracing` crate for instrumentation. Nothing is printed
//! unless the host installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("typeahead=debug,typeahead_net=debug")
//!     .init();
//! ```
//!
//! Widget failures never surface to the user, so the logs are the only place
//! where swallowed fetch errors and superseded requests can be observed.

/// Span names used throughout Typeahead for tracing.
pub mod span_names {
    /// A single suggestion fetch, from dispatch to settlement.
    pub const FETCH: &str = "typeahead::fetch";
    /// Document event dispatch.
    pub const DISPATCH_EVENT: &str = "typeahead::dispatch_event";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Document tree and event dispatch.
    pub const DOCUMENT: &str = "typeahead_core::document";
    /// Debounce timers.
    pub const TIMER: &str = "typeahead_core::timer";
    /// Signal/slot system.
    pub const SIGNAL: &str = "typeahead_core::signal";
    /// HTTP layer.
    pub const HTTP: &str = "typeahead_net::http";
    /// Widget attachment and page initialization.
    pub const WIDGET: &str = "typeahead::widget";
    /// Keystroke evaluation and debouncing.
    pub const DISPATCHER: &str = "typeahead::dispatcher";
    /// Request start, supersession and settlement.
    pub const LIFECYCLE: &str = "typeahead::lifecycle";
    /// Rendering, selection and dismissal.
    pub const PANEL: &str = "typeahead::panel";
}
