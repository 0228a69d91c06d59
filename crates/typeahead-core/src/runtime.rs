//! Runtime management for async operations.
//!
//! Widgets schedule their timers and fetches on a tokio runtime. When the host
//! is already inside one (the common case for servers and tests), that runtime
//! is used; otherwise a small global runtime is created on first use.

use std::sync::OnceLock;

use tokio::runtime::{Handle, Runtime};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Initialize the global fallback runtime.
///
/// Calling this is optional; [`handle`] creates the runtime lazily.
pub fn init() -> &'static Runtime {
    RUNTIME.get_or_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("typeahead-async")
            .enable_all()
            .build()
            .expect("Failed to create tokio runtime")
    })
}

/// Get a handle to the runtime widgets should use.
///
/// Prefers the runtime the caller is running on, falling back to the global
/// runtime.
pub fn handle() -> Handle {
    Handle::try_current().unwrap_or_else(|_| init().handle().clone())
}
