//! Middleware layer.
//!
//! Middleware wraps request dispatch and is the right place for
//! cross-cutting concerns. Form validation is not middleware here: each
//! handler runs its own rule set (see [`crate::validation`]) so that a
//! rejected form can be re-rendered by the handler that owns it.
//!
//! Built-in middleware:
//! - [`trace`] — per-request span with method, path, status, latency

mod trace;

pub use trace::trace;
