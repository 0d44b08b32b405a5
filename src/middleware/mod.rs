//! HTTP middleware components.
//!
//! Session resolution runs before protected route handlers; ability
//! evaluation is called by those handlers before touching the store.

/// Per-session permission and visibility decisions
pub mod ability;
/// Forwarded session resolution middleware
pub mod session;
