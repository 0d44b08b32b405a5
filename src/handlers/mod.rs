//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (path, query, session)
//! 2. Evaluates the caller's ability and calls the credential store
//! 3. Returns HTTP response (JSON, status code)

/// Auth key endpoints
pub mod auth_keys;
/// Service health endpoint
pub mod health;
