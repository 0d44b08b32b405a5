//! Business logic services.
//!
//! Services contain the auth key lifecycle, separated from HTTP handlers.

pub mod credential_store;
pub mod key_generator;
