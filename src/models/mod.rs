//! Data models representing database entities and API shapes.

/// Auth key entity and its response types
pub mod auth_key;
/// Listing pagination requests and pages
pub mod pagination;
/// Record visibility filters
pub mod scope;
