//! Durable storage for auth keys.
//!
//! `AuthKeyRepository` is the only path to the `auth_keys` records. Each
//! method is a single atomic storage operation; none of them read and then
//! write in separate steps.

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        auth_key::{AuthKey, NewAuthKey},
        scope::ScopeFilter,
    },
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[async_trait]
pub trait AuthKeyRepository: Send + Sync {
    /// Insert a new auth key.
    ///
    /// Returns `Ok(None)` when a record with the same `key_hash` already
    /// exists. The uniqueness check and the insert happen as one operation.
    async fn insert(&self, new_key: NewAuthKey) -> Result<Option<AuthKey>, AppError>;

    /// Records inside `scope`, newest first (`created_at DESC, id DESC`).
    async fn list(
        &self,
        scope: ScopeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuthKey>, AppError>;

    /// Number of records inside `scope`.
    async fn count(&self, scope: ScopeFilter) -> Result<i64, AppError>;

    /// The unrevoked record with this hash, if any.
    ///
    /// Revoked and missing records are both `None`.
    async fn find_active(&self, key_hash: &str) -> Result<Option<AuthKey>, AppError>;

    /// Latch `revoked` on the record with this hash inside `scope`.
    ///
    /// `revoked_at` keeps the time of the first revocation. Returns the
    /// record as stored afterwards, or `None` when nothing matches.
    async fn revoke(&self, key_hash: &str, scope: ScopeFilter)
    -> Result<Option<AuthKey>, AppError>;
}
