//! Auth key data models and API response types.
//!
//! This module defines:
//! - `AuthKey`: Database entity representing an issued credential
//! - `NewAuthKey`: Insert payload handed to storage
//! - `IssuedAuthKey`: Result of issuing a key, the only value carrying the raw key
//! - `AuthKeyResponse` / `IssuedAuthKeyResponse`: Response bodies returned to clients

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Represents an auth key record from the database.
///
/// # Database Table
///
/// Maps to the `auth_keys` table. Each auth key:
/// - Belongs to exactly one user (via `owner_id`), fixed at creation
/// - Is stored as a SHA-256 hash; the raw key never touches the database
/// - Is never deleted, only revoked
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AuthKey {
    /// Unique identifier for this auth key
    ///
    /// This is the internal reference used in logs and listings. It is never
    /// accepted as a credential.
    pub id: Uuid,

    /// SHA-256 hash of the bearer key (64 hex characters)
    ///
    /// Unique across every record, revoked ones included, so a key string is
    /// never issued twice.
    pub key_hash: String,

    /// User that owns this key
    pub owner_id: Uuid,

    /// Timestamp when this key was created
    pub created_at: DateTime<Utc>,

    /// Whether this key has been revoked
    ///
    /// One-way latch: once true it stays true.
    pub revoked: bool,

    /// Timestamp of the first revocation
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Insert payload for a new auth key.
#[derive(Debug, Clone)]
pub struct NewAuthKey {
    pub key_hash: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A freshly issued auth key together with its raw bearer value.
///
/// This is the only place the raw key exists after generation. `Debug`
/// redacts it so it can't end up in log output.
#[derive(Clone)]
pub struct IssuedAuthKey {
    pub record: AuthKey,
    pub key: String,
}

impl fmt::Debug for IssuedAuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedAuthKey")
            .field("record", &self.record)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Response body for auth key listing and lookup.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "owner_id": "7d444840-9dc0-11d1-b245-5ffdce74fad2",
///   "created_at": "2025-12-20T10:00:00Z",
///   "revoked": false,
///   "revoked_at": null
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AuthKeyResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Convert database AuthKey to API AuthKeyResponse.
///
/// This drops the internal `key_hash`.
impl From<AuthKey> for AuthKeyResponse {
    fn from(auth_key: AuthKey) -> Self {
        Self {
            id: auth_key.id,
            owner_id: auth_key.owner_id,
            created_at: auth_key.created_at,
            revoked: auth_key.revoked,
            revoked_at: auth_key.revoked_at,
        }
    }
}

/// Response returned once, when an auth key is created.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "key": "3f9c1a...e07b",
///   "owner_id": "7d444840-9dc0-11d1-b245-5ffdce74fad2",
///   "created_at": "2025-12-20T10:00:00Z",
///   "revoked": false,
///   "revoked_at": null
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct IssuedAuthKeyResponse {
    pub key: String,
    #[serde(flatten)]
    pub auth_key: AuthKeyResponse,
}

impl From<IssuedAuthKey> for IssuedAuthKeyResponse {
    fn from(issued: IssuedAuthKey) -> Self {
        Self {
            key: issued.key,
            auth_key: issued.record.into(),
        }
    }
}
