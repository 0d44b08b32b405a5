//! PostgreSQL-backed auth key storage.

use async_trait::async_trait;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        auth_key::{AuthKey, NewAuthKey},
        scope::ScopeFilter,
    },
};

use super::AuthKeyRepository;

/// `auth_keys` table access through a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgAuthKeyRepository {
    pool: DbPool,
}

impl PgAuthKeyRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthKeyRepository for PgAuthKeyRepository {
    async fn insert(&self, new_key: NewAuthKey) -> Result<Option<AuthKey>, AppError> {
        // The UNIQUE constraint on key_hash decides collisions; a conflicting
        // row yields no RETURNING output instead of an error.
        let auth_key = sqlx::query_as::<_, AuthKey>(
            r#"
            INSERT INTO auth_keys (key_hash, owner_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (key_hash) DO NOTHING
            RETURNING id, key_hash, owner_id, created_at, revoked, revoked_at
            "#,
        )
        .bind(&new_key.key_hash)
        .bind(new_key.owner_id)
        .bind(new_key.created_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(auth_key)
    }

    async fn list(
        &self,
        scope: ScopeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuthKey>, AppError> {
        let auth_keys = sqlx::query_as::<_, AuthKey>(
            r#"
            SELECT id, key_hash, owner_id, created_at, revoked, revoked_at
            FROM auth_keys
            WHERE ($1::uuid IS NULL OR owner_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(scope.owner())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(auth_keys)
    }

    async fn count(&self, scope: ScopeFilter) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM auth_keys WHERE ($1::uuid IS NULL OR owner_id = $1)",
        )
        .bind(scope.owner())
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn find_active(&self, key_hash: &str) -> Result<Option<AuthKey>, AppError> {
        let auth_key = sqlx::query_as::<_, AuthKey>(
            r#"
            SELECT id, key_hash, owner_id, created_at, revoked, revoked_at
            FROM auth_keys
            WHERE key_hash = $1 AND revoked = false
            "#,
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(auth_key)
    }

    async fn revoke(
        &self,
        key_hash: &str,
        scope: ScopeFilter,
    ) -> Result<Option<AuthKey>, AppError> {
        // COALESCE keeps the first revocation time when concurrent or
        // repeated revokes hit the same row.
        let auth_key = sqlx::query_as::<_, AuthKey>(
            r#"
            UPDATE auth_keys
            SET revoked = true,
                revoked_at = COALESCE(revoked_at, NOW())
            WHERE key_hash = $1
              AND ($2::uuid IS NULL OR owner_id = $2)
            RETURNING id, key_hash, owner_id, created_at, revoked, revoked_at
            "#,
        )
        .bind(key_hash)
        .bind(scope.owner())
        .fetch_optional(&self.pool)
        .await?;

        Ok(auth_key)
    }
}
