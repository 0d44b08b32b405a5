//! In-memory auth key storage for tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        auth_key::{AuthKey, NewAuthKey},
        scope::ScopeFilter,
    },
};

use super::AuthKeyRepository;

/// Vec-backed repository with the same semantics as the PostgreSQL one.
///
/// All access goes through one lock, so insert is atomic with respect to
/// the uniqueness check.
#[derive(Debug, Default)]
pub struct InMemoryAuthKeyRepository {
    records: Mutex<Vec<AuthKey>>,
}

impl InMemoryAuthKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored record, including revoked ones.
    pub async fn snapshot(&self) -> Vec<AuthKey> {
        self.records.lock().await.clone()
    }
}

fn newest_first(a: &AuthKey, b: &AuthKey) -> std::cmp::Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

#[async_trait]
impl AuthKeyRepository for InMemoryAuthKeyRepository {
    async fn insert(&self, new_key: NewAuthKey) -> Result<Option<AuthKey>, AppError> {
        let mut records = self.records.lock().await;
        if records.iter().any(|r| r.key_hash == new_key.key_hash) {
            return Ok(None);
        }

        let auth_key = AuthKey {
            id: Uuid::new_v4(),
            key_hash: new_key.key_hash,
            owner_id: new_key.owner_id,
            created_at: new_key.created_at,
            revoked: false,
            revoked_at: None,
        };
        records.push(auth_key.clone());
        Ok(Some(auth_key))
    }

    async fn list(
        &self,
        scope: ScopeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AuthKey>, AppError> {
        let records = self.records.lock().await;
        let mut visible: Vec<AuthKey> = records
            .iter()
            .filter(|r| scope.permits(r.owner_id))
            .cloned()
            .collect();
        visible.sort_by(newest_first);

        Ok(visible
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn count(&self, scope: ScopeFilter) -> Result<i64, AppError> {
        let records = self.records.lock().await;
        Ok(records.iter().filter(|r| scope.permits(r.owner_id)).count() as i64)
    }

    async fn find_active(&self, key_hash: &str) -> Result<Option<AuthKey>, AppError> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .find(|r| r.key_hash == key_hash && !r.revoked)
            .cloned())
    }

    async fn revoke(
        &self,
        key_hash: &str,
        scope: ScopeFilter,
    ) -> Result<Option<AuthKey>, AppError> {
        let mut records = self.records.lock().await;
        let Some(record) = records
            .iter_mut()
            .find(|r| r.key_hash == key_hash && scope.permits(r.owner_id))
        else {
            return Ok(None);
        };

        record.revoked = true;
        record.revoked_at.get_or_insert_with(Utc::now);
        Ok(Some(record.clone()))
    }
}
