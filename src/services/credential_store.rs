//! Credential store - lifecycle of auth keys.
//!
//! This service handles:
//! - Issuing keys with collision retry
//! - Scoped, paginated listing
//! - Redemption lookup that hides revoked keys
//! - Idempotent revocation
//!
//! Raw key values are never logged. Log lines identify records by `id`.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    config::PageLimits,
    error::AppError,
    models::{
        auth_key::{AuthKey, IssuedAuthKey, NewAuthKey},
        pagination::{Page, Pagination, PaginationQuery},
        scope::ScopeFilter,
    },
    repository::AuthKeyRepository,
    services::key_generator::{KeyGenerator, hash_key},
};

/// How many freshly generated keys `create` tries before giving up.
pub const MAX_KEY_ALLOCATION_ATTEMPTS: usize = 5;

/// Issues, lists, resolves and revokes auth keys.
///
/// Cheap to clone; shared across request handlers.
#[derive(Clone)]
pub struct CredentialStore {
    repository: Arc<dyn AuthKeyRepository>,
    generator: Arc<dyn KeyGenerator>,
    limits: PageLimits,
}

impl CredentialStore {
    pub fn new(
        repository: Arc<dyn AuthKeyRepository>,
        generator: Arc<dyn KeyGenerator>,
        limits: PageLimits,
    ) -> Self {
        Self {
            repository,
            generator,
            limits,
        }
    }

    /// Issue a new auth key for `owner_id`.
    ///
    /// # Process
    ///
    /// 1. Generate a candidate key
    /// 2. Insert its hash; storage rejects duplicates atomically
    /// 3. On collision discard the candidate and go back to 1, at most
    ///    `MAX_KEY_ALLOCATION_ATTEMPTS` times
    ///
    /// The returned `IssuedAuthKey` is the only place the raw key is ever
    /// surfaced.
    ///
    /// # Errors
    ///
    /// - `EntropySourceUnavailable`: random source unreadable (not retried)
    /// - `KeyAllocationExhausted`: every attempt collided
    /// - `Database`: storage failure
    pub async fn create(&self, owner_id: Uuid) -> Result<IssuedAuthKey, AppError> {
        for attempt in 1..=MAX_KEY_ALLOCATION_ATTEMPTS {
            let key = self.generator.generate()?;
            let new_key = NewAuthKey {
                key_hash: hash_key(&key),
                owner_id,
                created_at: Utc::now(),
            };

            if let Some(record) = self.repository.insert(new_key).await? {
                tracing::info!(auth_key_id = %record.id, %owner_id, "auth key created");
                return Ok(IssuedAuthKey { record, key });
            }

            tracing::warn!(attempt, %owner_id, "generated auth key collided, retrying");
        }

        Err(AppError::KeyAllocationExhausted {
            attempts: MAX_KEY_ALLOCATION_ATTEMPTS,
        })
    }

    /// List the auth keys visible under `scope`, newest first.
    ///
    /// Revoked keys are included; listing is for owners and administrators
    /// reviewing history.
    ///
    /// # Errors
    ///
    /// `InvalidPagination` if the page size is non-positive or exceeds the
    /// configured maximum, or the page number is below 1.
    pub async fn list(
        &self,
        scope: ScopeFilter,
        query: &PaginationQuery,
    ) -> Result<Page<AuthKey>, AppError> {
        let pagination = Pagination::from_query(query, self.limits)?;

        let results = self
            .repository
            .list(scope, pagination.limit(), pagination.offset())
            .await?;
        let total = self.repository.count(scope).await?;

        Ok(Page::new(results, pagination, total))
    }

    /// Resolve a presented key to its record, if it is still usable.
    ///
    /// Returns `None` both for keys that never existed and for revoked keys.
    /// Both paths hash the input and run the same single storage probe.
    pub async fn find_active_by_key(&self, key: &str) -> Result<Option<AuthKey>, AppError> {
        self.repository.find_active(&hash_key(key)).await
    }

    /// Revoke a key.
    ///
    /// Idempotent: revoking an already revoked key succeeds and keeps the
    /// original `revoked_at`.
    ///
    /// # Errors
    ///
    /// `AuthKeyNotFound` if no record matches.
    pub async fn revoke(&self, key: &str) -> Result<AuthKey, AppError> {
        self.revoke_within(key, ScopeFilter::Unrestricted).await
    }

    /// Revoke a key only if it falls inside `scope`.
    ///
    /// Keys outside the scope are reported as `AuthKeyNotFound`, the same
    /// as keys that don't exist.
    pub async fn revoke_within(&self, key: &str, scope: ScopeFilter) -> Result<AuthKey, AppError> {
        let record = self
            .repository
            .revoke(&hash_key(key), scope)
            .await?
            .ok_or(AppError::AuthKeyNotFound)?;
        debug_assert!(scope.permits(record.owner_id) && record.revoked);

        tracing::info!(auth_key_id = %record.id, owner_id = %record.owner_id, "auth key revoked");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{
        repository::memory::InMemoryAuthKeyRepository,
        services::key_generator::{
            OsKeyGenerator,
            testing::{BrokenEntropy, ScriptedKeyGenerator},
        },
    };

    fn limits() -> PageLimits {
        PageLimits {
            default_page_size: 20,
            max_page_size: 100,
        }
    }

    fn store_with(
        generator: impl KeyGenerator + 'static,
    ) -> (CredentialStore, Arc<InMemoryAuthKeyRepository>) {
        let repository = Arc::new(InMemoryAuthKeyRepository::new());
        let store = CredentialStore::new(repository.clone(), Arc::new(generator), limits());
        (store, repository)
    }

    fn store() -> (CredentialStore, Arc<InMemoryAuthKeyRepository>) {
        store_with(OsKeyGenerator)
    }

    fn page_query(page: i64, page_size: i64) -> PaginationQuery {
        PaginationQuery {
            page: Some(page),
            page_size: Some(page_size),
        }
    }

    #[tokio::test]
    async fn create_then_redeem_then_revoke() {
        let (store, _) = store();
        let owner = Uuid::new_v4();

        let issued = store.create(owner).await.unwrap();
        assert!(!issued.record.revoked);
        assert_eq!(issued.record.owner_id, owner);

        let found = store.find_active_by_key(&issued.key).await.unwrap();
        assert_eq!(found, Some(issued.record.clone()));

        store.revoke(&issued.key).await.unwrap();
        assert_eq!(store.find_active_by_key(&issued.key).await.unwrap(), None);

        let listed = store
            .list(ScopeFilter::Owner(owner), &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(listed.results.len(), 1);
        assert_eq!(listed.results[0].id, issued.record.id);
        assert!(listed.results[0].revoked);
        assert!(listed.results[0].revoked_at.is_some());
    }

    #[tokio::test]
    async fn raw_key_is_never_stored() {
        let (store, repository) = store();
        let issued = store.create(Uuid::new_v4()).await.unwrap();

        let stored = repository.snapshot().await;
        assert_eq!(stored.len(), 1);
        assert_ne!(stored[0].key_hash, issued.key);
        assert_eq!(stored[0].key_hash, hash_key(&issued.key));
    }

    #[tokio::test]
    async fn two_creates_for_one_owner_yield_distinct_keys() {
        let (store, _) = store();
        let owner = Uuid::new_v4();

        let first = store.create(owner).await.unwrap();
        let second = store.create(owner).await.unwrap();

        assert_ne!(first.key, second.key);
        assert_ne!(first.record.id, second.record.id);
        assert_eq!(first.record.owner_id, second.record.owner_id);
    }

    #[tokio::test]
    async fn collision_is_retried_with_a_fresh_key() {
        let (store, repository) = store_with(ScriptedKeyGenerator::new([
            "taken", "taken", "taken", "fresh",
        ]));

        let first = store.create(Uuid::new_v4()).await.unwrap();
        assert_eq!(first.key, "taken");

        let second = store.create(Uuid::new_v4()).await.unwrap();
        assert_eq!(second.key, "fresh");

        // The discarded candidates were never persisted.
        assert_eq!(repository.snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn collision_with_revoked_key_is_not_reused() {
        let (store, _) = store_with(ScriptedKeyGenerator::new(["reused", "reused", "other"]));

        let first = store.create(Uuid::new_v4()).await.unwrap();
        store.revoke(&first.key).await.unwrap();

        let second = store.create(Uuid::new_v4()).await.unwrap();
        assert_eq!(second.key, "other");
    }

    #[tokio::test]
    async fn exhausted_retries_fail_without_persisting() {
        let (store, repository) = store_with(ScriptedKeyGenerator::repeating(
            "same",
            MAX_KEY_ALLOCATION_ATTEMPTS + 1,
        ));

        store.create(Uuid::new_v4()).await.unwrap();
        let result = store.create(Uuid::new_v4()).await;

        assert!(matches!(
            result,
            Err(AppError::KeyAllocationExhausted { attempts }) if attempts == MAX_KEY_ALLOCATION_ATTEMPTS
        ));
        assert_eq!(repository.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn entropy_failure_aborts_create() {
        let (store, repository) = store_with(BrokenEntropy);

        let result = store.create(Uuid::new_v4()).await;

        assert!(matches!(result, Err(AppError::EntropySourceUnavailable)));
        assert!(repository.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn concurrent_creates_never_share_a_key() {
        let (store, repository) = store();
        let owner = Uuid::new_v4();

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create(owner).await })
            })
            .collect();

        let mut keys = HashSet::new();
        for handle in handles {
            keys.insert(handle.await.unwrap().unwrap().key);
        }

        assert_eq!(keys.len(), 64);
        let hashes: HashSet<String> = repository
            .snapshot()
            .await
            .into_iter()
            .map(|r| r.key_hash)
            .collect();
        assert_eq!(hashes.len(), 64);
    }

    #[tokio::test]
    async fn concurrent_creates_with_same_candidate_persist_it_once() {
        let (store, repository) = store_with(ScriptedKeyGenerator::repeating("contested", 16));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create(Uuid::new_v4()).await })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if let Ok(issued) = handle.await.unwrap() {
                if issued.key == "contested" {
                    winners += 1;
                }
            }
        }

        assert_eq!(winners, 1);
        let contested = repository
            .snapshot()
            .await
            .into_iter()
            .filter(|r| r.key_hash == hash_key("contested"))
            .count();
        assert_eq!(contested, 1);
    }

    #[tokio::test]
    async fn unknown_and_revoked_keys_look_the_same() {
        let (store, _) = store();
        let issued = store.create(Uuid::new_v4()).await.unwrap();
        store.revoke(&issued.key).await.unwrap();

        let revoked = store.find_active_by_key(&issued.key).await.unwrap();
        let unknown = store.find_active_by_key("not-a-real-key").await.unwrap();

        assert_eq!(revoked, None);
        assert_eq!(unknown, None);
    }

    #[tokio::test]
    async fn revoke_is_idempotent_and_keeps_first_timestamp() {
        let (store, _) = store();
        let issued = store.create(Uuid::new_v4()).await.unwrap();

        let first = store.revoke(&issued.key).await.unwrap();
        let second = store.revoke(&issued.key).await.unwrap();

        assert!(first.revoked && second.revoked);
        assert!(first.revoked_at.is_some());
        assert_eq!(first.revoked_at, second.revoked_at);
    }

    #[tokio::test]
    async fn concurrent_revokes_agree_on_revocation_time() {
        let (store, _) = store();
        let issued = store.create(Uuid::new_v4()).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let key = issued.key.clone();
                tokio::spawn(async move { store.revoke(&key).await })
            })
            .collect();

        let mut times = HashSet::new();
        for handle in handles {
            let record = handle.await.unwrap().unwrap();
            assert!(record.revoked);
            times.insert(record.revoked_at);
        }
        assert_eq!(times.len(), 1);
    }

    #[tokio::test]
    async fn revoke_of_unknown_key_is_not_found() {
        let (store, _) = store();
        assert!(matches!(
            store.revoke("missing").await,
            Err(AppError::AuthKeyNotFound)
        ));
    }

    #[tokio::test]
    async fn scoped_revoke_cannot_touch_other_owners() {
        let (store, _) = store();
        let owner = Uuid::new_v4();
        let issued = store.create(owner).await.unwrap();

        let result = store
            .revoke_within(&issued.key, ScopeFilter::Owner(Uuid::new_v4()))
            .await;
        assert!(matches!(result, Err(AppError::AuthKeyNotFound)));
        assert!(store.find_active_by_key(&issued.key).await.unwrap().is_some());

        store
            .revoke_within(&issued.key, ScopeFilter::Owner(owner))
            .await
            .unwrap();
        assert!(store.find_active_by_key(&issued.key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn owner_scope_hides_other_owners() {
        let (store, _) = store();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        for _ in 0..3 {
            store.create(alice).await.unwrap();
        }
        store.create(bob).await.unwrap();

        let page = store
            .list(ScopeFilter::Owner(alice), &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total_results, 3);
        assert!(page.results.iter().all(|r| r.owner_id == alice));

        let everything = store
            .list(ScopeFilter::Unrestricted, &PaginationQuery::default())
            .await
            .unwrap();
        assert_eq!(everything.total_results, 4);
    }

    #[tokio::test]
    async fn pages_enumerate_every_record_exactly_once() {
        let (store, _) = store();
        let owner = Uuid::new_v4();
        for _ in 0..23 {
            store.create(owner).await.unwrap();
        }

        let mut seen = Vec::new();
        let mut page_number = 1;
        loop {
            let page = store
                .list(ScopeFilter::Owner(owner), &page_query(page_number, 5))
                .await
                .unwrap();
            assert_eq!(page.total_results, 23);
            assert_eq!(page.results.len(), std::cmp::min(5, 23 - seen.len()));
            seen.extend(page.results.iter().map(|r| r.id));
            match page.next_page {
                Some(next) => page_number = next,
                None => break,
            }
        }

        assert_eq!(page_number, 5);
        let unique: HashSet<Uuid> = seen.iter().copied().collect();
        assert_eq!(seen.len(), 23);
        assert_eq!(unique.len(), 23);
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let (store, _) = store();
        let owner = Uuid::new_v4();
        for _ in 0..5 {
            store.create(owner).await.unwrap();
        }

        let page = store
            .list(ScopeFilter::Owner(owner), &PaginationQuery::default())
            .await
            .unwrap();
        let ordered = page.results.windows(2).all(|pair| {
            (pair[0].created_at, pair[0].id) >= (pair[1].created_at, pair[1].id)
        });
        assert!(ordered);
    }

    #[tokio::test]
    async fn page_size_bounds_are_enforced() {
        let (store, _) = store();

        for size in [0, -3, 101] {
            let result = store.list(ScopeFilter::Unrestricted, &page_query(1, size)).await;
            assert!(matches!(result, Err(AppError::InvalidPagination(_))));
        }
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let (store, _) = store();
        store.create(Uuid::new_v4()).await.unwrap();

        let page = store
            .list(ScopeFilter::Unrestricted, &page_query(9, 10))
            .await
            .unwrap();
        assert!(page.results.is_empty());
        assert_eq!(page.total_results, 1);
    }
}
