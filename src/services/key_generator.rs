//! Auth key generation and hashing.
//!
//! Keys are 32 bytes read straight from the operating system's secure
//! random source, hex encoded (64 URL-safe characters). They carry no
//! information about their owner or creation time.

use rand::{TryRngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

use crate::error::AppError;

/// Number of random bytes in a generated key (256 bits).
pub const KEY_BYTES: usize = 32;

/// Source of new candidate key strings.
pub trait KeyGenerator: Send + Sync {
    /// Produce one new candidate key.
    ///
    /// # Errors
    ///
    /// `EntropySourceUnavailable` if the secure random source can't be read.
    fn generate(&self) -> Result<String, AppError>;
}

/// Key generator backed by the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsKeyGenerator;

impl KeyGenerator for OsKeyGenerator {
    fn generate(&self) -> Result<String, AppError> {
        let mut bytes = [0u8; KEY_BYTES];
        // No fallback to a weaker generator: failure aborts the caller.
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|_| AppError::EntropySourceUnavailable)?;
        Ok(hex::encode(bytes))
    }
}

/// SHA-256 digest of a raw key, as stored in `auth_keys.key_hash`.
///
/// Lookups hash the presented key first, so storage only ever compares
/// digests.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}
