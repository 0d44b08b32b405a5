//! Record visibility filters.

use uuid::Uuid;

/// Restricts which auth key records a caller may observe.
///
/// Produced by the ability layer and applied verbatim by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeFilter {
    /// Every record is visible.
    Unrestricted,
    /// Only records owned by this user are visible.
    Owner(Uuid),
}

impl ScopeFilter {
    /// The owner a query must match, or `None` when unrestricted.
    ///
    /// Used as a nullable SQL parameter: `($1::uuid IS NULL OR owner_id = $1)`.
    pub fn owner(&self) -> Option<Uuid> {
        match self {
            ScopeFilter::Unrestricted => None,
            ScopeFilter::Owner(owner_id) => Some(*owner_id),
        }
    }

    /// Whether a record owned by `owner_id` falls inside this scope.
    pub fn permits(&self, owner_id: Uuid) -> bool {
        self.owner().is_none_or(|scoped| scoped == owner_id)
    }
}
