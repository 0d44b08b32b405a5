//! Ability evaluation for auth key actions.
//!
//! An `Ability` answers two questions for a session: may it perform an
//! action at all, and which auth key records may it see. Handlers evaluate
//! it before calling into the credential store and pass the resulting
//! `ScopeFilter` down explicitly.

use crate::{
    error::AppError,
    middleware::session::{Role, Session},
    models::scope::ScopeFilter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Revoke,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ability {
    role: Role,
    scope: ScopeFilter,
}

impl Ability {
    /// Administrators and auditors see every key; users see only their own.
    pub fn for_session(session: &Session) -> Self {
        let scope = match session.role {
            Role::Admin | Role::Auditor => ScopeFilter::Unrestricted,
            Role::User => ScopeFilter::Owner(session.user_id),
        };
        Self {
            role: session.role,
            scope,
        }
    }

    /// Auditors are read-only; users and admins may do everything within
    /// their scope.
    pub fn can(&self, action: Action) -> bool {
        match (self.role, action) {
            (Role::User | Role::Admin, _) => true,
            (Role::Auditor, Action::Read) => true,
            (Role::Auditor, Action::Create | Action::Revoke) => false,
        }
    }

    /// `Forbidden` unless the action is permitted.
    pub fn ensure(&self, action: Action) -> Result<(), AppError> {
        if self.can(action) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub fn scope(&self) -> ScopeFilter {
        self.scope
    }
}
