//! Session resolution middleware.
//!
//! Sessions are established upstream (by the gateway that terminates user
//! login). The gateway forwards the authenticated identity in two headers,
//! which this middleware turns into a `Session`:
//!
//! - `X-Session-User-Id`: UUID of the authenticated user
//! - `X-Session-Role`: `user`, `admin` or `auditor` (defaults to `user`)
//!
//! Requests without a valid identity are rejected with HTTP 401.

use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use uuid::Uuid;

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-session-user-id";
pub const ROLE_HEADER: &str = "x-session-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
    /// Read-only access to every key, for reviewing history.
    Auditor,
}

impl Role {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            "auditor" => Some(Role::Auditor),
            _ => None,
        }
    }
}

/// Authenticated caller attached to session-protected requests.
///
/// Handlers extract it with `Extension<Session>`; the `user_id` is the only
/// source of key ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub role: Role,
}

impl Session {
    /// Resolve the session from forwarded gateway headers.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let user_id = headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .ok_or(AppError::Unauthenticated)?;

        let role = match headers.get(ROLE_HEADER) {
            None => Role::User,
            Some(value) => value
                .to_str()
                .ok()
                .and_then(Role::parse)
                .ok_or(AppError::Unauthenticated)?,
        };

        Ok(Self { user_id, role })
    }
}

/// Session middleware function.
///
/// # Flow
///
/// 1. Read the forwarded identity headers
/// 2. If valid: inject `Session` into request extensions, call next handler
/// 3. Otherwise: return 401 Unauthorized
pub async fn session_middleware(mut request: Request, next: Next) -> Result<Response, AppError> {
    let session = Session::from_headers(request.headers())?;
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}
