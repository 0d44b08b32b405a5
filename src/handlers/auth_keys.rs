//! Auth key HTTP handlers.
//!
//! This module implements the auth key API endpoints:
//! - GET /api/v1/auth-keys - List auth keys visible to the caller
//! - POST /api/v1/auth-keys - Create an auth key for the caller
//! - GET /api/v1/auth-keys/:auth_key - Resolve an auth key (only if not revoked)
//! - POST /api/v1/auth-keys/:auth_key/revoke - Revoke an auth key

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    error::AppError,
    middleware::{
        ability::{Ability, Action},
        session::Session,
    },
    models::{
        auth_key::{AuthKeyResponse, IssuedAuthKeyResponse},
        pagination::{Page, PaginationQuery},
    },
    services::credential_store::CredentialStore,
};

/// List auth keys.
///
/// # Endpoint
///
/// `GET /api/v1/auth-keys?page=1&page_size=20`
///
/// # Authentication
///
/// Requires a session. Users see their own keys, administrators and
/// auditors see all.
/// Revoked keys are included.
///
/// # Response
///
/// - **Success (200 OK)**: One page of keys, newest first
/// - **Error (400)**: Page size non-positive or above the configured maximum
/// - **Error (401)**: No session
///
/// ```json
/// {
///   "results": [
///     {
///       "id": "550e8400-e29b-41d4-a716-446655440000",
///       "owner_id": "7d444840-9dc0-11d1-b245-5ffdce74fad2",
///       "created_at": "2025-12-20T10:00:00Z",
///       "revoked": true,
///       "revoked_at": "2025-12-21T08:30:00Z"
///     }
///   ],
///   "page": 1,
///   "page_size": 20,
///   "total_results": 1,
///   "total_pages": 1
/// }
/// ```
pub async fn list_auth_keys(
    State(store): State<CredentialStore>,
    Extension(session): Extension<Session>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<Page<AuthKeyResponse>>, AppError> {
    let ability = Ability::for_session(&session);
    ability.ensure(Action::Read)?;

    let page = store.list(ability.scope(), &query).await?;

    Ok(Json(page.map(Into::into)))
}

/// Create an auth key for the current user.
///
/// # Endpoint
///
/// `POST /api/v1/auth-keys`
///
/// # Authentication
///
/// Requires a session. The owner is always the session user; the request
/// body is not consulted.
///
/// # Response
///
/// - **Success (201 Created)**: The new key. `key` is shown only here.
/// - **Error (401)**: No session
/// - **Error (403)**: Read-only role
/// - **Error (500)**: Random source unavailable or key allocation exhausted
///
/// ```json
/// {
///   "key": "3f9c1a...e07b",
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "owner_id": "7d444840-9dc0-11d1-b245-5ffdce74fad2",
///   "created_at": "2025-12-20T10:00:00Z",
///   "revoked": false,
///   "revoked_at": null
/// }
/// ```
pub async fn create_auth_key(
    State(store): State<CredentialStore>,
    Extension(session): Extension<Session>,
) -> Result<(StatusCode, Json<IssuedAuthKeyResponse>), AppError> {
    Ability::for_session(&session).ensure(Action::Create)?;

    let issued = store.create(session.user_id).await?;

    Ok((StatusCode::CREATED, Json(issued.into())))
}

/// Resolve an auth key, typically when it is presented to authorize a download.
///
/// # Endpoint
///
/// `GET /api/v1/auth-keys/:auth_key`
///
/// # Authentication
///
/// None: possession of the key is the credential.
///
/// # Response
///
/// - **Success (200 OK)**: Key metadata
/// - **Error (404)**: Key unknown or revoked; the two are indistinguishable
pub async fn get_auth_key(
    State(store): State<CredentialStore>,
    Path(auth_key): Path<String>,
) -> Result<Json<AuthKeyResponse>, AppError> {
    let record = store
        .find_active_by_key(&auth_key)
        .await?
        .ok_or(AppError::AuthKeyNotFound)?;

    Ok(Json(record.into()))
}

/// Revoke an auth key.
///
/// # Endpoint
///
/// `POST /api/v1/auth-keys/:auth_key/revoke`
///
/// # Authentication
///
/// Requires a session. Users can revoke only their own keys; administrators
/// can revoke any key. Repeating the call is harmless.
///
/// # Response
///
/// - **Success (200 OK)**: Key metadata with `revoked: true`
/// - **Error (403)**: Read-only role
/// - **Error (404)**: No matching key within the caller's scope
pub async fn revoke_auth_key(
    State(store): State<CredentialStore>,
    Extension(session): Extension<Session>,
    Path(auth_key): Path<String>,
) -> Result<Json<AuthKeyResponse>, AppError> {
    let ability = Ability::for_session(&session);
    ability.ensure(Action::Revoke)?;

    let record = store.revoke_within(&auth_key, ability.scope()).await?;

    Ok(Json(record.into()))
}
