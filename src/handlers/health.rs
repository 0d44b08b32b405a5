//! Health check endpoint for service monitoring.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::DbPool;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` when the database answers and the schema is migrated
    pub status: &'static str,

    /// `connected` or `unreachable`
    pub database: &'static str,

    /// Whether the `auth_keys` table exists
    pub schema_ready: bool,

    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// # Response
///
/// - **200 OK**: database reachable and `auth_keys` present
/// - **503 Service Unavailable**: database unreachable or schema missing
///
/// ```json
/// {
///   "status": "healthy",
///   "database": "connected",
///   "schema_ready": true,
///   "timestamp": "2025-12-21T19:00:00Z"
/// }
/// ```
pub async fn health_check(State(pool): State<DbPool>) -> (StatusCode, Json<HealthResponse>) {
    let probe: Result<bool, sqlx::Error> =
        sqlx::query_scalar("SELECT to_regclass('public.auth_keys') IS NOT NULL")
            .fetch_one(&pool)
            .await;

    let (database, schema_ready) = match probe {
        Ok(ready) => ("connected", ready),
        Err(err) => {
            tracing::warn!(error = %err, "health check could not reach database");
            ("unreachable", false)
        }
    };

    let (status_code, status) = if schema_ready {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            database,
            schema_ready,
            timestamp: Utc::now(),
        }),
    )
}
