//! HTTP router and shared application state.

use axum::{
    Router,
    extract::{FromRef, MatchedPath, Request},
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::{db::DbPool, handlers, middleware, services::credential_store::CredentialStore};

/// State shared with every handler.
///
/// Handlers extract only the part they need (`State<DbPool>` or
/// `State<CredentialStore>`) through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub store: CredentialStore,
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for CredentialStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    // Routes acting on behalf of a signed-in user
    let session_routes = Router::new()
        .route(
            "/api/v1/auth-keys",
            get(handlers::auth_keys::list_auth_keys).post(handlers::auth_keys::create_auth_key),
        )
        .route(
            "/api/v1/auth-keys/{auth_key}/revoke",
            post(handlers::auth_keys::revoke_auth_key),
        )
        .route_layer(axum_middleware::from_fn(
            middleware::session::session_middleware,
        ));

    Router::new()
        // Public routes (no session required)
        .route("/health", get(handlers::health::health_check))
        // Redemption: holding the key is the credential
        .route(
            "/api/v1/auth-keys/{auth_key}",
            get(handlers::auth_keys::get_auth_key),
        )
        .merge(session_routes)
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(state)
}

/// Request span carrying the route template, never the concrete uri.
///
/// Auth key routes embed the raw bearer key in the path, so the uri must
/// stay out of every log line.
fn request_span(request: &Request) -> Span {
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str);

    tracing::debug_span!("request", method = %request.method(), matched_path)
}
