pub(crate) mod authn;
pub(crate) mod health;
pub(crate) mod milestones;
pub(crate) mod permissions;
pub(crate) mod projects;

use crate::api::authn::authentication_middleware;
use crate::state::AppState;
use axum::{middleware, Router};

/// Combines all API routes into a single router
pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(protected_routes(state))
}

/// Creates a router for protected routes that require a bearer token
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(projects::router())
        .merge(milestones::router())
        .merge(permissions::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_middleware,
        ))
}
