use crate::errors::ApiError;
use crate::openapi::PERMISSIONS_TAG;
use crate::state::AppState;
use axum::{
    extract::{Json, Query, State},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use http::StatusCode;
use projects_model::PermissionGrant;
use serde::Deserialize;
use utoipa::IntoParams;

pub(super) fn router() -> Router<AppState> {
    Router::new().route(
        "/UserPermissions",
        post(create_permission)
            .put(update_permission)
            .delete(remove_permission),
    )
}

/// Selector for a single (subject, project) grant
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
struct GrantSelector {
    user_id: String,
    project_id: i64,
}

/// Grant a subject access to a project.
#[utoipa::path(
    post,
    path = "/UserPermissions",
    tag = PERMISSIONS_TAG,
    request_body = PermissionGrant,
    responses(
        (status = 201, description = "Grant created", body = PermissionGrant),
        (status = 409, description = "A grant for this subject and project already exists")
    )
)]
async fn create_permission(
    State(state): State<AppState>,
    Json(grant): Json<PermissionGrant>,
) -> Result<Response, ApiError> {
    if !state.store.insert_grant(grant.clone()).await {
        return Err(ApiError::conflict(
            "a grant for this subject and project already exists",
        ));
    }
    Ok((StatusCode::CREATED, Json(grant)).into_response())
}

/// Change the level of an existing grant.
#[utoipa::path(
    put,
    path = "/UserPermissions",
    tag = PERMISSIONS_TAG,
    request_body = PermissionGrant,
    responses(
        (status = 200, description = "Updated grant", body = PermissionGrant),
        (status = 404, description = "No grant exists for this subject and project")
    )
)]
async fn update_permission(
    State(state): State<AppState>,
    Json(grant): Json<PermissionGrant>,
) -> Result<Response, ApiError> {
    if !state.store.update_grant(grant.clone()).await {
        return Err(ApiError::not_found(
            "no grant exists for this subject and project",
        ));
    }
    Ok((StatusCode::OK, Json(grant)).into_response())
}

/// Revoke a subject's access to a project.
#[utoipa::path(
    delete,
    path = "/UserPermissions",
    tag = PERMISSIONS_TAG,
    params(GrantSelector),
    responses(
        (status = 204, description = "Grant removed"),
        (status = 404, description = "No grant exists for this subject and project")
    )
)]
async fn remove_permission(
    State(state): State<AppState>,
    Query(selector): Query<GrantSelector>,
) -> Result<Response, ApiError> {
    if !state
        .store
        .remove_grant(&selector.user_id, selector.project_id)
        .await
    {
        return Err(ApiError::not_found(
            "no grant exists for this subject and project",
        ));
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}
