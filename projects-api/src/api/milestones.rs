use crate::api::authn::Subject;
use crate::errors::ApiError;
use crate::guard::check_milestone_access;
use crate::openapi::MILESTONES_TAG;
use crate::state::AppState;
use crate::store::StoreError;
use axum::{
    extract::{Json, Path, State},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Extension, Router,
};
use http::StatusCode;
use projects_model::{Milestone, MilestoneStatus};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/Projects/Milestones", post(create_milestone))
        .route(
            "/Projects/Milestones/{id}",
            put(update_milestone).delete(delete_milestone),
        )
        .route("/Projects/MilestoneStatuses", get(milestone_statuses))
}

/// Create a milestone under its parent project.
///
/// The duplicate-id check runs before the access check so that a conflict is
/// reported regardless of permissions.
#[utoipa::path(
    post,
    path = "/Projects/Milestones",
    tag = MILESTONES_TAG,
    request_body = Milestone,
    responses(
        (status = 201, description = "Milestone created", body = Milestone),
        (status = 403, description = "Caller holds no edit-level grant on the parent project"),
        (status = 409, description = "A milestone with this id already exists")
    )
)]
async fn create_milestone(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Json(milestone): Json<Milestone>,
) -> Result<Response, ApiError> {
    if state.store.get_milestone(milestone.id).await.is_some() {
        return Err(ApiError::conflict(format!(
            "milestone {} already exists",
            milestone.id
        )));
    }

    if !check_milestone_access(state.store.as_ref(), &subject, &milestone).await {
        return Err(ApiError::forbidden(
            "edit access to the parent project is required",
        ));
    }

    match state.store.insert_milestone(milestone.clone()).await {
        Ok(()) => Ok((StatusCode::CREATED, Json(milestone)).into_response()),
        Err(StoreError::Duplicate(id)) => {
            Err(ApiError::conflict(format!("milestone {id} already exists")))
        }
        Err(err) => Err(ApiError::internal(err)),
    }
}

/// Update a milestone's name and status.
#[utoipa::path(
    put,
    path = "/Projects/Milestones/{id}",
    tag = MILESTONES_TAG,
    request_body = Milestone,
    responses(
        (status = 200, description = "Updated milestone", body = Milestone),
        (status = 400, description = "Path id does not match body id"),
        (status = 403, description = "Caller holds no edit-level grant on the parent project"),
        (status = 404, description = "Milestone does not exist")
    )
)]
async fn update_milestone(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<i64>,
    Json(milestone): Json<Milestone>,
) -> Result<Response, ApiError> {
    if milestone.id != id {
        return Err(ApiError::bad_request("path id does not match body id"));
    }

    let Some(mut item) = state.store.get_milestone(id).await else {
        return Err(ApiError::not_found("milestone not found"));
    };

    // guard against the stored item: the parent relationship is not
    // reassignable through this endpoint
    if !check_milestone_access(state.store.as_ref(), &subject, &item).await {
        return Err(ApiError::forbidden(
            "edit access to the parent project is required",
        ));
    }

    item.name = milestone.name;
    item.milestone_status_id = milestone.milestone_status_id;
    if !state.store.update_milestone(item.clone()).await {
        return Err(ApiError::not_found("milestone not found"));
    }

    Ok((StatusCode::OK, Json(item)).into_response())
}

/// Delete a milestone.
#[utoipa::path(
    delete,
    path = "/Projects/Milestones/{id}",
    tag = MILESTONES_TAG,
    responses(
        (status = 200, description = "Milestone deleted"),
        (status = 403, description = "Caller holds no edit-level grant on the parent project"),
        (status = 404, description = "Milestone does not exist")
    )
)]
async fn delete_milestone(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let Some(item) = state.store.get_milestone(id).await else {
        return Err(ApiError::not_found("milestone not found"));
    };

    if !check_milestone_access(state.store.as_ref(), &subject, &item).await {
        return Err(ApiError::forbidden(
            "edit access to the parent project is required",
        ));
    }

    state.store.remove_milestone(id).await;
    Ok(StatusCode::OK.into_response())
}

/// Milestone status reference data.
#[utoipa::path(
    get,
    path = "/Projects/MilestoneStatuses",
    tag = MILESTONES_TAG,
    responses(
        (status = 200, description = "Available milestone statuses", body = Vec<MilestoneStatus>)
    )
)]
async fn milestone_statuses(State(state): State<AppState>) -> Response {
    let statuses = state.store.milestone_statuses().await;
    (StatusCode::OK, Json(statuses)).into_response()
}
