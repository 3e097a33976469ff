use utoipa::OpenApi;

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const PROJECTS_TAG: &str = "Projects API";
pub(crate) const MILESTONES_TAG: &str = "Milestones API";
pub(crate) const PERMISSIONS_TAG: &str = "User Permissions API";

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = PROJECTS_TAG, description = "Project resource endpoints"),
        (name = MILESTONES_TAG, description = "Milestone resource endpoints"),
        (name = PERMISSIONS_TAG, description = "Permission grant endpoints"),
    ),
    info(
        title = "Projects API",
        description = "Resource API enforcing per-project authorization from a permission-grant table",
        version = "0.1.0"
    )
)]
pub(crate) struct ApiDoc;
