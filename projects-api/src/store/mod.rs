use projects_model::{
    Milestone, MilestoneStatus, PermissionGrant, PermissionLevel, Project, UserProfile,
};
use thiserror::Error;

pub mod memory;

/// Errors surfaced by the persistence collaborator
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("an item with id {0} already exists")]
    Duplicate(i64),
    #[error("concurrent modification detected for id {0}")]
    Conflict(i64),
}

/// Repository interface over the permission and project tables.
///
/// The real system talks to a relational database through an ORM; this trait
/// is the seam that stands in for it. Implementations must be thread-safe and
/// are shared behind an `Arc` across all request handlers.
///
/// Grant lookups make absence explicit: `grant_for` returns the first grant
/// matching the (subject, project) pair, or `None` when the subject has no
/// access at all.
#[async_trait::async_trait]
pub trait DataBackend: Send + Sync {
    /// All projects, without their collections
    async fn list_projects(&self) -> Vec<Project>;

    /// A single project with its milestones and permission grants attached
    async fn get_project(&self, id: i64) -> Option<Project>;

    async fn project_exists(&self, id: i64) -> bool;

    /// Insert a new project; fails with [`StoreError::Duplicate`] when the id
    /// is taken
    async fn insert_project(&self, project: Project) -> Result<(), StoreError>;

    /// Replace an existing project row.
    ///
    /// Fails with [`StoreError::Conflict`] when the row is gone by save time,
    /// which is when an optimistic-concurrency ORM raises as well.
    async fn update_project(&self, project: Project) -> Result<(), StoreError>;

    /// Remove a project, deleting its permission grants and milestones first
    /// so the referential invariant holds at every point
    async fn remove_project(&self, id: i64) -> Option<Project>;

    /// First grant matching (subject, project), if any
    async fn grant_for(&self, user_id: &str, project_id: i64) -> Option<PermissionGrant>;

    async fn grants_for_user(&self, user_id: &str) -> Vec<PermissionGrant>;

    async fn grants_for_project(&self, project_id: i64) -> Vec<PermissionGrant>;

    /// Add a grant; `false` when one already exists for the pair
    async fn insert_grant(&self, grant: PermissionGrant) -> bool;

    /// Replace the grant for the pair; `false` when none exists
    async fn update_grant(&self, grant: PermissionGrant) -> bool;

    /// Remove the grant for the pair; `false` when none exists
    async fn remove_grant(&self, user_id: &str, project_id: i64) -> bool;

    async fn get_milestone(&self, id: i64) -> Option<Milestone>;

    async fn insert_milestone(&self, milestone: Milestone) -> Result<(), StoreError>;

    /// Replace an existing milestone; `false` when it does not exist
    async fn update_milestone(&self, milestone: Milestone) -> bool;

    /// Remove a milestone; `false` when it does not exist
    async fn remove_milestone(&self, id: i64) -> bool;

    async fn milestone_statuses(&self) -> Vec<MilestoneStatus>;

    async fn upsert_profile(&self, profile: UserProfile);

    async fn profiles(&self, ids: &[String]) -> Vec<UserProfile>;
}

/// Populate the store with the sample dataset the original demo shipped.
pub async fn seed_demo_data(store: &dyn DataBackend) {
    for (id, first, last, email) in [
        ("user1", "Sam", "Poole", "sam.poole@example.com"),
        ("user2", "Riley", "Chen", "riley.chen@example.com"),
        ("user3", "Avery", "Kim", "avery.kim@example.com"),
    ] {
        store
            .upsert_profile(UserProfile {
                id: id.to_string(),
                first_name: first.to_string(),
                last_name: last.to_string(),
                email: Some(email.to_string()),
            })
            .await;
    }

    for (id, name, description) in [
        (1, "Website Redesign", "Refresh of the public site"),
        (2, "Mobile App", "Companion application"),
    ] {
        let _ = store
            .insert_project(Project {
                id,
                name: name.to_string(),
                description: Some(description.to_string()),
                milestones: Vec::new(),
                user_permissions: Vec::new(),
            })
            .await;
    }

    for (id, name, project_id, status) in [
        (1, "Wireframes approved", 1, 3),
        (2, "Content migrated", 1, 2),
        (3, "Beta release", 2, 1),
    ] {
        let _ = store
            .insert_milestone(Milestone {
                id,
                name: name.to_string(),
                project_id,
                milestone_status_id: status,
            })
            .await;
    }

    for (user, project, level) in [
        ("user1", 1, PermissionLevel::Edit),
        ("user2", 1, PermissionLevel::View),
        ("user3", 1, PermissionLevel::Admin),
        ("user1", 2, PermissionLevel::View),
        ("user2", 2, PermissionLevel::Edit),
    ] {
        store
            .insert_grant(PermissionGrant {
                user_profile_id: user.to_string(),
                project_id: Some(project),
                level,
            })
            .await;
    }
}
