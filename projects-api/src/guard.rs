//! Per-resource access checks backed by the permission-grant table.
//!
//! Every check is a plain lookup over current grant state and runs to
//! completion before any mutating store operation. A denial maps to 403 at
//! the endpoint layer, distinct from 404 for missing resources.

use crate::api::authn::Subject;
use crate::store::DataBackend;
use projects_model::Milestone;

/// Decide whether `subject` may access a project.
///
/// No grant means deny. With `require_edit`, the grant's level must satisfy
/// an edit check (Admin counts); otherwise any grant grants view access.
pub async fn check_project_access(
    store: &dyn DataBackend,
    subject: &Subject,
    project_id: i64,
    require_edit: bool,
) -> bool {
    match store.grant_for(subject.id(), project_id).await {
        Some(grant) => !require_edit || grant.level.grants_edit(),
        None => false,
    }
}

/// Milestone mutations require edit access on the parent project; uniform
/// for create, update and delete.
pub async fn check_milestone_access(
    store: &dyn DataBackend,
    subject: &Subject,
    milestone: &Milestone,
) -> bool {
    check_project_access(store, subject, milestone.project_id, true).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use projects_model::{PermissionGrant, PermissionLevel, Project};

    async fn store_with_grant(level: PermissionLevel) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_project(Project {
                id: 42,
                name: "Launch".to_string(),
                description: None,
                milestones: Vec::new(),
                user_permissions: Vec::new(),
            })
            .await
            .unwrap();
        store
            .insert_grant(PermissionGrant {
                user_profile_id: "u1".to_string(),
                project_id: Some(42),
                level,
            })
            .await;
        store
    }

    #[tokio::test]
    async fn test_no_grant_denies_even_view() {
        let store = MemoryStore::new();
        let subject = Subject::new("u1");
        assert!(!check_project_access(&store, &subject, 42, false).await);
        assert!(!check_project_access(&store, &subject, 42, true).await);
    }

    #[tokio::test]
    async fn test_any_grant_allows_view() {
        let store = store_with_grant(PermissionLevel::View).await;
        let subject = Subject::new("u1");
        assert!(check_project_access(&store, &subject, 42, false).await);
    }

    #[tokio::test]
    async fn test_view_grant_denies_edit() {
        let store = store_with_grant(PermissionLevel::View).await;
        let subject = Subject::new("u1");
        assert!(!check_project_access(&store, &subject, 42, true).await);
    }

    #[tokio::test]
    async fn test_edit_and_admin_grants_allow_edit() {
        for level in [PermissionLevel::Edit, PermissionLevel::Admin] {
            let store = store_with_grant(level).await;
            let subject = Subject::new("u1");
            assert!(check_project_access(&store, &subject, 42, true).await);
        }
    }

    #[tokio::test]
    async fn test_grant_for_other_subject_does_not_leak() {
        let store = store_with_grant(PermissionLevel::Edit).await;
        let subject = Subject::new("u2");
        assert!(!check_project_access(&store, &subject, 42, false).await);
    }

    #[tokio::test]
    async fn test_milestone_check_uses_parent_project() {
        let store = store_with_grant(PermissionLevel::Edit).await;
        let milestone = Milestone {
            id: 7,
            name: "Kickoff".to_string(),
            project_id: 42,
            milestone_status_id: 1,
        };
        assert!(check_milestone_access(&store, &Subject::new("u1"), &milestone).await);

        let foreign = Milestone {
            project_id: 99,
            ..milestone
        };
        assert!(!check_milestone_access(&store, &Subject::new("u1"), &foreign).await);
    }
}
