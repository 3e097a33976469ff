//! Wire types shared by the Projects API server and client.
//!
//! All types serialize camelCase, matching what the original SPA exchanged
//! with its backend.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Access level carried by a permission grant.
///
/// Exchanged over the wire as the literal strings `"View"`, `"Edit"` and
/// `"Admin"`.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
pub enum PermissionLevel {
    View,
    Edit,
    Admin,
}

impl PermissionLevel {
    /// Whether this level satisfies an edit-level access check.
    ///
    /// Admin is treated as a superset of Edit.
    pub fn grants_edit(self) -> bool {
        matches!(self, PermissionLevel::Edit | PermissionLevel::Admin)
    }
}

/// Association between a subject, a project and an access level.
///
/// At most one grant per (subject, project) pair is meaningful; lookups
/// resolve duplicates first-match-wins.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGrant {
    /// Subject identifier as issued by the STS (`sub` claim)
    pub user_profile_id: String,
    /// Project the grant applies to; a grant without a project conveys no
    /// project access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    /// Access level for the project
    pub level: PermissionLevel,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier for the project
    pub id: i64,
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Milestones of this project, ordered by creation (display only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub milestones: Vec<Milestone>,
    /// Permission grants naming this project
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_permissions: Vec<PermissionGrant>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    /// Unique identifier for the milestone
    pub id: i64,
    /// Display name
    pub name: String,
    /// Parent project; required relationship
    pub project_id: i64,
    /// Reference to a [`MilestoneStatus`]
    pub milestone_status_id: i64,
}

/// Reference data for milestone states.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneStatus {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Subject identifier, shared with the STS
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn permission_level_wire_strings() {
        assert_eq!(
            serde_json::to_value(PermissionLevel::Edit).unwrap(),
            json!("Edit")
        );
        assert_eq!(
            serde_json::to_value(PermissionLevel::Admin).unwrap(),
            json!("Admin")
        );
        let level: PermissionLevel = serde_json::from_value(json!("View")).unwrap();
        assert_eq!(level, PermissionLevel::View);
    }

    #[test]
    fn admin_implies_edit() {
        assert!(PermissionLevel::Edit.grants_edit());
        assert!(PermissionLevel::Admin.grants_edit());
        assert!(!PermissionLevel::View.grants_edit());
    }

    #[test]
    fn milestone_uses_camel_case() {
        let milestone = Milestone {
            id: 7,
            name: "Design complete".to_string(),
            project_id: 42,
            milestone_status_id: 1,
        };
        assert_eq!(
            serde_json::to_value(&milestone).unwrap(),
            json!({
                "id": 7,
                "name": "Design complete",
                "projectId": 42,
                "milestoneStatusId": 1,
            })
        );
    }

    #[test]
    fn project_collections_default_to_empty() {
        let project: Project = serde_json::from_value(json!({
            "id": 42,
            "name": "Launch",
        }))
        .unwrap();
        assert!(project.milestones.is_empty());
        assert!(project.user_permissions.is_empty());
        assert_eq!(project.description, None);
    }
}
