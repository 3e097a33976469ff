use super::{DataBackend, StoreError};
use async_trait::async_trait;
use projects_model::{Milestone, MilestoneStatus, PermissionGrant, Project, UserProfile};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    projects: HashMap<i64, Project>,
    milestones: HashMap<i64, Milestone>,
    // kept as an insertion-ordered list so first-match-wins stays observable
    grants: Vec<PermissionGrant>,
    profiles: HashMap<String, UserProfile>,
    statuses: Vec<MilestoneStatus>,
}

/// Thread-safe in-memory backend for demos and tests.
///
/// Clones share the same tables, so a test can hold one handle while the
/// application state holds another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let store = Self::default();
        {
            let mut tables = store.tables.try_write().expect("fresh store is unshared");
            tables.statuses = vec![
                MilestoneStatus {
                    id: 1,
                    name: "Not Started".to_string(),
                },
                MilestoneStatus {
                    id: 2,
                    name: "In Progress".to_string(),
                },
                MilestoneStatus {
                    id: 3,
                    name: "Completed".to_string(),
                },
            ];
        }
        store
    }

    fn bare(project: &Project) -> Project {
        Project {
            id: project.id,
            name: project.name.clone(),
            description: project.description.clone(),
            milestones: Vec::new(),
            user_permissions: Vec::new(),
        }
    }

    fn grant_matches(grant: &PermissionGrant, user_id: &str, project_id: i64) -> bool {
        grant.project_id == Some(project_id) && grant.user_profile_id == user_id
    }
}

#[async_trait]
impl DataBackend for MemoryStore {
    async fn list_projects(&self) -> Vec<Project> {
        let tables = self.tables.read().await;
        let mut projects: Vec<Project> = tables.projects.values().map(Self::bare).collect();
        projects.sort_by_key(|p| p.id);
        projects
    }

    async fn get_project(&self, id: i64) -> Option<Project> {
        let tables = self.tables.read().await;
        let mut project = tables.projects.get(&id).map(Self::bare)?;

        let mut milestones: Vec<Milestone> = tables
            .milestones
            .values()
            .filter(|m| m.project_id == id)
            .cloned()
            .collect();
        milestones.sort_by_key(|m| m.id);
        project.milestones = milestones;

        project.user_permissions = tables
            .grants
            .iter()
            .filter(|g| g.project_id == Some(id))
            .cloned()
            .collect();

        Some(project)
    }

    async fn project_exists(&self, id: i64) -> bool {
        self.tables.read().await.projects.contains_key(&id)
    }

    async fn insert_project(&self, project: Project) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.projects.contains_key(&project.id) {
            return Err(StoreError::Duplicate(project.id));
        }
        tables.projects.insert(project.id, Self::bare(&project));
        Ok(())
    }

    async fn update_project(&self, project: Project) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.projects.contains_key(&project.id) {
            // The row vanished between the access check and the save.
            return Err(StoreError::Conflict(project.id));
        }
        tables.projects.insert(project.id, Self::bare(&project));
        Ok(())
    }

    async fn remove_project(&self, id: i64) -> Option<Project> {
        let mut tables = self.tables.write().await;
        // dependents first, so grants never dangle
        tables.grants.retain(|g| g.project_id != Some(id));
        tables.milestones.retain(|_, m| m.project_id != id);
        tables.projects.remove(&id)
    }

    async fn grant_for(&self, user_id: &str, project_id: i64) -> Option<PermissionGrant> {
        let tables = self.tables.read().await;
        tables
            .grants
            .iter()
            .find(|g| Self::grant_matches(g, user_id, project_id))
            .cloned()
    }

    async fn grants_for_user(&self, user_id: &str) -> Vec<PermissionGrant> {
        let tables = self.tables.read().await;
        tables
            .grants
            .iter()
            .filter(|g| g.user_profile_id == user_id)
            .cloned()
            .collect()
    }

    async fn grants_for_project(&self, project_id: i64) -> Vec<PermissionGrant> {
        let tables = self.tables.read().await;
        tables
            .grants
            .iter()
            .filter(|g| g.project_id == Some(project_id))
            .cloned()
            .collect()
    }

    async fn insert_grant(&self, grant: PermissionGrant) -> bool {
        let mut tables = self.tables.write().await;
        let exists = grant.project_id.is_some_and(|project_id| {
            tables
                .grants
                .iter()
                .any(|g| Self::grant_matches(g, &grant.user_profile_id, project_id))
        });
        if exists {
            return false;
        }
        tables.grants.push(grant);
        true
    }

    async fn update_grant(&self, grant: PermissionGrant) -> bool {
        let Some(project_id) = grant.project_id else {
            return false;
        };
        let mut tables = self.tables.write().await;
        match tables
            .grants
            .iter_mut()
            .find(|g| Self::grant_matches(g, &grant.user_profile_id, project_id))
        {
            Some(existing) => {
                *existing = grant;
                true
            }
            None => false,
        }
    }

    async fn remove_grant(&self, user_id: &str, project_id: i64) -> bool {
        let mut tables = self.tables.write().await;
        let before = tables.grants.len();
        tables
            .grants
            .retain(|g| !Self::grant_matches(g, user_id, project_id));
        tables.grants.len() < before
    }

    async fn get_milestone(&self, id: i64) -> Option<Milestone> {
        self.tables.read().await.milestones.get(&id).cloned()
    }

    async fn insert_milestone(&self, milestone: Milestone) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.milestones.contains_key(&milestone.id) {
            return Err(StoreError::Duplicate(milestone.id));
        }
        tables.milestones.insert(milestone.id, milestone);
        Ok(())
    }

    async fn update_milestone(&self, milestone: Milestone) -> bool {
        let mut tables = self.tables.write().await;
        if !tables.milestones.contains_key(&milestone.id) {
            return false;
        }
        tables.milestones.insert(milestone.id, milestone);
        true
    }

    async fn remove_milestone(&self, id: i64) -> bool {
        self.tables.write().await.milestones.remove(&id).is_some()
    }

    async fn milestone_statuses(&self) -> Vec<MilestoneStatus> {
        self.tables.read().await.statuses.clone()
    }

    async fn upsert_profile(&self, profile: UserProfile) {
        self.tables
            .write()
            .await
            .profiles
            .insert(profile.id.clone(), profile);
    }

    async fn profiles(&self, ids: &[String]) -> Vec<UserProfile> {
        let tables = self.tables.read().await;
        ids.iter()
            .filter_map(|id| tables.profiles.get(id).cloned())
            .collect()
    }
}
