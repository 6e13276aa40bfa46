use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use rolegate_application::{
    AssignmentRepository, AuthorizationRepository, ProjectMembership,
};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{Permission, Project, ProjectId, Role, RoleAssignment, RoleId, UserId};


/// In-memory access repository implementation.
///
/// Assignments are kept in insertion order, which is the store order that
/// first-match resolution observes. Duplicate (user, role, project) rows are
/// permitted, matching the reference storage policy.
#[derive(Debug, Default)]
pub struct InMemoryAccessRepository {
    users: RwLock<HashSet<UserId>>,
    roles: RwLock<HashMap<RoleId, Role>>,
    role_permissions: RwLock<HashMap<RoleId, Vec<Permission>>>,
    projects: RwLock<HashMap<ProjectId, Project>>,
    assignments: RwLock<Vec<RoleAssignment>>,
}

impl InMemoryAccessRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user so assignments may reference it.
    pub async fn insert_user(&self, user_id: UserId) {
        self.users.write().await.insert(user_id);
    }

    /// Registers a role together with its permission grants.
    pub async fn insert_role(&self, role: Role, permissions: Vec<Permission>) {
        let role_id = role.id();
        self.roles.write().await.insert(role_id, role);
        self.role_permissions
            .write()
            .await
            .insert(role_id, permissions);
    }

    /// Removes a role record, leaving any assignments dangling.
    pub async fn remove_role(&self, role_id: RoleId) {
        self.roles.write().await.remove(&role_id);
        self.role_permissions.write().await.remove(&role_id);
    }

    /// Registers a project.
    pub async fn insert_project(&self, project: Project) {
        self.projects.write().await.insert(project.id(), project);
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryAccessRepository {
    async fn find_projects_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<ProjectMembership>> {
        let assignments = self.assignments.read().await;
        let projects = self.projects.read().await;

        Ok(assignments
            .iter()
            .filter(|assignment| assignment.user_id() == user_id)
            .filter_map(|assignment| {
                let project = projects.get(&assignment.project_id())?;
                if project.is_deleted() {
                    return None;
                }
                Some(ProjectMembership {
                    project_id: project.id(),
                    project_name: project.name().to_owned(),
                    role_id: assignment.role_id(),
                })
            })
            .collect())
    }

    async fn find_role_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.roles.read().await.get(&role_id).cloned())
    }

    async fn find_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let assignments = self.assignments.read().await;
        let roles = self.roles.read().await;

        let mut seen = HashSet::new();
        Ok(assignments
            .iter()
            .filter(|assignment| assignment.user_id() == user_id)
            .filter_map(|assignment| {
                if !seen.insert(assignment.role_id()) {
                    return None;
                }
                roles.get(&assignment.role_id()).cloned()
            })
            .collect())
    }

    async fn find_permissions_for_role(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        Ok(self
            .role_permissions
            .read()
            .await
            .get(&role_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryAccessRepository {
    async fn create_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
        project_id: ProjectId,
    ) -> AppResult<()> {
        if !self.users.read().await.contains(&user_id) {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' is not registered"
            )));
        }
        if !self.roles.read().await.contains_key(&role_id) {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' is not registered"
            )));
        }
        if !self.projects.read().await.contains_key(&project_id) {
            return Err(AppError::NotFound(format!(
                "project '{project_id}' is not registered"
            )));
        }

        self.assignments
            .write()
            .await
            .push(RoleAssignment::new(user_id, role_id, project_id));
        Ok(())
    }

    async fn delete_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
        project_id: Option<ProjectId>,
    ) -> AppResult<u64> {
        let mut assignments = self.assignments.write().await;
        let before = assignments.len();
        assignments.retain(|assignment| {
            !(assignment.user_id() == user_id
                && assignment.role_id() == role_id
                && project_id.is_none_or(|project_id| assignment.project_id() == project_id))
        });
        Ok((before - assignments.len()) as u64)
    }
}
