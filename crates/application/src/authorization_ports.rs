use async_trait::async_trait;

use rolegate_core::AppResult;
use rolegate_domain::{AuditAction, Permission, ProjectId, Role, RoleId, UserId};

/// One row of a user's project memberships, carrying the assignment's role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMembership {
    /// Project scope of the assignment.
    pub project_id: ProjectId,
    /// Unique project name used for scope matching.
    pub project_name: String,
    /// Role held by the user within the project.
    pub role_id: RoleId,
}

/// Repository port for membership and grant lookups.
///
/// `find_projects_for_user` yields rows in backing-store order; scoped
/// resolution is first-match over that order.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Lists the user's project memberships with their assigned role ids.
    async fn find_projects_for_user(&self, user_id: UserId)
    -> AppResult<Vec<ProjectMembership>>;

    /// Finds a live role by id. Missing and soft-deleted roles are `None`.
    async fn find_role_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Lists the union of roles referenced across all of the user's
    /// assignments.
    async fn find_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>>;

    /// Lists the permissions granted to a role.
    async fn find_permissions_for_role(&self, role_id: RoleId) -> AppResult<Vec<Permission>>;
}

/// Repository port for assignment mutations.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Inserts an assignment row. The backing relation permits duplicate
    /// triples; referential integrity failures surface as `NotFound`.
    async fn create_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
        project_id: ProjectId,
    ) -> AppResult<()>;

    /// Removes assignment rows matching the user and role, optionally
    /// narrowed to one project. Returns the number of rows removed.
    async fn delete_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
        project_id: Option<ProjectId>,
    ) -> AppResult<u64>;
}

/// Audit event emitted by assignment mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Subject the event concerns.
    pub subject: String,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Resource type label.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
    /// Optional audit detail payload.
    pub detail: Option<String>,
}

/// Port for persisting append-only audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}
