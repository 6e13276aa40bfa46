use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use rolegate_application::{
    AssignmentRepository, AuthorizationRepository, ProjectMembership,
};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{Permission, PermissionId, ProjectId, Role, RoleId, UserId};

/// PostgreSQL-backed repository for membership, grant, and assignment
/// access.
///
/// Queries are soft-delete aware: rows carrying a `deleted_at` marker never
/// resolve. Store order for membership scans is the insertion order of the
/// `assigned_roles_in_project` table.
#[derive(Clone)]
pub struct PostgresAccessRepository {
    pool: PgPool,
}

impl PostgresAccessRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MembershipRow {
    project_id: uuid::Uuid,
    project_name: String,
    role_id: uuid::Uuid,
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: uuid::Uuid,
    name: String,
    active: bool,
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: uuid::Uuid,
    name: String,
    display_name: String,
}

impl RoleRow {
    fn into_role(self) -> AppResult<Role> {
        Role::restore(RoleId::from_uuid(self.id), self.name.clone(), self.active).map_err(
            |error| AppError::Internal(format!("invalid stored role '{}': {error}", self.name)),
        )
    }
}

impl PermissionRow {
    fn into_permission(self) -> AppResult<Permission> {
        Permission::restore(
            PermissionId::from_uuid(self.id),
            self.name.clone(),
            self.display_name.clone(),
        )
        .map_err(|error| {
            AppError::Internal(format!("invalid stored permission '{}': {error}", self.name))
        })
    }
}

#[async_trait]
impl AuthorizationRepository for PostgresAccessRepository {
    async fn find_projects_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<ProjectMembership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT
                projects.id AS project_id,
                projects.name AS project_name,
                assigned.role_id
            FROM assigned_roles_in_project AS assigned
            INNER JOIN projects
                ON projects.id = assigned.project_id
            WHERE assigned.user_id = $1
                AND projects.deleted_at IS NULL
            ORDER BY assigned.id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Storage(format!("failed to load memberships: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| ProjectMembership {
                project_id: ProjectId::from_uuid(row.project_id),
                project_name: row.project_name,
                role_id: RoleId::from_uuid(row.role_id),
            })
            .collect())
    }

    async fn find_role_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, active
            FROM roles
            WHERE id = $1
                AND deleted_at IS NULL
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Storage(format!("failed to load role: {error}")))?;

        row.map(RoleRow::into_role).transpose()
    }

    async fn find_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT DISTINCT roles.id, roles.name, roles.active
            FROM assigned_roles_in_project AS assigned
            INNER JOIN roles
                ON roles.id = assigned.role_id
            WHERE assigned.user_id = $1
                AND roles.deleted_at IS NULL
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Storage(format!("failed to load user roles: {error}")))?;

        rows.into_iter().map(RoleRow::into_role).collect()
    }

    async fn find_permissions_for_role(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT permissions.id, permissions.name, permissions.display_name
            FROM permission_role AS grants
            INNER JOIN permissions
                ON permissions.id = grants.permission_id
            WHERE grants.role_id = $1
            ORDER BY permissions.name
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Storage(format!("failed to load role grants: {error}")))?;

        rows.into_iter().map(PermissionRow::into_permission).collect()
    }
}

#[async_trait]
impl AssignmentRepository for PostgresAccessRepository {
    async fn create_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
        project_id: ProjectId,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO assigned_roles_in_project (user_id, role_id, project_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_id.as_uuid())
        .bind(project_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(map_assignment_error)?;

        debug!(%user_id, %role_id, %project_id, "created role assignment");
        Ok(())
    }

    async fn delete_assignment(
        &self,
        user_id: UserId,
        role_id: RoleId,
        project_id: Option<ProjectId>,
    ) -> AppResult<u64> {
        let result = match project_id {
            Some(project_id) => {
                sqlx::query(
                    r#"
                    DELETE FROM assigned_roles_in_project
                    WHERE user_id = $1
                        AND role_id = $2
                        AND project_id = $3
                    "#,
                )
                .bind(user_id.as_uuid())
                .bind(role_id.as_uuid())
                .bind(project_id.as_uuid())
                .execute(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    DELETE FROM assigned_roles_in_project
                    WHERE user_id = $1
                        AND role_id = $2
                    "#,
                )
                .bind(user_id.as_uuid())
                .bind(role_id.as_uuid())
                .execute(&self.pool)
                .await
            }
        };

        let removed = result
            .map_err(|error| {
                AppError::Storage(format!("failed to remove role assignment: {error}"))
            })?
            .rows_affected();

        debug!(%user_id, %role_id, removed, "removed role assignments");
        Ok(removed)
    }
}

fn map_assignment_error(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(database_error) = &error {
        // 23503: referenced user, role, or project does not exist.
        if database_error.code().as_deref() == Some("23503") {
            return AppError::NotFound(format!(
                "assignment references a missing record: {database_error}"
            ));
        }
        // 23505: a uniqueness constraint added by the host rejected the row.
        if database_error.code().as_deref() == Some("23505") {
            return AppError::Conflict(format!(
                "assignment already exists: {database_error}"
            ));
        }
    }

    AppError::Storage(format!("failed to create assignment: {error}"))
}
