use std::sync::Arc;

use rolegate_core::{AppError, AppResult};
use rolegate_domain::{AuditAction, ProjectId, RoleId, Subject, UserId};

use crate::{AssignmentRepository, AuditEvent, AuditRepository};


/// Application service mutating the user–role–project assignment relation.
#[derive(Clone)]
pub struct AssignmentService {
    repository: Arc<dyn AssignmentRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl AssignmentService {
    /// Creates a new assignment service from its repositories.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AssignmentRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            repository,
            audit_repository,
        }
    }

    /// Attaches a role to the subject within a project.
    ///
    /// Accepts role and project values or their ids (`&Role` and `&Project`
    /// convert). Not idempotent: the backing relation permits duplicate
    /// rows, so repeating an attach may create one.
    pub async fn attach(
        &self,
        subject: &impl Subject,
        role: impl Into<RoleId> + Send,
        project: impl Into<ProjectId> + Send,
    ) -> AppResult<()> {
        let user_id = subject.user_id();
        let role_id = role.into();
        let project_id = project.into();

        self.repository
            .create_assignment(user_id, role_id, project_id)
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: user_id.to_string(),
                action: AuditAction::RoleAssigned,
                resource_type: "role_assignment".to_owned(),
                resource_id: format!("{user_id}:{role_id}:{project_id}"),
                detail: Some(format!(
                    "assigned role '{role_id}' to user '{user_id}' in project '{project_id}'"
                )),
            })
            .await
    }

    /// Detaches a role from the subject across every project.
    ///
    /// Returns the number of assignments removed; errors with `NotFound`
    /// when the subject held no such role. Use
    /// [`Self::detach_from_project`] to remove a single project's
    /// assignment.
    pub async fn detach(
        &self,
        subject: &impl Subject,
        role: impl Into<RoleId> + Send,
    ) -> AppResult<u64> {
        self.remove(subject.user_id(), role.into(), None).await
    }

    /// Detaches a role from the subject within one project only.
    pub async fn detach_from_project(
        &self,
        subject: &impl Subject,
        role: impl Into<RoleId> + Send,
        project: impl Into<ProjectId> + Send,
    ) -> AppResult<u64> {
        self.remove(subject.user_id(), role.into(), Some(project.into()))
            .await
    }

    async fn remove(
        &self,
        user_id: UserId,
        role_id: RoleId,
        project_id: Option<ProjectId>,
    ) -> AppResult<u64> {
        let removed = self
            .repository
            .delete_assignment(user_id, role_id, project_id)
            .await?;

        if removed == 0 {
            return Err(AppError::NotFound(format!(
                "no assignment of role '{role_id}' was found for user '{user_id}'"
            )));
        }

        let scope_detail = project_id
            .map(|project_id| format!(" in project '{project_id}'"))
            .unwrap_or_default();

        self.audit_repository
            .append_event(AuditEvent {
                subject: user_id.to_string(),
                action: AuditAction::RoleUnassigned,
                resource_type: "role_assignment".to_owned(),
                resource_id: format!("{user_id}:{role_id}"),
                detail: Some(format!(
                    "removed role '{role_id}' from user '{user_id}'{scope_detail}"
                )),
            })
            .await?;

        Ok(removed)
    }
}
