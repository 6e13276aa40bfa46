use std::sync::Arc;

use rolegate_core::{AppError, AppResult};
use rolegate_domain::{Role, Subject};

use crate::AuthorizationRepository;

mod ability;
#[cfg(test)]
mod tests;

pub use ability::{
    AbilityBreakdown, AbilityOptions, AbilityOutcome, AbilityReturnType, parse_name_list,
};

/// Application service answering role and permission questions for a subject.
///
/// All lookups go through the repository port; resolution misses are absorbed
/// into negative answers while storage faults propagate to the caller.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthorizationRepository>) -> Self {
        Self { repository }
    }

    /// Resolves the role the subject holds within the named project.
    ///
    /// Memberships are scanned in backing-store order and the first entry
    /// whose project name matches decides the outcome. A first match whose
    /// role id no longer resolves to a live role yields `None` without
    /// scanning further; duplicate assignments in the same project are
    /// masked, not reported.
    pub async fn role_in_project(
        &self,
        subject: &impl Subject,
        project_name: &str,
    ) -> AppResult<Option<Role>> {
        let memberships = self
            .repository
            .find_projects_for_user(subject.user_id())
            .await?;

        let Some(membership) = memberships
            .iter()
            .find(|membership| membership.project_name == project_name)
        else {
            return Ok(None);
        };

        self.repository.find_role_by_id(membership.role_id).await
    }

    /// Returns whether the subject belongs to the named project.
    pub async fn in_project(
        &self,
        subject: &impl Subject,
        project_name: &str,
    ) -> AppResult<bool> {
        let memberships = self
            .repository
            .find_projects_for_user(subject.user_id())
            .await?;

        Ok(memberships
            .iter()
            .any(|membership| membership.project_name == project_name))
    }

    /// Returns whether the subject holds the named role in any project.
    ///
    /// A role is a global credential once assigned anywhere; project scope is
    /// deliberately ignored here.
    pub async fn has_role(&self, subject: &impl Subject, role_name: &str) -> AppResult<bool> {
        let roles = self
            .repository
            .find_roles_for_user(subject.user_id())
            .await?;

        Ok(roles.iter().any(|role| role.name() == role_name))
    }

    /// Returns whether the subject holds the named role within the named
    /// project.
    pub async fn has_role_in_project(
        &self,
        subject: &impl Subject,
        role_name: &str,
        project_name: &str,
    ) -> AppResult<bool> {
        let role = self.role_in_project(subject, project_name).await?;
        Ok(role.is_some_and(|role| role.name() == role_name))
    }

    /// Returns whether any role the subject holds, through any assignment,
    /// grants the named permission.
    ///
    /// The project-less counterpart of [`Self::can`]: it follows every
    /// assignment instead of resolving a single scoped role.
    pub async fn has_permission(
        &self,
        subject: &impl Subject,
        permission_name: &str,
    ) -> AppResult<bool> {
        let roles = self
            .repository
            .find_roles_for_user(subject.user_id())
            .await?;

        for role in roles {
            let permissions = self.repository.find_permissions_for_role(role.id()).await?;
            if permissions
                .iter()
                .any(|permission| permission.name() == permission_name)
            {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Returns whether the subject holds the named permission within the
    /// named project, through the role resolved for that project.
    pub async fn can(
        &self,
        subject: &impl Subject,
        permission_name: &str,
        project_name: &str,
    ) -> AppResult<bool> {
        let Some(role) = self.role_in_project(subject, project_name).await? else {
            return Ok(false);
        };

        let permissions = self.repository.find_permissions_for_role(role.id()).await?;

        Ok(permissions
            .iter()
            .any(|permission| permission.name() == permission_name))
    }

    /// Ensures the subject holds the named permission within the named
    /// project.
    pub async fn require_permission(
        &self,
        subject: &impl Subject,
        permission_name: &str,
        project_name: &str,
    ) -> AppResult<()> {
        if self.can(subject, permission_name, project_name).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "subject '{}' is missing permission '{permission_name}' in project '{project_name}'",
            subject.user_id()
        )))
    }
}
