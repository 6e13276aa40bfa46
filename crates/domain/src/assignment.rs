use serde::{Deserialize, Serialize};

use crate::{ProjectId, RoleId, UserId};

/// The ternary fact that a user holds a role within a project.
///
/// The backing relation does not enforce uniqueness on (user, project);
/// resolution under duplicates is first-match in store order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleAssignment {
    user_id: UserId,
    role_id: RoleId,
    project_id: ProjectId,
}

impl RoleAssignment {
    /// Creates an assignment linking a user, a role, and a project.
    #[must_use]
    pub fn new(user_id: UserId, role_id: RoleId, project_id: ProjectId) -> Self {
        Self {
            user_id,
            role_id,
            project_id,
        }
    }

    /// Returns the assigned user.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the assigned role.
    #[must_use]
    pub fn role_id(&self) -> RoleId {
        self.role_id
    }

    /// Returns the project scope of the assignment.
    #[must_use]
    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }
}
