use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by assignment mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is attached to a user within a project.
    RoleAssigned,
    /// Emitted when a role is detached from a user.
    RoleUnassigned,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleAssigned => "access.role.assigned",
            Self::RoleUnassigned => "access.role.unassigned",
        }
    }
}
