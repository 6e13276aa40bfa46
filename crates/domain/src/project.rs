use chrono::{DateTime, Utc};
use rolegate_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::UserId;

/// Unique identifier for a project record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(Uuid);

impl ProjectId {
    /// Creates a new random project identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a project identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A scope within which a user's role assignment is interpreted.
///
/// Carries the audit authorship and soft-delete columns of the backing
/// `projects` table. A soft-deleted project never participates in
/// membership resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    name: NonEmptyString,
    description: Option<String>,
    active: bool,
    created_by: UserId,
    updated_by: Option<UserId>,
    deleted_by: Option<UserId>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Creates a live project with a fresh identifier and validated name.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        active: bool,
        created_by: UserId,
    ) -> AppResult<Self> {
        Ok(Self {
            id: ProjectId::new(),
            name: NonEmptyString::new(name)?,
            description,
            active,
            created_by,
            updated_by: None,
            deleted_by: None,
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        })
    }

    /// Rehydrates a project from stored fields.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: ProjectId,
        name: impl Into<String>,
        description: Option<String>,
        active: bool,
        created_by: UserId,
        updated_by: Option<UserId>,
        deleted_by: Option<UserId>,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            description,
            active,
            created_by,
            updated_by,
            deleted_by,
            created_at,
            updated_at,
            deleted_at,
        })
    }

    /// Returns the project identifier.
    #[must_use]
    pub fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the unique project name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether the project is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the creating user.
    #[must_use]
    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the last updating user, if any.
    #[must_use]
    pub fn updated_by(&self) -> Option<UserId> {
        self.updated_by
    }

    /// Returns the deleting user, if the project was soft-deleted.
    #[must_use]
    pub fn deleted_by(&self) -> Option<UserId> {
        self.deleted_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp, if any.
    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Returns whether the project carries a soft-delete marker.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl From<&Project> for ProjectId {
    fn from(project: &Project) -> Self {
        project.id
    }
}
