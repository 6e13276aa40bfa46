use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
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

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Capability interface for anything that can hold role assignments.
///
/// Evaluation services accept any implementor, so host applications plug
/// their own account types in without inheriting from a base model.
pub trait Subject: Send + Sync {
    /// Returns the stable user identifier used for assignment lookups.
    fn user_id(&self) -> UserId;
}

impl Subject for UserId {
    fn user_id(&self) -> UserId {
        *self
    }
}

/// Minimal user record owned by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
}

impl User {
    /// Creates a user with a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self { id: UserId::new() }
    }

    /// Creates a user from an existing identifier.
    #[must_use]
    pub fn with_id(id: UserId) -> Self {
        Self { id }
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}

impl Subject for User {
    fn user_id(&self) -> UserId {
        self.id
    }
}
