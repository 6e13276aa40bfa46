use std::str::FromStr;

use rolegate_core::{AppError, AppResult};
use rolegate_domain::Subject;

use super::AuthorizationService;

/// Splits a comma-separated name list into trimmed names.
///
/// Input normalization for hosts that accept `"editor,admin"` style values;
/// the evaluation core only ever sees explicit lists.
#[must_use]
pub fn parse_name_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Result shape selector for ability evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbilityReturnType {
    /// Return only the overall decision.
    #[default]
    Boolean,
    /// Return the per-name breakdown without an overall decision.
    Breakdown,
    /// Return the overall decision paired with the breakdown.
    Both,
}

impl AbilityReturnType {
    /// Returns the stable option value for this shape.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Breakdown => "array",
            Self::Both => "both",
        }
    }
}

impl FromStr for AbilityReturnType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "boolean" => Ok(Self::Boolean),
            "array" => Ok(Self::Breakdown),
            "both" => Ok(Self::Both),
            _ => Err(AppError::InvalidOption(format!(
                "unknown return type '{value}'"
            ))),
        }
    }
}

/// Options controlling how an ability check combines and shapes its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AbilityOptions {
    /// When true, every listed role and permission must check out; when
    /// false, any single positive check grants the ability.
    pub validate_all: bool,
    /// Shape of the returned outcome.
    pub return_type: AbilityReturnType,
}

impl AbilityOptions {
    /// Creates options from already-typed values.
    #[must_use]
    pub fn new(validate_all: bool, return_type: AbilityReturnType) -> Self {
        Self {
            validate_all,
            return_type,
        }
    }

    /// Parses raw option values as supplied by a host adapter.
    ///
    /// Absent values fall back to the defaults; unrecognized values are
    /// rejected before any evaluation happens.
    pub fn parse(validate_all: Option<&str>, return_type: Option<&str>) -> AppResult<Self> {
        let validate_all = match validate_all {
            None => false,
            Some("true") => true,
            Some("false") => false,
            Some(other) => {
                return Err(AppError::InvalidOption(format!(
                    "unknown validate_all value '{other}'"
                )));
            }
        };

        let return_type = match return_type {
            None => AbilityReturnType::default(),
            Some(value) => AbilityReturnType::from_str(value)?,
        };

        Ok(Self {
            validate_all,
            return_type,
        })
    }
}

/// Per-name check results, in evaluation order.
///
/// Duplicate names overwrite the recorded value in place, so a name keeps
/// the position of its first occurrence and the value of its last.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AbilityBreakdown {
    roles: Vec<(String, bool)>,
    permissions: Vec<(String, bool)>,
}

impl AbilityBreakdown {
    /// Returns the role check results in evaluation order.
    #[must_use]
    pub fn roles(&self) -> &[(String, bool)] {
        &self.roles
    }

    /// Returns the permission check results in evaluation order.
    #[must_use]
    pub fn permissions(&self) -> &[(String, bool)] {
        &self.permissions
    }

    /// Returns the recorded result for a role name, if it was checked.
    #[must_use]
    pub fn role(&self, name: &str) -> Option<bool> {
        self.roles
            .iter()
            .find(|(recorded, _)| recorded == name)
            .map(|(_, outcome)| *outcome)
    }

    /// Returns the recorded result for a permission name, if it was checked.
    #[must_use]
    pub fn permission(&self, name: &str) -> Option<bool> {
        self.permissions
            .iter()
            .find(|(recorded, _)| recorded == name)
            .map(|(_, outcome)| *outcome)
    }

    /// Combines the recorded checks into an overall decision.
    ///
    /// `validate_all` grants only when no recorded value is false, so an
    /// empty breakdown is vacuously granted; without it, at least one
    /// recorded value must be true, so an empty breakdown is denied.
    #[must_use]
    pub fn decide(&self, validate_all: bool) -> bool {
        let values = || {
            self.roles
                .iter()
                .chain(self.permissions.iter())
                .map(|(_, outcome)| *outcome)
        };

        if validate_all {
            !values().any(|outcome| !outcome)
        } else {
            values().any(|outcome| outcome)
        }
    }

    pub(crate) fn record_role(&mut self, name: &str, outcome: bool) {
        Self::record(&mut self.roles, name, outcome);
    }

    pub(crate) fn record_permission(&mut self, name: &str, outcome: bool) {
        Self::record(&mut self.permissions, name, outcome);
    }

    fn record(entries: &mut Vec<(String, bool)>, name: &str, outcome: bool) {
        if let Some(entry) = entries.iter_mut().find(|(recorded, _)| recorded == name) {
            entry.1 = outcome;
            return;
        }

        entries.push((name.to_owned(), outcome));
    }
}

/// Outcome of an ability evaluation, shaped per the requested return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbilityOutcome {
    /// Overall decision only.
    Boolean(bool),
    /// Per-name breakdown without an overall decision.
    Breakdown(AbilityBreakdown),
    /// Overall decision paired with the breakdown.
    Both {
        /// The combined decision.
        granted: bool,
        /// The per-name check results.
        breakdown: AbilityBreakdown,
    },
}

impl AbilityOutcome {
    /// Returns the overall decision, if the shape carries one.
    #[must_use]
    pub fn granted(&self) -> Option<bool> {
        match self {
            Self::Boolean(granted) | Self::Both { granted, .. } => Some(*granted),
            Self::Breakdown(_) => None,
        }
    }

    /// Returns the breakdown, if the shape carries one.
    #[must_use]
    pub fn breakdown(&self) -> Option<&AbilityBreakdown> {
        match self {
            Self::Boolean(_) => None,
            Self::Breakdown(breakdown) | Self::Both { breakdown, .. } => Some(breakdown),
        }
    }
}

impl AuthorizationService {
    /// Batch-evaluates role and permission checks into one decision.
    ///
    /// Role names are checked globally via [`Self::has_role`]. Permission
    /// names are checked against the ambient project `scope`; with no scope
    /// established every permission check fails closed.
    pub async fn ability(
        &self,
        subject: &impl Subject,
        role_names: &[impl AsRef<str> + Sync],
        permission_names: &[impl AsRef<str> + Sync],
        scope: Option<&str>,
        options: AbilityOptions,
    ) -> AppResult<AbilityOutcome> {
        let mut breakdown = AbilityBreakdown::default();

        for name in role_names {
            let name = name.as_ref();
            let held = self.has_role(subject, name).await?;
            breakdown.record_role(name, held);
        }

        for name in permission_names {
            let name = name.as_ref();
            let granted = match scope {
                Some(project_name) => self.can(subject, name, project_name).await?,
                None => false,
            };
            breakdown.record_permission(name, granted);
        }

        let granted = breakdown.decide(options.validate_all);

        Ok(match options.return_type {
            AbilityReturnType::Boolean => AbilityOutcome::Boolean(granted),
            AbilityReturnType::Breakdown => AbilityOutcome::Breakdown(breakdown),
            AbilityReturnType::Both => AbilityOutcome::Both { granted, breakdown },
        })
    }
}
