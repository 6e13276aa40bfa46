use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::{Strategy, any, proptest};

use rolegate_core::{AppError, AppResult};
use rolegate_domain::{Permission, ProjectId, Role, RoleId, UserId};

use crate::{AuthorizationRepository, ProjectMembership};

use super::{
    AbilityBreakdown, AbilityOptions, AbilityOutcome, AbilityReturnType, AuthorizationService,
    parse_name_list,
};

const NO_NAMES: [&str; 0] = [];

#[derive(Default)]
struct FakeAccessRepository {
    memberships: HashMap<UserId, Vec<ProjectMembership>>,
    roles: HashMap<RoleId, Role>,
    role_permissions: HashMap<RoleId, Vec<Permission>>,
}

impl FakeAccessRepository {
    fn add_role(&mut self, role: &Role, permissions: Vec<Permission>) {
        self.roles.insert(role.id(), role.clone());
        self.role_permissions.insert(role.id(), permissions);
    }

    fn add_membership(&mut self, user_id: UserId, project_name: &str, role_id: RoleId) {
        self.memberships
            .entry(user_id)
            .or_default()
            .push(ProjectMembership {
                project_id: ProjectId::new(),
                project_name: project_name.to_owned(),
                role_id,
            });
    }
}

#[async_trait]
impl AuthorizationRepository for FakeAccessRepository {
    async fn find_projects_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<ProjectMembership>> {
        Ok(self.memberships.get(&user_id).cloned().unwrap_or_default())
    }

    async fn find_role_by_id(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.roles.get(&role_id).cloned())
    }

    async fn find_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<Role>> {
        let mut seen = Vec::new();
        let mut roles = Vec::new();
        for membership in self.memberships.get(&user_id).cloned().unwrap_or_default() {
            if seen.contains(&membership.role_id) {
                continue;
            }
            seen.push(membership.role_id);
            if let Some(role) = self.roles.get(&membership.role_id) {
                roles.push(role.clone());
            }
        }
        Ok(roles)
    }

    async fn find_permissions_for_role(&self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        Ok(self
            .role_permissions
            .get(&role_id)
            .cloned()
            .unwrap_or_default())
    }
}

struct FailingRepository;

#[async_trait]
impl AuthorizationRepository for FailingRepository {
    async fn find_projects_for_user(
        &self,
        _user_id: UserId,
    ) -> AppResult<Vec<ProjectMembership>> {
        Err(AppError::Storage("backing store offline".to_owned()))
    }

    async fn find_role_by_id(&self, _role_id: RoleId) -> AppResult<Option<Role>> {
        Err(AppError::Storage("backing store offline".to_owned()))
    }

    async fn find_roles_for_user(&self, _user_id: UserId) -> AppResult<Vec<Role>> {
        Err(AppError::Storage("backing store offline".to_owned()))
    }

    async fn find_permissions_for_role(&self, _role_id: RoleId) -> AppResult<Vec<Permission>> {
        Err(AppError::Storage("backing store offline".to_owned()))
    }
}

fn role(name: &str) -> Role {
    Role::new(name, true).unwrap_or_else(|_| panic!("test role"))
}

fn permission(name: &str) -> Permission {
    Permission::new(name, name.to_uppercase()).unwrap_or_else(|_| panic!("test permission"))
}

/// One user holding role "editor" (grants "publish") in project "Alpha".
fn editor_fixture() -> (AuthorizationService, UserId) {
    let user = UserId::new();
    let editor = role("editor");
    let mut repository = FakeAccessRepository::default();
    repository.add_role(&editor, vec![permission("publish")]);
    repository.add_membership(user, "Alpha", editor.id());
    (AuthorizationService::new(Arc::new(repository)), user)
}

#[tokio::test]
async fn has_role_is_false_for_unassigned_role() {
    let (service, user) = editor_fixture();
    let result = service.has_role(&user, "admin").await;
    assert_eq!(result.ok(), Some(false));
}

#[tokio::test]
async fn has_role_ignores_project_scope() {
    let (service, user) = editor_fixture();
    let result = service.has_role(&user, "editor").await;
    assert_eq!(result.ok(), Some(true));
}

#[tokio::test]
async fn role_in_project_returns_assigned_role() {
    let (service, user) = editor_fixture();
    let resolved = service.role_in_project(&user, "Alpha").await;
    assert!(resolved.is_ok());
    let resolved = resolved.unwrap_or_default();
    assert_eq!(resolved.map(|role| role.name().to_owned()), Some("editor".to_owned()));
}

#[tokio::test]
async fn role_in_project_is_none_without_membership() {
    let (service, user) = editor_fixture();
    let resolved = service.role_in_project(&user, "Beta").await;
    assert!(resolved.is_ok());
    assert!(resolved.unwrap_or_default().is_none());
}

#[tokio::test]
async fn role_in_project_takes_first_match_under_duplicates() {
    let user = UserId::new();
    let editor = role("editor");
    let admin = role("admin");
    let mut repository = FakeAccessRepository::default();
    repository.add_role(&editor, Vec::new());
    repository.add_role(&admin, Vec::new());
    repository.add_membership(user, "Alpha", editor.id());
    repository.add_membership(user, "Alpha", admin.id());
    let service = AuthorizationService::new(Arc::new(repository));

    let resolved = service.role_in_project(&user, "Alpha").await;
    assert!(resolved.is_ok());
    assert_eq!(
        resolved.unwrap_or_default().map(|role| role.name().to_owned()),
        Some("editor".to_owned())
    );
}

#[tokio::test]
async fn role_in_project_is_none_when_first_match_is_dangling() {
    let user = UserId::new();
    let admin = role("admin");
    let mut repository = FakeAccessRepository::default();
    repository.add_role(&admin, Vec::new());
    // First matching membership points at a role id with no live record.
    repository.add_membership(user, "Alpha", RoleId::new());
    repository.add_membership(user, "Alpha", admin.id());
    let service = AuthorizationService::new(Arc::new(repository));

    let resolved = service.role_in_project(&user, "Alpha").await;
    assert!(resolved.is_ok());
    assert!(resolved.unwrap_or_default().is_none());
}

#[tokio::test]
async fn has_role_in_project_matches_resolved_role_name() {
    let (service, user) = editor_fixture();
    assert_eq!(
        service.has_role_in_project(&user, "editor", "Alpha").await.ok(),
        Some(true)
    );
    assert_eq!(
        service.has_role_in_project(&user, "admin", "Alpha").await.ok(),
        Some(false)
    );
}

#[tokio::test]
async fn in_project_tests_membership_by_name() {
    let (service, user) = editor_fixture();
    assert_eq!(service.in_project(&user, "Alpha").await.ok(), Some(true));
    assert_eq!(service.in_project(&user, "Beta").await.ok(), Some(false));
}

#[tokio::test]
async fn can_is_true_when_resolved_role_grants_permission() {
    let (service, user) = editor_fixture();
    assert_eq!(service.can(&user, "publish", "Alpha").await.ok(), Some(true));
}

#[tokio::test]
async fn can_is_false_without_membership_in_project() {
    let (service, user) = editor_fixture();
    assert_eq!(service.can(&user, "publish", "Beta").await.ok(), Some(false));
}

#[tokio::test]
async fn can_is_false_when_role_lacks_permission() {
    let (service, user) = editor_fixture();
    assert_eq!(service.can(&user, "archive", "Alpha").await.ok(), Some(false));
}

#[tokio::test]
async fn has_permission_follows_every_assignment() {
    let (service, user) = editor_fixture();
    assert_eq!(service.has_permission(&user, "publish").await.ok(), Some(true));
    assert_eq!(service.has_permission(&user, "archive").await.ok(), Some(false));
}

#[tokio::test]
async fn require_permission_forbids_missing_grant() {
    let (service, user) = editor_fixture();
    let allowed = service.require_permission(&user, "publish", "Alpha").await;
    assert!(allowed.is_ok());
    let denied = service.require_permission(&user, "archive", "Alpha").await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn ability_empty_lists_preserve_vacuous_asymmetry() {
    let (service, user) = editor_fixture();

    let all = service
        .ability(
            &user,
            &NO_NAMES,
            &NO_NAMES,
            None,
            AbilityOptions::new(true, AbilityReturnType::Boolean),
        )
        .await;
    assert!(all.is_ok());
    assert_eq!(all.ok().and_then(|outcome| outcome.granted()), Some(true));

    let any = service
        .ability(
            &user,
            &NO_NAMES,
            &NO_NAMES,
            None,
            AbilityOptions::default(),
        )
        .await;
    assert!(any.is_ok());
    assert_eq!(any.ok().and_then(|outcome| outcome.granted()), Some(false));
}

#[tokio::test]
async fn ability_breakdown_shape_has_no_decision() {
    let (service, user) = editor_fixture();

    let outcome = service
        .ability(
            &user,
            &["admin"],
            &NO_NAMES,
            None,
            AbilityOptions::new(false, AbilityReturnType::Breakdown),
        )
        .await;
    assert!(outcome.is_ok());
    let outcome = outcome.unwrap_or(AbilityOutcome::Boolean(true));

    assert!(outcome.granted().is_none());
    let breakdown = outcome.breakdown();
    assert!(breakdown.is_some());
    let breakdown = breakdown.cloned().unwrap_or_default();
    assert_eq!(breakdown.role("admin"), Some(false));
    assert!(breakdown.permissions().is_empty());
}

#[tokio::test]
async fn ability_requires_every_check_under_validate_all() {
    let (service, user) = editor_fixture();

    let outcome = service
        .ability(
            &user,
            &["editor", "admin"],
            &["publish"],
            Some("Alpha"),
            AbilityOptions::new(true, AbilityReturnType::Both),
        )
        .await;
    assert!(outcome.is_ok());
    let outcome = outcome.unwrap_or(AbilityOutcome::Boolean(true));

    // "admin" fails, so the conjunction fails even though the rest pass.
    assert_eq!(outcome.granted(), Some(false));
    let breakdown = outcome.breakdown().cloned().unwrap_or_default();
    assert_eq!(breakdown.role("editor"), Some(true));
    assert_eq!(breakdown.role("admin"), Some(false));
    assert_eq!(breakdown.permission("publish"), Some(true));
}

#[tokio::test]
async fn ability_grants_on_any_positive_check_by_default() {
    let (service, user) = editor_fixture();

    let outcome = service
        .ability(
            &user,
            &["editor", "admin"],
            &["publish"],
            Some("Alpha"),
            AbilityOptions::default(),
        )
        .await;
    assert_eq!(
        outcome.ok().and_then(|outcome| outcome.granted()),
        Some(true)
    );
}

#[tokio::test]
async fn ability_without_scope_fails_permission_checks_closed() {
    let (service, user) = editor_fixture();

    let outcome = service
        .ability(
            &user,
            &NO_NAMES,
            &["publish"],
            None,
            AbilityOptions::new(false, AbilityReturnType::Both),
        )
        .await;
    assert!(outcome.is_ok());
    let outcome = outcome.unwrap_or(AbilityOutcome::Boolean(true));
    assert_eq!(outcome.granted(), Some(false));
    assert_eq!(
        outcome
            .breakdown()
            .cloned()
            .unwrap_or_default()
            .permission("publish"),
        Some(false)
    );
}

#[tokio::test]
async fn ability_records_duplicate_names_once() {
    let (service, user) = editor_fixture();

    let outcome = service
        .ability(
            &user,
            &["editor", "editor"],
            &NO_NAMES,
            None,
            AbilityOptions::new(false, AbilityReturnType::Breakdown),
        )
        .await;
    assert!(outcome.is_ok());
    let breakdown = outcome
        .ok()
        .and_then(|outcome| outcome.breakdown().cloned())
        .unwrap_or_default();
    assert_eq!(breakdown.roles().len(), 1);
    assert_eq!(breakdown.role("editor"), Some(true));
}

#[tokio::test]
async fn ability_propagates_storage_faults() {
    let service = AuthorizationService::new(Arc::new(FailingRepository));
    let user = UserId::new();

    let outcome = service
        .ability(
            &user,
            &["editor"],
            &NO_NAMES,
            None,
            AbilityOptions::default(),
        )
        .await;
    assert!(matches!(outcome, Err(AppError::Storage(_))));
}

#[test]
fn parse_name_list_trims_and_drops_empty_segments() {
    assert_eq!(parse_name_list("editor, admin"), vec!["editor", "admin"]);
    assert_eq!(parse_name_list("editor"), vec!["editor"]);
    assert!(parse_name_list("").is_empty());
    assert!(parse_name_list(" , ").is_empty());
}

#[test]
fn return_type_parses_stable_values() {
    assert_eq!(
        AbilityReturnType::from_str("boolean").ok(),
        Some(AbilityReturnType::Boolean)
    );
    assert_eq!(
        AbilityReturnType::from_str("array").ok(),
        Some(AbilityReturnType::Breakdown)
    );
    assert_eq!(
        AbilityReturnType::from_str("both").ok(),
        Some(AbilityReturnType::Both)
    );
    assert!(matches!(
        AbilityReturnType::from_str("sometimes"),
        Err(AppError::InvalidOption(_))
    ));
}

#[test]
fn options_parse_rejects_unknown_values() {
    let defaults = AbilityOptions::parse(None, None);
    assert_eq!(defaults.ok(), Some(AbilityOptions::default()));

    let explicit = AbilityOptions::parse(Some("true"), Some("both"));
    assert_eq!(
        explicit.ok(),
        Some(AbilityOptions::new(true, AbilityReturnType::Both))
    );

    assert!(matches!(
        AbilityOptions::parse(Some("yes"), None),
        Err(AppError::InvalidOption(_))
    ));
    assert!(matches!(
        AbilityOptions::parse(None, Some("tuple")),
        Err(AppError::InvalidOption(_))
    ));
}

fn breakdown_strategy() -> impl Strategy<Value = AbilityBreakdown> {
    let entries = proptest::collection::vec(("[a-z]{1,8}", any::<bool>()), 0..8);
    (entries.clone(), entries).prop_map(|(roles, permissions)| {
        let mut breakdown = AbilityBreakdown::default();
        for (name, outcome) in roles {
            breakdown.record_role(&name, outcome);
        }
        for (name, outcome) in permissions {
            breakdown.record_permission(&name, outcome);
        }
        breakdown
    })
}

proptest! {
    #[test]
    fn decide_matches_quantifier_semantics(breakdown in breakdown_strategy()) {
        let values: Vec<bool> = breakdown
            .roles()
            .iter()
            .chain(breakdown.permissions().iter())
            .map(|(_, outcome)| *outcome)
            .collect();

        assert_eq!(breakdown.decide(true), !values.contains(&false));
        assert_eq!(breakdown.decide(false), values.contains(&true));
    }
}
