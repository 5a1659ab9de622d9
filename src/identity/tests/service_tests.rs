//! Service orchestration tests for registration, roles, and resolution.

use crate::error::ErrorKind;
use crate::identity::domain::{Capability, Role, UserId};
use crate::identity::services::{IdentityError, RegisterUserRequest};
use crate::test_support::Team;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bootstrap_only_succeeds_on_an_empty_directory() {
    let team = Team::assemble().await;

    let result = team
        .engine
        .identity()
        .bootstrap(RegisterUserRequest::new(
            "Late",
            "late@example.com",
            Role::ElevatedAdmin,
        ))
        .await;

    assert!(matches!(result, Err(IdentityError::AlreadyBootstrapped)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn register_requires_manage_users() {
    let team = Team::assemble().await;

    let result = team
        .engine
        .identity()
        .register_user(
            team.admin,
            RegisterUserRequest::new("New", "new@example.com", Role::StandardUser),
        )
        .await;

    let err = result.expect_err("admins cannot register users");
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn register_rejects_duplicate_email() {
    let team = Team::assemble().await;

    let result = team
        .engine
        .identity()
        .register_user(
            team.elevated,
            RegisterUserRequest::new("Imposter", "WES@example.com", Role::StandardUser),
        )
        .await;

    assert!(matches!(
        result,
        Err(IdentityError::EmailTaken(ref email)) if email == "wes@example.com"
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn role_change_applies_at_next_resolution() {
    let team = Team::assemble().await;
    let identity = team.engine.identity();

    let before = identity
        .resolver()
        .resolve(team.worker)
        .await
        .expect("worker resolves");
    identity
        .assign_role(team.elevated, team.worker, Role::Admin)
        .await
        .expect("role change succeeds");
    let after = identity
        .resolver()
        .resolve(team.worker)
        .await
        .expect("worker resolves");

    assert!(!before.can(Capability::CreateTask));
    assert!(after.can(Capability::CreateTask));
    assert_eq!(after.role(), Role::Admin);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resolver_rejects_unknown_and_tombstoned_callers() {
    let team = Team::assemble().await;
    team.engine
        .retention()
        .soft_delete_user(team.elevated, team.teammate, None)
        .await
        .expect("delete teammate");

    let resolver = team.engine.identity().resolver();
    let tombstoned = resolver.resolve(team.teammate).await;
    let unknown = resolver.resolve(UserId::new()).await;

    assert!(matches!(tombstoned, Err(IdentityError::CallerNotFound(id)) if id == team.teammate));
    assert_eq!(unknown.map_err(|err| err.kind()).err(), Some(ErrorKind::NotFound));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn visible_profiles_respects_view_all() {
    let team = Team::assemble().await;
    let identity = team.engine.identity();

    let admin_view = identity
        .visible_profiles(team.admin)
        .await
        .expect("admin listing");
    let worker_view = identity
        .visible_profiles(team.worker)
        .await
        .expect("worker listing");

    assert_eq!(admin_view.len(), 4);
    assert_eq!(worker_view.len(), 1);
    assert_eq!(worker_view.first().map(|profile| profile.id()), Some(team.worker));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn find_profile_hides_other_users_from_standard_users() {
    let team = Team::assemble().await;
    let identity = team.engine.identity();

    let own = identity.find_profile(team.worker, team.worker).await;
    let other = identity.find_profile(team.worker, team.teammate).await;

    assert!(own.is_ok());
    assert!(matches!(other, Err(IdentityError::ProfileNotFound(id)) if id == team.teammate));
}
