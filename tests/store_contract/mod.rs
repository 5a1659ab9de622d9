//! Behaviour every engine store must share, written once and run against
//! each adapter.

use eyre::{WrapErr, ensure};
use mockable::DefaultClock;
use std::collections::BTreeSet;
use taskward::identity::domain::{Role, UserProfile};
use taskward::identity::ports::IdentityDirectory;
use taskward::notification::domain::{
    Notification, NotificationEvent, NotificationKind, Subject, render,
};
use taskward::notification::ports::{NotificationStore, RecipientDirectory};
use taskward::persistence::{ChangeSet, EngineStore, StoreError};
use taskward::task::domain::{
    Assignment, EditRequest, NewTaskData, ProposedChanges, ReviewDecision, Task,
};
use taskward::task::ports::TaskStore;

fn profile(name: &str, email: &str, role: Role) -> eyre::Result<UserProfile> {
    UserProfile::new(name, email, role, &DefaultClock).wrap_err("build profile")
}

fn task(title: &str, creator: &UserProfile) -> eyre::Result<Task> {
    Task::new(
        NewTaskData {
            title: title.to_owned(),
            ..NewTaskData::default()
        },
        creator.id(),
        &DefaultClock,
    )
    .wrap_err("build task")
}

/// A failing change rolls back every change staged before it.
///
/// # Errors
///
/// Returns an error when the store does not roll back.
pub async fn failed_commit_writes_nothing<S: EngineStore>(store: &S) -> eyre::Result<()> {
    let owner = profile("Owner", "owner@example.com", Role::Admin)?;
    let first = task("First", &owner)?;
    let mut seed = ChangeSet::new();
    seed.insert_profile(owner.clone()).insert_task(first.clone());
    store.commit(seed).await?;

    let second = task("Second", &owner)?;
    let mut stale = first.clone();
    stale.set_legacy_assignee(Some(owner.id()), &DefaultClock);
    let mut changes = ChangeSet::new();
    changes
        .insert_task(second.clone())
        .insert_assignment(Assignment::new(first.id(), owner.id(), owner.id(), &DefaultClock))
        .update_task(stale, first.version() + 7);

    let result = store.commit(changes).await;

    ensure!(
        matches!(result, Err(StoreError::StaleTask { .. })),
        "expected a stale task error, got {result:?}"
    );
    ensure!(store.find_task(second.id()).await?.is_none());
    ensure!(store.list_assignments(first.id()).await?.is_empty());
    let stored = store
        .find_task(first.id())
        .await?
        .ok_or_else(|| eyre::eyre!("seeded task vanished"))?;
    ensure!(stored == first);
    Ok(())
}

/// Duplicate emails are refused and conflict-ignoring inserts are counted
/// only when they write.
///
/// # Errors
///
/// Returns an error when the store's row constraints differ.
pub async fn constraints_and_idempotent_inserts<S: EngineStore>(store: &S) -> eyre::Result<()> {
    let owner = profile("Owner", "owner@example.com", Role::Admin)?;
    let first = task("First", &owner)?;
    let mut seed = ChangeSet::new();
    seed.insert_profile(owner.clone()).insert_task(first.clone());
    store.commit(seed).await?;

    let mut duplicate = ChangeSet::new();
    duplicate.insert_profile(profile("Copy", "OWNER@example.com", Role::StandardUser)?);
    let rejected = store.commit(duplicate).await;
    ensure!(
        matches!(rejected, Err(StoreError::DuplicateEmail(_))),
        "expected duplicate email, got {rejected:?}"
    );

    let assignment = Assignment::new(first.id(), owner.id(), owner.id(), &DefaultClock);
    let mut twice = ChangeSet::new();
    twice
        .insert_assignment(assignment.clone())
        .insert_assignment(assignment);
    let receipt = store.commit(twice).await?;
    ensure!(receipt.assignments_inserted == 1);

    let reader = profile("Reader", "reader@example.com", Role::StandardUser)?;
    let mut add_reader = ChangeSet::new();
    add_reader.insert_profile(reader.clone());
    store.commit(add_reader).await?;
    let event = NotificationEvent::new(
        NotificationKind::TaskAssigned,
        Subject::Task(first.id()),
        owner.id(),
        first.title(),
    )?;
    let rendered = render(&event, owner.display_name())?;
    let at = first.created_at();
    let row = Notification::for_recipient(&event, reader.id(), rendered.clone(), at);
    let replay = Notification::for_recipient(&event, reader.id(), rendered, at);
    let mut deliver = ChangeSet::new();
    deliver.insert_notifications([row, replay]);
    let delivered = store.commit(deliver).await?;
    ensure!(delivered.notifications_inserted == 1);
    ensure!(store.count_unread(reader.id()).await? == 1);
    Ok(())
}

/// A pending edit request excludes a second one and resolves only once.
///
/// # Errors
///
/// Returns an error when the store lets a second pending request or a
/// second resolution through.
pub async fn edit_request_guards<S: EngineStore>(store: &S) -> eyre::Result<()> {
    let owner = profile("Owner", "owner@example.com", Role::ElevatedAdmin)?;
    let first = task("First", &owner)?;
    let mut seed = ChangeSet::new();
    seed.insert_profile(owner.clone()).insert_task(first.clone());
    store.commit(seed).await?;

    let proposal = ProposedChanges::new().with_title("Renamed");
    let pending = EditRequest::pending(first.id(), owner.id(), proposal.clone(), &DefaultClock);
    let mut file = ChangeSet::new();
    file.insert_edit_request(pending.clone());
    store.commit(file).await?;

    let mut file_again = ChangeSet::new();
    file_again.insert_edit_request(EditRequest::pending(
        first.id(),
        owner.id(),
        proposal,
        &DefaultClock,
    ));
    let second = store.commit(file_again).await;
    ensure!(
        matches!(second, Err(StoreError::PendingEditRequestExists(_))),
        "expected pending request conflict, got {second:?}"
    );

    let mut approved = pending.clone();
    approved.resolve(owner.id(), ReviewDecision::Approve, None, &DefaultClock)?;
    let mut rejected = pending;
    rejected.resolve(owner.id(), ReviewDecision::Reject, None, &DefaultClock)?;
    let mut resolve = ChangeSet::new();
    resolve.resolve_edit_request(approved);
    store.commit(resolve).await?;
    let mut resolve_again = ChangeSet::new();
    resolve_again.resolve_edit_request(rejected);
    let late = store.commit(resolve_again).await;
    ensure!(
        matches!(late, Err(StoreError::EditRequestAlreadyResolved(_))),
        "expected already resolved, got {late:?}"
    );
    ensure!(store.find_pending_edit_request(first.id()).await?.is_none());
    Ok(())
}

/// Directory reads exclude tombstoned profiles wherever a live user is
/// expected.
///
/// # Errors
///
/// Returns an error when a tombstoned profile leaks into a live read.
pub async fn directory_reads_skip_tombstones<S: EngineStore>(store: &S) -> eyre::Result<()> {
    let admin = profile("Admin", "admin@example.com", Role::Admin)?;
    let mut gone = profile("Gone", "gone@example.com", Role::Admin)?;
    let user = profile("User", "user@example.com", Role::StandardUser)?;
    let mut seed = ChangeSet::new();
    seed.insert_profile(admin.clone())
        .insert_profile(gone.clone())
        .insert_profile(user.clone());
    store.commit(seed).await?;
    gone.tombstone(admin.id(), &DefaultClock)?;
    let mut delete = ChangeSet::new();
    delete.update_profile(gone.clone());
    store.commit(delete).await?;

    let admins = store.active_users_with_roles(&Role::ADMINISTRATORS).await?;
    let everyone = store.active_users().await?;
    let kept = store
        .retain_active(&BTreeSet::from([admin.id(), gone.id(), user.id()]))
        .await?;
    let unfiltered = store.find_profile_unfiltered(gone.id()).await?;

    ensure!(admins == BTreeSet::from([admin.id()]));
    ensure!(everyone == BTreeSet::from([admin.id(), user.id()]));
    ensure!(kept == everyone);
    ensure!(unfiltered.is_some_and(|found| !found.is_active()));
    Ok(())
}

/// A tombstone and a pending edit request never coexist, whichever of the
/// two writers commits second.
///
/// # Errors
///
/// Returns an error when either commit slips past the other's guard.
pub async fn tombstone_and_pending_request_exclude_each_other<S: EngineStore>(
    store: &S,
) -> eyre::Result<()> {
    let owner = profile("Owner", "owner@example.com", Role::ElevatedAdmin)?;
    let requested = task("Requested", &owner)?;
    let deleted = task("Deleted", &owner)?;
    let mut seed = ChangeSet::new();
    seed.insert_profile(owner.clone())
        .insert_task(requested.clone())
        .insert_task(deleted.clone());
    store.commit(seed).await?;
    let proposal = ProposedChanges::new().with_title("Renamed");

    let mut file = ChangeSet::new();
    file.insert_edit_request(EditRequest::pending(
        requested.id(),
        owner.id(),
        proposal.clone(),
        &DefaultClock,
    ));
    store.commit(file).await?;
    let mut tombstoned = requested.clone();
    tombstoned.tombstone_by(owner.id(), &DefaultClock)?;
    let mut delete = ChangeSet::new();
    delete.update_task(tombstoned, requested.version());
    let blocked_delete = store.commit(delete).await;
    ensure!(
        matches!(blocked_delete, Err(StoreError::TaskHasPendingEditRequest(_))),
        "expected pending request to block the tombstone, got {blocked_delete:?}"
    );
    let still_live = store
        .find_task(requested.id())
        .await?
        .ok_or_else(|| eyre::eyre!("requested task vanished"))?;
    ensure!(!still_live.is_deleted());

    let mut gone = deleted.clone();
    gone.tombstone_by(owner.id(), &DefaultClock)?;
    let mut delete_first = ChangeSet::new();
    delete_first.update_task(gone, deleted.version());
    store.commit(delete_first).await?;
    let mut late_file = ChangeSet::new();
    late_file.insert_edit_request(EditRequest::pending(
        deleted.id(),
        owner.id(),
        proposal,
        &DefaultClock,
    ));
    let blocked_file = store.commit(late_file).await;
    ensure!(
        matches!(blocked_file, Err(StoreError::TaskDeleted(_))),
        "expected tombstone to block the request, got {blocked_file:?}"
    );
    ensure!(store.find_pending_edit_request(deleted.id()).await?.is_none());
    Ok(())
}
