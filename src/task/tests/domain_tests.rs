//! Domain-focused tests for task content, assignments, and edit requests.

use crate::identity::domain::UserId;
use crate::task::domain::{
    AssigneeDiff, Assignment, EditGrant, EditRequest, EditRequestOrigin, EditRequestStatus,
    FieldPatch, MAX_TITLE_CHARS, NewTaskData, Priority, ProposedChanges, ReviewDecision, Task,
    TaskDomainError, TaskStatus, effective_assignees,
};
use crate::test_support::SteppingClock;
use chrono::NaiveDate;
use rstest::{fixture, rstest};
use std::collections::BTreeSet;

#[fixture]
fn clock() -> SteppingClock {
    SteppingClock::default()
}

#[fixture]
fn task(clock: SteppingClock) -> Task {
    Task::new(
        NewTaskData {
            title: "  Prepare payroll  ".to_owned(),
            description: Some("March run".to_owned()),
            ..NewTaskData::default()
        },
        UserId::new(),
        &clock,
    )
    .expect("valid task")
}

#[rstest]
fn new_task_starts_in_todo_with_trimmed_title(task: Task) {
    assert_eq!(task.title(), "Prepare payroll");
    assert_eq!(task.priority(), Priority::Medium);
    assert_eq!(task.status(), TaskStatus::ToDo);
    assert!(task.legacy_assignee().is_none());
    assert!(task.invariants_hold());
}

#[rstest]
#[case("   ".to_owned(), TaskDomainError::EmptyTitle)]
#[case(
    "x".repeat(MAX_TITLE_CHARS + 1),
    TaskDomainError::TitleTooLong { length: MAX_TITLE_CHARS + 1, max: MAX_TITLE_CHARS }
)]
fn new_task_rejects_bad_titles(
    clock: SteppingClock,
    #[case] title: String,
    #[case] expected: TaskDomainError,
) {
    let result = Task::new(
        NewTaskData {
            title,
            ..NewTaskData::default()
        },
        UserId::new(),
        &clock,
    );

    assert_eq!(result, Err(expected));
}

#[rstest]
fn empty_proposal_is_rejected() {
    assert_eq!(
        ProposedChanges::new().validate(),
        Err(TaskDomainError::EmptyProposal)
    );
}

#[rstest]
fn assignee_only_proposal_is_valid_but_touches_no_fields() {
    let proposal = ProposedChanges::new().with_assignees([UserId::new()]);

    assert!(proposal.validate().is_ok());
    assert!(!proposal.touches_fields());
}

#[rstest]
fn apply_changes_updates_only_named_fields(mut task: Task, clock: SteppingClock) {
    let due = NaiveDate::from_ymd_opt(2026, 3, 31).expect("valid date");
    let proposal = ProposedChanges::new()
        .with_due_date(due)
        .with_priority(Priority::Urgent)
        .clearing_description();
    let version = task.version();

    task.apply_changes(&proposal, EditGrant::issue(), &clock)
        .expect("apply");

    assert_eq!(task.title(), "Prepare payroll");
    assert_eq!(task.due_date(), Some(due));
    assert_eq!(task.priority(), Priority::Urgent);
    assert!(task.description().is_none());
    assert_eq!(task.version(), version + 1);
}

#[rstest]
fn blank_description_clears_the_field(mut task: Task, clock: SteppingClock) {
    let proposal = ProposedChanges::new().with_description("   ");

    task.apply_changes(&proposal, EditGrant::issue(), &clock)
        .expect("apply");

    assert!(task.description().is_none());
}

#[rstest]
fn assignee_only_changes_leave_the_task_version_alone(mut task: Task, clock: SteppingClock) {
    let proposal = ProposedChanges::new().with_assignees([UserId::new()]);
    let version = task.version();

    task.apply_changes(&proposal, EditGrant::issue(), &clock)
        .expect("apply");

    assert_eq!(task.version(), version);
}

#[rstest]
fn invalid_title_leaves_task_untouched(mut task: Task, clock: SteppingClock) {
    let before = task.clone();

    let result = task.apply_changes(
        &ProposedChanges::new().with_title(" "),
        EditGrant::issue(),
        &clock,
    );

    assert_eq!(result, Err(TaskDomainError::EmptyTitle));
    assert_eq!(task, before);
}

#[rstest]
fn tombstoned_task_rejects_changes(mut task: Task, clock: SteppingClock) {
    task.tombstone_by(UserId::new(), &clock).expect("tombstone");

    let result = task.apply_changes(
        &ProposedChanges::new().with_title("Renamed"),
        EditGrant::issue(),
        &clock,
    );

    assert_eq!(result, Err(TaskDomainError::TaskDeleted(task.id())));
}

#[rstest]
fn restore_requires_a_tombstone(mut task: Task, clock: SteppingClock) {
    assert_eq!(
        task.restore(&clock),
        Err(TaskDomainError::TaskNotDeleted(task.id()))
    );
    task.tombstone_by(UserId::new(), &clock).expect("tombstone");
    assert!(task.restore(&clock).is_ok());
    assert!(!task.is_deleted());
}

#[rstest]
fn field_patch_round_trips_through_json() -> eyre::Result<()> {
    let proposal = ProposedChanges::new()
        .with_title("Renamed")
        .clearing_due_date();

    let json = serde_json::to_value(&proposal)?;
    let parsed: ProposedChanges = serde_json::from_value(json.clone())?;

    eyre::ensure!(json.get("description").is_none(), "kept fields are omitted");
    eyre::ensure!(parsed == proposal);
    eyre::ensure!(parsed.due_date() == &FieldPatch::Clear);
    Ok(())
}

#[rstest]
fn effective_assignees_union_rows_and_legacy_pointer(mut task: Task, clock: SteppingClock) {
    let row_user = UserId::new();
    let legacy_user = UserId::new();
    let rows = vec![Assignment::new(task.id(), row_user, UserId::new(), &clock)];
    task.set_legacy_assignee(Some(legacy_user), &clock);

    let effective = effective_assignees(&task, &rows);

    assert_eq!(effective, BTreeSet::from([row_user, legacy_user]));
}

#[rstest]
fn assignee_diff_computes_additions_and_removals(task: Task, clock: SteppingClock) {
    let kept = UserId::new();
    let dropped = UserId::new();
    let added = UserId::new();
    let rows = vec![
        Assignment::new(task.id(), kept, UserId::new(), &clock),
        Assignment::new(task.id(), dropped, UserId::new(), &clock),
    ];

    let diff = AssigneeDiff::between(&rows, &BTreeSet::from([kept, added]));

    assert_eq!(diff.added, BTreeSet::from([added]));
    assert_eq!(diff.removed, BTreeSet::from([dropped]));
    assert!(AssigneeDiff::between(&rows, &BTreeSet::from([kept, dropped])).is_empty());
}

#[rstest]
#[case(ReviewDecision::Approve, EditRequestStatus::Approved)]
#[case(ReviewDecision::Reject, EditRequestStatus::Rejected)]
fn edit_request_resolves_exactly_once(
    task: Task,
    clock: SteppingClock,
    #[case] decision: ReviewDecision,
    #[case] expected: EditRequestStatus,
) {
    let reviewer = UserId::new();
    let mut request = EditRequest::pending(
        task.id(),
        UserId::new(),
        ProposedChanges::new().with_title("Renamed"),
        &clock,
    );

    request
        .resolve(reviewer, decision, Some("ok".to_owned()), &clock)
        .expect("first resolution");
    let second = request.resolve(reviewer, ReviewDecision::Approve, None, &clock);

    assert_eq!(request.status(), expected);
    assert_eq!(request.reviewer(), Some(reviewer));
    assert_eq!(request.comments(), Some("ok"));
    assert!(matches!(
        second,
        Err(TaskDomainError::EditRequestNotPending { status, .. }) if status == expected
    ));
}

#[rstest]
fn direct_edit_record_is_self_reviewed(task: Task, clock: SteppingClock) {
    let editor = UserId::new();

    let record = EditRequest::direct(
        task.id(),
        editor,
        ProposedChanges::new().with_priority(Priority::High),
        None,
        &clock,
    );

    assert_eq!(record.origin(), EditRequestOrigin::Direct);
    assert_eq!(record.status(), EditRequestStatus::Approved);
    assert_eq!(record.requester(), editor);
    assert_eq!(record.reviewer(), Some(editor));
    assert_eq!(record.reviewed_at(), Some(record.created_at()));
}
