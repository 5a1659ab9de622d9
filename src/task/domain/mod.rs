//! Domain model for the task lifecycle.
//!
//! The task aggregate owns its status machine and tombstone; assignments,
//! edit requests, and transition records are separate rows keyed by task.
//! All infrastructure concerns stay outside this boundary.

mod assignment;
mod changes;
mod edit_request;
mod error;
mod ids;
mod status;
mod task;
mod transition;

pub use assignment::{AssigneeDiff, Assignment, AssignmentKey, effective_assignees};
pub use changes::{FieldPatch, MAX_TITLE_CHARS, ProposedChanges, normalize_title};
pub use edit_request::{
    EditRequest, EditRequestOrigin, EditRequestStatus, PersistedEditRequestData, ReviewDecision,
};
pub use error::{ParseTaskValueError, TaskDomainError};
pub use ids::{EditRequestId, ProjectId, TaskId, TransitionId};
pub use status::{ClosedReason, Priority, TaskStatus, TransitionAuthority, TransitionKind};
pub use task::{
    ArchiveMetadata, EditGrant, NewTaskData, PersistedTaskData, ReviewMetadata, Task, Tombstone,
    TransitionActor,
};
pub use transition::StatusTransition;
