//! Application services for task orchestration.
//!
//! Every service authorizes through the caller's resolved role, reads
//! through the store ports, and writes one [`ChangeSet`] per operation so
//! the state change and the notifications it raises commit together.
//!
//! [`ChangeSet`]: crate::persistence::ChangeSet

mod assignment;
mod context;
mod editing;
mod error;
mod lifecycle;
mod retention;

pub use assignment::{AssignOutcome, AssignmentService};
pub use editing::EditRequestService;
pub use error::{DeletionTarget, TaskServiceError, TaskServiceResult};
pub use lifecycle::{CreateTaskRequest, InteractionOutcome, TaskLifecycleService};
pub use retention::{PurgeReport, RetentionService, UserDeletionReport};
