//! One handle bundling every service over a shared store and clock.

use crate::identity::services::IdentityService;
use crate::notification::services::NotificationService;
use crate::persistence::EngineStore;
use crate::task::services::{
    AssignmentService, EditRequestService, RetentionService, TaskLifecycleService,
};
use mockable::Clock;
use std::sync::Arc;

/// Every engine service wired to the same store and clock.
#[derive(Clone)]
pub struct Engine<S, C>
where
    S: EngineStore,
    C: Clock + Send + Sync,
{
    identity: IdentityService<S, C>,
    lifecycle: TaskLifecycleService<S, C>,
    assignments: AssignmentService<S, C>,
    edits: EditRequestService<S, C>,
    retention: RetentionService<S, C>,
    notifications: NotificationService<S, C>,
}

impl<S, C> Engine<S, C>
where
    S: EngineStore,
    C: Clock + Send + Sync,
{
    /// Wires every service to `store` and `clock`.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            identity: IdentityService::new(Arc::clone(&store), Arc::clone(&clock)),
            lifecycle: TaskLifecycleService::new(Arc::clone(&store), Arc::clone(&clock)),
            assignments: AssignmentService::new(Arc::clone(&store), Arc::clone(&clock)),
            edits: EditRequestService::new(Arc::clone(&store), Arc::clone(&clock)),
            retention: RetentionService::new(Arc::clone(&store), Arc::clone(&clock)),
            notifications: NotificationService::new(store, clock),
        }
    }

    /// User registration, roles, and profile listings.
    #[must_use]
    pub const fn identity(&self) -> &IdentityService<S, C> {
        &self.identity
    }

    /// Task creation, lookup, and status transitions.
    #[must_use]
    pub const fn lifecycle(&self) -> &TaskLifecycleService<S, C> {
        &self.lifecycle
    }

    /// Assignees, legacy-pointer compatibility, and project rosters.
    #[must_use]
    pub const fn assignments(&self) -> &AssignmentService<S, C> {
        &self.assignments
    }

    /// The edit-request workflow.
    #[must_use]
    pub const fn edits(&self) -> &EditRequestService<S, C> {
        &self.edits
    }

    /// Soft delete, restore, and purge.
    #[must_use]
    pub const fn retention(&self) -> &RetentionService<S, C> {
        &self.retention
    }

    /// Event intake and inboxes.
    #[must_use]
    pub const fn notifications(&self) -> &NotificationService<S, C> {
        &self.notifications
    }
}
