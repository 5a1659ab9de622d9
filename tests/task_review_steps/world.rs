//! Shared world state for task review BDD scenarios.

use crate::test_helpers::Team;
use rstest::fixture;
use taskward::persistence::adapters::memory::InMemoryStore;
use taskward::task::domain::{Task, TaskId};
use taskward::task::services::TaskServiceError;

/// Team type used by the BDD world.
pub type ReviewTeam = Team<InMemoryStore>;

/// Scenario world for task review behaviour tests.
#[derive(Default)]
pub struct TaskReviewWorld {
    pub team: Option<ReviewTeam>,
    pub task: Option<Task>,
    pub outcome: Option<Result<Task, TaskServiceError>>,
}

impl TaskReviewWorld {
    /// Returns the seeded team.
    pub fn team(&self) -> eyre::Result<&ReviewTeam> {
        self.team
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing seeded team in scenario world"))
    }

    /// Returns the identifier of the scenario task.
    pub fn task_id(&self) -> eyre::Result<TaskId> {
        self.task
            .as_ref()
            .map(Task::id)
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskReviewWorld {
    TaskReviewWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
