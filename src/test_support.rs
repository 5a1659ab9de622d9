//! Fixtures shared by unit tests across contexts.

use crate::Engine;
use crate::identity::domain::{Role, UserId};
use crate::identity::services::RegisterUserRequest;
use crate::persistence::adapters::memory::InMemoryStore;
use crate::task::domain::Task;
use crate::task::services::CreateTaskRequest;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use std::sync::{Arc, Mutex, PoisonError};

/// Clock that only moves when a test advances it.
#[derive(Debug)]
pub(crate) struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    pub(crate) fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 1, 5, 9, 0, 0)
            .single()
            .unwrap_or_default();
        Self {
            now: Mutex::new(start),
        }
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) type TestEngine = Engine<InMemoryStore, SteppingClock>;

/// An engine over an in-memory store seeded with one user per role plus a
/// second standard user.
pub(crate) struct Team {
    pub(crate) store: Arc<InMemoryStore>,
    pub(crate) clock: Arc<SteppingClock>,
    pub(crate) engine: TestEngine,
    pub(crate) elevated: UserId,
    pub(crate) admin: UserId,
    pub(crate) worker: UserId,
    pub(crate) teammate: UserId,
}

impl Team {
    pub(crate) async fn assemble() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(SteppingClock::default());
        let engine = Engine::new(Arc::clone(&store), Arc::clone(&clock));
        let elevated = engine
            .identity()
            .bootstrap(RegisterUserRequest::new(
                "Erin Elevated",
                "erin@example.com",
                Role::ElevatedAdmin,
            ))
            .await
            .expect("bootstrap elevated admin")
            .id();
        let admin = register(&engine, elevated, "Ada Admin", Role::Admin).await;
        let worker = register(&engine, elevated, "Wes Worker", Role::StandardUser).await;
        let teammate = register(&engine, elevated, "Tia Teammate", Role::StandardUser).await;
        Self {
            store,
            clock,
            engine,
            elevated,
            admin,
            worker,
            teammate,
        }
    }

    /// Creates a task assigned to the worker.
    pub(crate) async fn task_for_worker(&self, title: &str) -> Task {
        self.engine
            .lifecycle()
            .create_task(
                self.admin,
                CreateTaskRequest::new(title).with_assignees([self.worker]),
            )
            .await
            .expect("create task")
    }

    /// Creates a worker task and drives it to done.
    pub(crate) async fn task_in_review(&self, title: &str) -> Task {
        let task = self.task_for_worker(title).await;
        let lifecycle = self.engine.lifecycle();
        lifecycle
            .start(self.worker, task.id())
            .await
            .expect("start task");
        lifecycle
            .submit_for_review(self.worker, task.id())
            .await
            .expect("submit task")
    }
}

async fn register(engine: &TestEngine, actor: UserId, name: &str, role: Role) -> UserId {
    let email = format!(
        "{}@example.com",
        name.split_whitespace().next().unwrap_or(name).to_lowercase()
    );
    engine
        .identity()
        .register_user(actor, RegisterUserRequest::new(name, email, role))
        .await
        .expect("register team member")
        .id()
}
