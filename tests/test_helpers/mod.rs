//! Fixtures shared by the integration test binaries.

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use eyre::WrapErr;
use mockable::Clock;
use std::sync::{Arc, Mutex, PoisonError};
use taskward::Engine;
use taskward::identity::domain::{Role, UserId};
use taskward::identity::services::RegisterUserRequest;
use taskward::persistence::EngineStore;
use taskward::task::domain::Task;
use taskward::task::services::CreateTaskRequest;

/// Clock that only moves when a test advances it.
#[derive(Debug)]
pub struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        let start = Utc
            .with_ymd_and_hms(2026, 2, 2, 8, 30, 0)
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

/// An engine seeded with one user per role plus a second standard user.
pub struct Team<S: EngineStore> {
    pub store: Arc<S>,
    pub clock: Arc<SteppingClock>,
    pub engine: Engine<S, SteppingClock>,
    pub elevated: UserId,
    pub admin: UserId,
    pub worker: UserId,
    pub teammate: UserId,
}

impl<S: EngineStore> Team<S> {
    /// Bootstraps the directory of `store` and registers the team.
    ///
    /// # Errors
    ///
    /// Returns an error when bootstrap or registration fails.
    pub async fn assemble(store: Arc<S>) -> eyre::Result<Self> {
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
            .wrap_err("bootstrap elevated admin")?
            .id();
        let mut members = Vec::with_capacity(3);
        for (name, email, role) in [
            ("Ada Admin", "ada@example.com", Role::Admin),
            ("Wes Worker", "wes@example.com", Role::StandardUser),
            ("Tia Teammate", "tia@example.com", Role::StandardUser),
        ] {
            let profile = engine
                .identity()
                .register_user(elevated, RegisterUserRequest::new(name, email, role))
                .await
                .wrap_err_with(|| format!("register {name}"))?;
            members.push(profile.id());
        }
        let [admin, worker, teammate] = *members.as_slice() else {
            return Err(eyre::eyre!("expected three registered members"));
        };
        Ok(Self {
            store,
            clock,
            engine,
            elevated,
            admin,
            worker,
            teammate,
        })
    }

    /// Creates a task assigned to the worker.
    ///
    /// # Errors
    ///
    /// Returns an error when task creation fails.
    pub async fn task_for_worker(&self, title: &str) -> eyre::Result<Task> {
        self.engine
            .lifecycle()
            .create_task(
                self.admin,
                CreateTaskRequest::new(title).with_assignees([self.worker]),
            )
            .await
            .wrap_err("create worker task")
    }

    /// Creates a worker task and drives it to done.
    ///
    /// # Errors
    ///
    /// Returns an error when creation or either transition fails.
    pub async fn task_in_review(&self, title: &str) -> eyre::Result<Task> {
        let task = self.task_for_worker(title).await?;
        let lifecycle = self.engine.lifecycle();
        lifecycle
            .start(self.worker, task.id())
            .await
            .wrap_err("start task")?;
        lifecycle
            .submit_for_review(self.worker, task.id())
            .await
            .wrap_err("submit task")
    }
}
