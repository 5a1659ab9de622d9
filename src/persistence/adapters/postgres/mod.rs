//! `PostgreSQL` store implementing every engine port with Diesel.
//!
//! Each commit runs in one database transaction; task updates are guarded
//! by the stored version and edit request resolutions by the pending
//! status, so concurrent writers serialize on the row and the loser sees a
//! stale-state error instead of overwriting the winner.

mod commit;
mod conversion;
mod models;
mod purge;
mod reads;
mod schema;

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;

use crate::persistence::{StoreError, StoreResult};

/// `PostgreSQL` connection pool type used by the store.
pub type EnginePgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed engine store.
///
/// All database work is offloaded to the blocking thread pool via
/// [`tokio::task::spawn_blocking`].
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: EnginePgPool,
}

impl PostgresStore {
    /// Creates a store from a connection pool.
    #[must_use]
    pub const fn new(pool: EnginePgPool) -> Self {
        Self { pool }
    }

    /// Builds a pool for `database_url` and wraps it in a store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] when the pool cannot establish
    /// its initial connections.
    pub fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(max_connections)
            .build(manager)
            .map_err(StoreError::persistence)?;
        Ok(Self::new(pool))
    }

    async fn run_blocking<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(StoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(StoreError::persistence)?
    }
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}
