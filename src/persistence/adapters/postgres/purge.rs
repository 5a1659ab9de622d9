//! Batched hard deletion of expired tombstones.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use super::PostgresStore;
use super::conversion::to_db_count;
use super::schema::{notifications, project_members, task_assignments, tasks, user_profiles};
use crate::persistence::{PurgeBatch, Purger, StoreError, StoreResult};

#[async_trait]
impl Purger for PostgresStore {
    async fn purge_batch(&self, cutoff: DateTime<Utc>, limit: usize) -> StoreResult<PurgeBatch> {
        let batch_size = to_db_count(limit)?;
        self.run_blocking(move |connection| {
            connection.transaction::<_, StoreError, _>(|tx| {
                let mut batch = PurgeBatch::default();
                purge_tasks(tx, cutoff, batch_size, &mut batch)?;
                purge_users(tx, cutoff, batch_size, &mut batch)?;
                Ok(batch)
            })
        })
        .await
    }
}

fn purge_tasks(
    connection: &mut PgConnection,
    cutoff: DateTime<Utc>,
    batch_size: i64,
    batch: &mut PurgeBatch,
) -> StoreResult<()> {
    let ids = tasks::table
        .filter(tasks::deleted_at.is_not_null())
        .filter(tasks::deleted_at.lt(cutoff))
        .order(tasks::deleted_at.asc())
        .limit(batch_size)
        .select(tasks::id)
        .for_update()
        .skip_locked()
        .load::<Uuid>(connection)?;
    if ids.is_empty() {
        return Ok(());
    }

    batch.assignments += diesel::delete(
        task_assignments::table.filter(task_assignments::task_id.eq_any(&ids)),
    )
    .execute(connection)?;
    batch.tasks += diesel::delete(
        tasks::table
            .filter(tasks::id.eq_any(&ids))
            .filter(tasks::deleted_at.is_not_null()),
    )
    .execute(connection)?;
    Ok(())
}

fn purge_users(
    connection: &mut PgConnection,
    cutoff: DateTime<Utc>,
    batch_size: i64,
    batch: &mut PurgeBatch,
) -> StoreResult<()> {
    let ids = user_profiles::table
        .filter(user_profiles::deleted_at.is_not_null())
        .filter(user_profiles::deleted_at.lt(cutoff))
        .order(user_profiles::deleted_at.asc())
        .limit(batch_size)
        .select(user_profiles::id)
        .for_update()
        .skip_locked()
        .load::<Uuid>(connection)?;
    if ids.is_empty() {
        return Ok(());
    }

    batch.assignments += diesel::delete(
        task_assignments::table.filter(task_assignments::user_id.eq_any(&ids)),
    )
    .execute(connection)?;
    batch.notifications += diesel::delete(
        notifications::table.filter(notifications::recipient_id.eq_any(&ids)),
    )
    .execute(connection)?;
    diesel::delete(project_members::table.filter(project_members::user_id.eq_any(&ids)))
        .execute(connection)?;
    batch.users += diesel::delete(
        user_profiles::table
            .filter(user_profiles::id.eq_any(&ids))
            .filter(user_profiles::deleted_at.is_not_null()),
    )
    .execute(connection)?;
    Ok(())
}
