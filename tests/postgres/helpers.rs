//! Shared test helpers for `PostgreSQL` integration tests.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use eyre::WrapErr;
use std::env;
use taskward::persistence::adapters::postgres::PostgresStore;
use tracing::warn;
use uuid::Uuid;

/// Environment variable naming the database the tests may use.
pub const DATABASE_URL_VAR: &str = "TASKWARD_TEST_DATABASE_URL";

/// SQL creating the engine schema.
pub const CREATE_ENGINE_TABLES_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_engine_tables/up.sql");

/// A migrated, uniquely named schema dropped when the harness goes away.
pub struct SchemaHarness {
    base_url: String,
    schema: String,
    store: PostgresStore,
}

impl SchemaHarness {
    /// Provisions a schema when the test database is configured.
    ///
    /// Returns `Ok(None)` when [`DATABASE_URL_VAR`] is unset.
    ///
    /// # Errors
    ///
    /// Returns an error when the schema cannot be created or migrated.
    pub fn provision() -> eyre::Result<Option<Self>> {
        let Ok(base_url) = env::var(DATABASE_URL_VAR) else {
            return Ok(None);
        };
        let schema = format!("taskward_test_{}", Uuid::new_v4().simple());
        let mut connection =
            PgConnection::establish(&base_url).wrap_err("connect to test database")?;
        connection
            .batch_execute(&format!(
                "CREATE SCHEMA {schema}; SET search_path TO {schema}; {CREATE_ENGINE_TABLES_SQL}"
            ))
            .wrap_err("migrate test schema")?;
        let store = PostgresStore::connect(&scoped_url(&base_url, &schema), 4)
            .wrap_err("connect store to test schema")?;
        Ok(Some(Self {
            base_url,
            schema,
            store,
        }))
    }

    /// Returns the store bound to this schema.
    pub const fn store(&self) -> &PostgresStore {
        &self.store
    }

    /// Returns a clone of the store, for handing to an engine.
    pub fn store_handle(&self) -> PostgresStore {
        self.store.clone()
    }
}

impl Drop for SchemaHarness {
    fn drop(&mut self) {
        let dropped = PgConnection::establish(&self.base_url)
            .map_err(eyre::Report::from)
            .and_then(|mut connection| {
                connection
                    .batch_execute(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema))
                    .map_err(eyre::Report::from)
            });
        if let Err(err) = dropped {
            warn!(schema = %self.schema, error = %err, "failed to drop test schema");
        }
    }
}

fn scoped_url(base_url: &str, schema: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}options=-c%20search_path%3D{schema}")
}
