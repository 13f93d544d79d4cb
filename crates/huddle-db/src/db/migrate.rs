//! Embedded schema migrations.
//!
//! Migrations run over a blocking wrapper around the async connection, on a
//! dedicated blocking thread, before the pool starts serving requests.

use diesel_async::AsyncPgConnection;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// ## Summary
/// Applies all pending migrations against the given database.
///
/// ## Errors
/// Returns an error if the connection cannot be established or a migration
/// fails to apply.
#[tracing::instrument(skip(database_url))]
pub async fn run_pending(database_url: &str) -> anyhow::Result<()> {
    let url = database_url.to_owned();

    tokio::task::spawn_blocking(move || {
        use diesel::Connection;

        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&url)?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow::anyhow!("migration failed: {e}"))?;

        for version in applied {
            tracing::info!(%version, "Applied migration");
        }

        Ok(())
    })
    .await?
}
