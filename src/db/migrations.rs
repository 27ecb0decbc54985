//! Forward-only schema migrations.
//!
//! The schema version lives in `schema_meta`; [`run_migrations`] walks it up to
//! [`CURRENT_SCHEMA_VERSION`] one step at a time.

use rusqlite::{Connection, OptionalExtension};

/// The schema version that the current binary expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// A step from version `n` to `n + 1`.
type Migration = fn(&Connection) -> rusqlite::Result<()>;

/// Steps indexed from version 1; `MIGRATIONS[0]` turns a v1 database into v2.
const MIGRATIONS: &[Migration] = &[];

pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'schema_version'",
        [],
        |row| {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().unwrap_or(0))
        },
    )
}

fn update_schema_version(conn: &Connection, version: u32) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE schema_meta SET value = ?1 WHERE key = 'schema_version'",
        [version.to_string()],
    )?;
    Ok(())
}

/// Get the embedding model the stored vectors were produced with, if recorded.
pub fn get_embedding_model(conn: &Connection) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'embedding_model'",
        [],
        |row| row.get::<_, String>(0),
    )
    .optional()
}

/// Record the embedding model used for the stored vectors.
pub fn set_embedding_model(conn: &Connection, model: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_meta (key, value) VALUES ('embedding_model', ?1)",
        [model],
    )?;
    Ok(())
}

/// Run any pending migrations. Each step commits together with its version bump.
pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    let mut version = get_schema_version(conn)?;
    tracing::debug!(schema_version = version, target = CURRENT_SCHEMA_VERSION, "checking migrations");

    if version > CURRENT_SCHEMA_VERSION {
        tracing::warn!(
            schema_version = version,
            supported = CURRENT_SCHEMA_VERSION,
            "database was written by a newer larder; leaving schema untouched"
        );
        return Ok(());
    }

    while version < CURRENT_SCHEMA_VERSION {
        let next = version + 1;
        let step = (version as usize).checked_sub(1).and_then(|i| MIGRATIONS.get(i));
        let Some(step) = step else {
            tracing::error!(version = next, "unknown migration target");
            break;
        };
        tracing::info!(from = version, to = next, "running migration");

        let tx = conn.unchecked_transaction()?;
        step(&tx)?;
        update_schema_version(&tx, next)?;
        tx.commit()?;

        version = next;
    }

    Ok(())
}
