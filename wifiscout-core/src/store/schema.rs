//! SQLite schema for access points and their performance metrics.

use rusqlite::{Connection, Error as SqliteError, OptionalExtension, Transaction};
use thiserror::Error;

/// Version recorded in `wifiscout_schema_version`.
pub(crate) const SCHEMA_VERSION: i64 = 1;

/// Errors raised when initialising the metrics schema.
#[derive(Debug, Error)]
pub enum MetricsSchemaError {
    /// Enabling foreign key enforcement failed.
    #[error("failed to enable SQLite foreign keys")]
    ForeignKeys {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A migration statement failed.
    #[error("failed to execute migration step '{step}'")]
    Migration {
        /// Description of the failing step.
        step: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// The database was created by an incompatible release.
    #[error("expected metrics schema version {expected} but found {found}")]
    VersionMismatch {
        /// Version this build understands.
        expected: i64,
        /// Version recorded in the database.
        found: i64,
    },
}

/// Create the tables, index and version marker when missing.
pub(crate) fn initialise_schema(connection: &mut Connection) -> Result<(), MetricsSchemaError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| MetricsSchemaError::ForeignKeys { source })?;

    let transaction = connection
        .transaction()
        .map_err(|source| MetricsSchemaError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    create_tables(&transaction)?;
    run_migration_step(
        &transaction,
        "index performance_metrics",
        "CREATE INDEX IF NOT EXISTS idx_performance_metrics_ap_time
            ON performance_metrics(ap_id, captured_at)",
    )?;
    ensure_schema_version(&transaction)?;

    transaction
        .commit()
        .map_err(|source| MetricsSchemaError::Migration {
            step: "commit schema transaction",
            source,
        })
}

fn create_tables(transaction: &Transaction<'_>) -> Result<(), MetricsSchemaError> {
    run_migration_step(
        transaction,
        "create access_points",
        "CREATE TABLE IF NOT EXISTS access_points (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ap_name TEXT NOT NULL UNIQUE CHECK (length(trim(ap_name)) > 0),
            building TEXT NOT NULL DEFAULT '',
            floor INTEGER NOT NULL DEFAULT 0,
            room_number TEXT NOT NULL DEFAULT '',
            latitude REAL,
            longitude REAL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )",
    )?;
    run_migration_step(
        transaction,
        "create performance_metrics",
        "CREATE TABLE IF NOT EXISTS performance_metrics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ap_id INTEGER NOT NULL,
            download_speed REAL,
            upload_speed REAL,
            latency_ms REAL,
            packet_loss REAL,
            connected_users INTEGER,
            signal_strength REAL,
            bandwidth_usage REAL,
            captured_at TEXT NOT NULL,
            FOREIGN KEY (ap_id) REFERENCES access_points(id) ON DELETE CASCADE
        )",
    )
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<(), MetricsSchemaError> {
    run_migration_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS wifiscout_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0)
        ) WITHOUT ROWID",
    )?;

    let existing: Option<i64> = transaction
        .query_row(
            "SELECT version FROM wifiscout_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| MetricsSchemaError::Migration {
            step: "read schema version",
            source,
        })?;

    match existing {
        Some(version) if version == SCHEMA_VERSION => Ok(()),
        Some(found) => Err(MetricsSchemaError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found,
        }),
        None => transaction
            .execute(
                "INSERT INTO wifiscout_schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )
            .map(|_| ())
            .map_err(|source| MetricsSchemaError::Migration {
                step: "record schema version",
                source,
            }),
    }
}

fn run_migration_step(
    transaction: &Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), MetricsSchemaError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| MetricsSchemaError::Migration { step, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn initialisation_is_idempotent() {
        let mut connection = Connection::open_in_memory().expect("open database");
        initialise_schema(&mut connection).expect("first initialisation");
        initialise_schema(&mut connection).expect("second initialisation");

        let version: i64 = connection
            .query_row("SELECT version FROM wifiscout_schema_version", [], |row| {
                row.get(0)
            })
            .expect("read version");
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[rstest]
    fn rejects_future_schema_versions() {
        let mut connection = Connection::open_in_memory().expect("open database");
        initialise_schema(&mut connection).expect("initialise");
        connection
            .execute("UPDATE wifiscout_schema_version SET version = 7", [])
            .expect("bump version");

        let error = initialise_schema(&mut connection).expect_err("mismatch");
        assert!(matches!(
            error,
            MetricsSchemaError::VersionMismatch { found: 7, .. }
        ));
    }
}
