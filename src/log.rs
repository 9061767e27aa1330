//! Append-only SQLite log of committed schema records

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::warn;

use crate::checksum::Checksum;
use crate::error::{RegistryError, Result};
use crate::schema::SchemaRecord;
use crate::version::VersionId;

/// Busy timeout applied to the underlying connection
const BUSY_TIMEOUT: Duration = Duration::from_millis(5_000);

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS schemas (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    version TEXT NOT NULL,
    content TEXT NOT NULL,
    checksum TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (name, version)
);
CREATE INDEX IF NOT EXISTS idx_schemas_name ON schemas (name);
";

const INSERT_RECORD: &str =
    "INSERT INTO schemas (name, version, content, checksum, created_at) VALUES (?1, ?2, ?3, ?4, ?5)";
const QUERY_VERSIONS: &str = "SELECT version FROM schemas WHERE name = ?1 ORDER BY id";
const QUERY_RECORD: &str =
    "SELECT name, version, content, checksum, created_at FROM schemas WHERE name = ?1 AND version = ?2";

/// Durable, append-only store of committed schema records.
///
/// Rows are inserted exactly once and never updated or deleted. The
/// `(name, version)` uniqueness constraint lives in SQL as the last line
/// of defense against racing commits.
pub struct SchemaLog {
    conn: Mutex<Option<Connection>>,
}

impl SchemaLog {
    /// Open the log at `location`, creating its schema if needed.
    ///
    /// Safe to call against an existing database; table creation is
    /// idempotent.
    pub fn open(location: impl AsRef<Path>) -> Result<Self> {
        let location = location.as_ref();
        let conn = Connection::open(location).map_err(|err| {
            RegistryError::Configuration(format!(
                "cannot open log store at {}: {}",
                location.display(),
                err
            ))
        })?;

        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|err| RegistryError::Configuration(err.to_string()))?;
        conn.execute_batch("PRAGMA journal_mode = wal;")
            .map_err(|err| RegistryError::Configuration(err.to_string()))?;
        conn.execute_batch(CREATE_TABLES).map_err(|err| {
            RegistryError::Configuration(format!("cannot initialize log store: {err}"))
        })?;

        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Append a committed record
    pub fn append(&self, record: &SchemaRecord) -> Result<()> {
        let guard = self.lock()?;
        let conn = Self::connection(&guard)?;

        let result = conn.execute(
            INSERT_RECORD,
            params![
                record.name,
                record.version.as_str(),
                record.content,
                record.checksum.as_str(),
                record.created_at.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(RegistryError::Durability(format!(
                    "record for '{}' version {} already exists",
                    record.name, record.version
                )))
            }
            Err(err) => Err(RegistryError::Durability(err.to_string())),
        }
    }

    /// All versions ever committed under `name`, in insertion order.
    ///
    /// A name with no committed records yields an empty list, not an
    /// error.
    pub fn versions(&self, name: &str) -> Result<Vec<VersionId>> {
        let guard = self.lock()?;
        let conn = Self::connection(&guard)?;

        let mut stmt = conn
            .prepare(QUERY_VERSIONS)
            .map_err(|err| RegistryError::Durability(err.to_string()))?;
        let rows = stmt
            .query_map(params![name], |row| row.get::<_, String>(0))
            .map_err(|err| RegistryError::Durability(err.to_string()))?;

        rows.map(|row| {
            row.map(VersionId::from)
                .map_err(|err| RegistryError::Durability(err.to_string()))
        })
        .collect()
    }

    /// Fetch the record stored under `(name, version)`, if any
    pub fn fetch(&self, name: &str, version: &str) -> Result<Option<SchemaRecord>> {
        let guard = self.lock()?;
        let conn = Self::connection(&guard)?;

        conn.query_row(QUERY_RECORD, params![name, version], map_record_row)
            .optional()
            .map_err(|err| RegistryError::Durability(err.to_string()))
    }

    /// Release the underlying connection.
    ///
    /// Later appends and queries fail with a durability error; calling
    /// again is a no-op.
    pub fn close(&self) {
        if let Ok(mut guard) = self.conn.lock() {
            if let Some(conn) = guard.take() {
                if let Err((_, err)) = conn.close() {
                    warn!("log store close failed: {err}");
                }
            }
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>> {
        self.conn
            .lock()
            .map_err(|_| RegistryError::Durability("log store mutex poisoned".to_string()))
    }

    fn connection<'a>(guard: &'a MutexGuard<'_, Option<Connection>>) -> Result<&'a Connection> {
        guard
            .as_ref()
            .ok_or_else(|| RegistryError::Durability("log store is closed".to_string()))
    }
}

fn map_record_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SchemaRecord> {
    let created_at: String = row.get(4)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(err))
        })?
        .with_timezone(&Utc);

    Ok(SchemaRecord {
        name: row.get(0)?,
        version: VersionId::from(row.get::<_, String>(1)?),
        content: row.get(2)?,
        checksum: Checksum::from(row.get::<_, String>(3)?),
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_log(dir: &Path) -> SchemaLog {
        SchemaLog::open(dir.join("registry.db")).unwrap()
    }

    #[test]
    fn test_append_then_fetch() {
        let dir = tempdir().unwrap();
        let log = open_log(dir.path());

        let record = SchemaRecord::new("user", VersionId::from("v1"), "content");
        log.append(&record).unwrap();

        let fetched = log.fetch("user", "v1").unwrap().unwrap();
        assert_eq!(fetched.content, "content");
        assert!(fetched.verify_checksum());
    }

    #[test]
    fn test_duplicate_name_version_rejected() {
        let dir = tempdir().unwrap();
        let log = open_log(dir.path());

        log.append(&SchemaRecord::new("user", VersionId::from("v1"), "a")).unwrap();
        let err = log
            .append(&SchemaRecord::new("user", VersionId::from("v1"), "b"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Durability(_)));
    }

    #[test]
    fn test_versions_in_insertion_order() {
        let dir = tempdir().unwrap();
        let log = open_log(dir.path());

        log.append(&SchemaRecord::new("user", VersionId::from("v1"), "a")).unwrap();
        log.append(&SchemaRecord::new("user", VersionId::from("v2"), "b")).unwrap();

        let versions = log.versions("user").unwrap();
        assert_eq!(versions, vec![VersionId::from("v1"), VersionId::from("v2")]);
    }

    #[test]
    fn test_unknown_name_yields_empty_list() {
        let dir = tempdir().unwrap();
        let log = open_log(dir.path());
        assert!(log.versions("ghost").unwrap().is_empty());
    }

    #[test]
    fn test_open_is_idempotent() {
        let dir = tempdir().unwrap();
        let log = open_log(dir.path());
        log.append(&SchemaRecord::new("user", VersionId::from("v1"), "a")).unwrap();
        log.close();

        let reopened = open_log(dir.path());
        assert_eq!(reopened.versions("user").unwrap().len(), 1);
    }

    #[test]
    fn test_closed_log_rejects_operations() {
        let dir = tempdir().unwrap();
        let log = open_log(dir.path());
        log.close();

        let err = log.versions("user").unwrap_err();
        assert!(matches!(err, RegistryError::Durability(_)));
    }
}
