//! SQLite store for family members, categories and tasks.
//!
//! One [`Database`] wraps a single connection behind a mutex and is cheap to
//! clone; every operation holds the lock for one statement or one
//! transaction. Timestamps are stored as RFC 3339 text with nanosecond
//! precision, which keeps them lexically ordered.

mod categories;
mod family_members;
pub mod schema;
mod tasks;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::types::Type;
use rusqlite::{Connection, Row};

use crate::error::{EntityKind, Error, Result};

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) a database file. Parent directories are created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open the database in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "family-tasks").ok_or(Error::NoDataDir)?;
        Ok(dirs.data_dir().join("family-tasks.db"))
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Apply pending schema migrations. Safe to call repeatedly.
    pub fn migrate(&self) -> Result<()> {
        self.with_connection(|conn| {
            let current = current_version(conn)?;
            let latest = schema::latest_version();

            if current > latest {
                return Err(Error::UnsupportedSchemaVersion {
                    db_version: current,
                    latest_supported: latest,
                });
            }
            if current == latest {
                return Ok(());
            }

            let tx = conn.transaction()?;
            for migration in schema::MIGRATIONS {
                if migration.version <= current {
                    continue;
                }
                tx.execute_batch(migration.sql)?;
                tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
            }
            tx.commit()?;

            tracing::info!("Migrated database schema from v{} to v{}", current, latest);
            Ok(())
        })
    }

    pub fn schema_version(&self) -> Result<u32> {
        self.with_connection(|conn| current_version(conn))
    }

    /// Run `f` with exclusive access to the underlying connection.
    pub fn with_connection<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut conn = self.conn.lock().map_err(|_| Error::LockPoisoned)?;
        f(&mut conn)
    }
}

fn current_version(conn: &Connection) -> Result<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

fn exists(conn: &Connection, entity: EntityKind, id: i64) -> Result<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", entity.table());
    Ok(conn.query_row(&sql, [id], |row| row.get::<_, bool>(0))?)
}

pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

/// A modification stamp strictly later than `previous`, even when the clock
/// has not moved since.
pub(crate) fn next_stamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > previous {
        now
    } else {
        previous + chrono::Duration::nanoseconds(1)
    }
}

pub(crate) fn ts_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn ts_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_ts(idx, &raw)
}

pub(crate) fn opt_ts_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| parse_ts(idx, &raw)).transpose()
}

fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn next_stamp_is_strictly_later() {
        let future = Utc::now() + chrono::Duration::hours(1);
        let stamp = next_stamp(future);
        assert!(stamp > future);
        assert_eq!(stamp - future, chrono::Duration::nanoseconds(1));

        let past = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(next_stamp(past) > past);
    }

    #[test]
    fn stored_timestamps_sort_lexically() {
        let earlier = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let later = earlier + chrono::Duration::nanoseconds(1);
        assert!(ts_to_sql(&earlier) < ts_to_sql(&later));
    }

    #[test]
    fn migrate_sets_user_version() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.schema_version().unwrap(), 0);
        db.migrate().unwrap();
        assert_eq!(db.schema_version().unwrap(), schema::latest_version());
    }
}
