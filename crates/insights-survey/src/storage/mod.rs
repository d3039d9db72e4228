//! Storage layer for insights-survey.
//!
//! This module defines the [`ResponseStore`] contract used by the survey
//! session and its `SQLite`-backed implementation, plus an optional CSV mirror
//! that copies each saved response to flat files.

pub mod migrations;
pub mod mirror;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::record::{ResponseRecord, COLUMNS};

pub use mirror::{CsvMirror, MirroredStore};

/// Default time to wait for another writer to release the database.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Durable storage for completed survey responses.
///
/// Implementations must be safe to share between sessions: concurrent
/// `persist` calls from different respondents must each land as a complete,
/// independent record.
pub trait ResponseStore: Send + Sync {
    /// Durably write one response and return the id assigned to it.
    ///
    /// Either the whole record becomes readable through
    /// [`ResponseStore::list_all`] or nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be written.
    fn persist(&self, record: &ResponseRecord) -> Result<i64>;

    /// Every stored response, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn list_all(&self) -> Result<Vec<ResponseRecord>>;
}

impl<S: ResponseStore + ?Sized> ResponseStore for Arc<S> {
    fn persist(&self, record: &ResponseRecord) -> Result<i64> {
        (**self).persist(record)
    }

    fn list_all(&self) -> Result<Vec<ResponseRecord>> {
        (**self).list_all()
    }
}

/// `SQLite` response store.
///
/// Writes go through a single connection guarded by a mutex, so one
/// `Storage` can be shared across threads. Other processes writing the same
/// file are serialized by `SQLite`'s own locking, bounded by the busy timeout.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Mutex<Connection>,
}

impl Storage {
    /// Open or create a response database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Open or create a response database with a custom busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open_with_timeout(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DatabaseDirectory {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        // Connection::open does not read the file, so a foreign or damaged
        // file only fails at the first statement below.
        let unavailable = |source: rusqlite::Error| Error::DatabaseOpen {
            path: path.clone(),
            source,
        };

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(unavailable)?;

        conn.busy_timeout(busy_timeout).map_err(unavailable)?;
        // WAL lets the admin export read while respondents are submitting
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")
            .map_err(unavailable)?;

        migrations::initialize_schema(&conn).map_err(|err| match err {
            Error::DatabaseQuery(source) => unavailable(source),
            other => other,
        })?;

        info!("Response database opened at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Count stored responses.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM responses", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_responses = self.count()?;

        let (first, last): (Option<String>, Option<String>) = {
            let conn = self.lock()?;
            let first = conn
                .query_row(
                    "SELECT submitted_at FROM responses ORDER BY id ASC LIMIT 1",
                    [],
                    |row| row.get(0),
                )
                .optional()?;
            let last = conn
                .query_row(
                    "SELECT submitted_at FROM responses ORDER BY id DESC LIMIT 1",
                    [],
                    |row| row.get(0),
                )
                .optional()?;
            (first, last)
        };

        let parse = |s: String| {
            DateTime::parse_from_rfc3339(&s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        };

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_responses,
            first_submission: first.and_then(parse),
            last_submission: last.and_then(parse),
            db_size_bytes,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("response database lock poisoned"))
    }

    /// Convert a database row to a response record.
    ///
    /// Values that cannot be decoded are reported as [`Error::CorruptRecord`]
    /// against the row's id.
    fn row_to_record(row: &rusqlite::Row) -> Result<ResponseRecord> {
        let id: i64 = row.get(0)?;
        let corrupt = |column: usize, message: String| Error::CorruptRecord {
            id,
            message: format!("{}: {message}", COLUMNS[column]),
        };
        let column = |index: usize| -> Result<String> {
            row.get(index).map_err(|e| corrupt(index, e.to_string()))
        };

        let respondent_id =
            Uuid::parse_str(&column(1)?).map_err(|e| corrupt(1, e.to_string()))?;
        let submitted_at = DateTime::parse_from_rfc3339(&column(2)?)
            .map_err(|e| corrupt(2, e.to_string()))?
            .with_timezone(&Utc);
        let age: u32 = row.get(4).map_err(|e| corrupt(4, e.to_string()))?;

        let mut answers: [String; 16] = Default::default();
        for (i, answer) in answers.iter_mut().enumerate() {
            *answer = column(6 + i)?;
        }

        Ok(ResponseRecord {
            id: Some(id),
            respondent_id,
            submitted_at,
            name: column(3)?,
            age,
            occupation: column(5)?,
            answers,
        })
    }
}

impl ResponseStore for Storage {
    fn persist(&self, record: &ResponseRecord) -> Result<i64> {
        let respondent_id = record.respondent_id.to_string();
        let submitted_at = record.submitted_at_string();

        let mut values: Vec<&dyn ToSql> = vec![
            &respondent_id,
            &submitted_at,
            &record.name,
            &record.age,
            &record.occupation,
        ];
        values.extend(record.answers.iter().map(|answer| answer as &dyn ToSql));

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(schema::INSERT_RESPONSE, values.as_slice())?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        debug!(id, respondent_id = %record.respondent_id, "Inserted response");
        Ok(id)
    }

    fn list_all(&self) -> Result<Vec<ResponseRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(schema::SELECT_ALL_RESPONSES)?;
        let mut rows = stmt.query([])?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(Self::row_to_record(row)?);
        }
        Ok(records)
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Total number of responses stored.
    pub total_responses: i64,
    /// Submission time of the oldest response.
    pub first_submission: Option<DateTime<Utc>>,
    /// Submission time of the newest response.
    pub last_submission: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn create_test_record(name: &str) -> ResponseRecord {
        ResponseRecord::new(
            Uuid::new_v4(),
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
            name.to_string(),
            30,
            "Engineer".to_string(),
            std::array::from_fn(|i| format!("{name} answer {}", i + 1)),
        )
    }

    #[test]
    fn test_open_in_memory() {
        let storage = create_test_storage();
        assert_eq!(storage.count().unwrap(), 0);
        assert_eq!(storage.path(), Path::new(":memory:"));
    }

    #[test]
    fn test_persist_and_list_round_trip() {
        let storage = create_test_storage();
        let record = create_test_record("Ana");

        let id = storage.persist(&record).unwrap();
        let records = storage.list_all().unwrap();

        assert_eq!(records.len(), 1);
        let mut expected = record;
        expected.id = Some(id);
        assert_eq!(records[0], expected);
    }

    #[test]
    fn test_list_all_in_insertion_order() {
        let storage = create_test_storage();
        let names = ["Ana", "Ben", "Caro"];
        for name in names {
            storage.persist(&create_test_record(name)).unwrap();
        }

        let listed: Vec<String> = storage
            .list_all()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(listed, names);
    }

    #[test]
    fn test_duplicate_submissions_are_kept() {
        let storage = create_test_storage();
        let record = create_test_record("Ana");
        let first = storage.persist(&record).unwrap();
        let second = storage.persist(&record).unwrap();
        assert_ne!(first, second);
        assert_eq!(storage.count().unwrap(), 2);
    }

    #[test]
    fn test_blank_and_unicode_answers() {
        let storage = create_test_storage();
        let mut record = create_test_record("Zoë");
        record.answers[0] = String::new();
        record.answers[1] = "日本語, \"quoted\"\nand multi-line".to_string();
        record.answers[2] = "x".repeat(100_000);

        storage.persist(&record).unwrap();
        let stored = storage.list_all().unwrap().remove(0);

        assert_eq!(stored.name, "Zoë");
        assert_eq!(stored.question(1), Some(""));
        assert_eq!(stored.question(2), Some("日本語, \"quoted\"\nand multi-line"));
        assert_eq!(stored.question(3).map(str::len), Some(100_000));
    }

    #[test]
    fn test_stats_empty() {
        let storage = create_test_storage();
        let stats = storage.stats().unwrap();

        assert_eq!(stats.total_responses, 0);
        assert!(stats.first_submission.is_none());
        assert!(stats.last_submission.is_none());
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_stats_with_data() {
        let storage = create_test_storage();
        let mut early = create_test_record("Ana");
        early.submitted_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut late = create_test_record("Ben");
        late.submitted_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        storage.persist(&early).unwrap();
        storage.persist(&late).unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.total_responses, 2);
        assert_eq!(stats.first_submission, Some(early.submitted_at));
        assert_eq!(stats.last_submission, Some(late.submitted_at));
    }

    #[test]
    fn test_corrupt_row_reported() {
        let storage = create_test_storage();
        let id = storage.persist(&create_test_record("Ana")).unwrap();
        storage
            .lock()
            .unwrap()
            .execute("UPDATE responses SET submitted_at = 'yesterday'", [])
            .unwrap();

        let err = storage.list_all().unwrap_err();
        match err {
            Error::CorruptRecord { id: row_id, message } => {
                assert_eq!(row_id, id);
                assert!(message.starts_with("submitted_at"), "{message}");
            }
            other => panic!("expected corrupt record, got {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_respondent_id_reported() {
        let storage = create_test_storage();
        storage.persist(&create_test_record("Ana")).unwrap();
        let id = storage.persist(&create_test_record("Ben")).unwrap();
        storage
            .lock()
            .unwrap()
            .execute("UPDATE responses SET respondent_id = 'nope' WHERE id = ?1", [id])
            .unwrap();

        let err = storage.list_all().unwrap_err();
        assert!(matches!(err, Error::CorruptRecord { id: row_id, .. } if row_id == id));
    }

    #[test]
    fn test_reopen_keeps_responses() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("survey_responses.db");

        {
            let storage = Storage::open(&db_path).unwrap();
            storage.persist(&create_test_record("Ana")).unwrap();
            assert_eq!(storage.path(), db_path);
        }

        let storage = Storage::open(&db_path).unwrap();
        let records = storage.list_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Ana");
        assert!(storage.stats().unwrap().db_size_bytes > 0);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested_path = dir.path().join("nested/deeper/responses.db");

        let _storage = Storage::open(&nested_path).unwrap();
        assert!(nested_path.exists());
    }

    #[test]
    fn test_open_unwritable_path_is_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let err = Storage::open(blocker.join("responses.db")).unwrap_err();
        assert!(err.is_storage_unavailable());
    }

    #[test]
    fn test_open_foreign_file_is_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("responses.db");
        std::fs::write(&db_path, vec![b'x'; 4096]).unwrap();

        let err = Storage::open(&db_path).unwrap_err();
        assert!(err.is_storage_unavailable(), "{err}");
        assert!(matches!(err, Error::DatabaseOpen { .. }));
    }

    #[test]
    fn test_open_parent_is_file_is_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let err = Storage::open(blocker.join("nested").join("responses.db")).unwrap_err();
        assert!(matches!(err, Error::DatabaseDirectory { .. }));
        assert!(err.is_storage_unavailable());
    }

    #[test]
    fn test_concurrent_persist() {
        let storage = Arc::new(create_test_storage());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let storage = Arc::clone(&storage);
                std::thread::spawn(move || {
                    for j in 0..10 {
                        let record = create_test_record(&format!("respondent-{i}-{j}"));
                        storage.persist(&record).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let records = storage.list_all().unwrap();
        assert_eq!(records.len(), 80);
        for record in &records {
            assert_eq!(record.question(16), Some(format!("{} answer 16", record.name).as_str()));
        }
    }

    #[test]
    fn test_arc_store_delegates() {
        let storage: Arc<dyn ResponseStore> = Arc::new(create_test_storage());
        storage.persist(&create_test_record("Ana")).unwrap();
        assert_eq!(storage.list_all().unwrap().len(), 1);
    }
}
