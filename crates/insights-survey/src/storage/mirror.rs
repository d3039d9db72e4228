//! Best-effort CSV copies of saved responses.
//!
//! The mirror is not a source of truth. Each response is written to its own
//! `survey_response_<timestamp>_<id>.csv` file and appended to a master
//! `all_survey_responses.csv`; failures are logged and otherwise ignored.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::ResponseStore;
use crate::error::{Error, Result};
use crate::record::{ResponseRecord, COLUMNS};

/// Name of the file every mirrored response is appended to.
pub const MASTER_FILE_NAME: &str = "all_survey_responses.csv";

/// Writes saved responses to CSV files in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvMirror {
    directory: PathBuf,
}

impl CsvMirror {
    /// Create a mirror writing into `directory`, created on first write.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// The directory mirrored files are written to.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the master file.
    #[must_use]
    pub fn master_path(&self) -> PathBuf {
        self.directory.join(MASTER_FILE_NAME)
    }

    /// Path of the single-response file for `record`.
    #[must_use]
    pub fn record_path(&self, record: &ResponseRecord) -> PathBuf {
        let stamp = record.submitted_at.format("%Y-%m-%d_%H-%M-%S");
        let id = record.id.unwrap_or_default();
        self.directory
            .join(format!("survey_response_{stamp}_{id}.csv"))
    }

    /// Write `record` to its own file and append it to the master file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or either file cannot be written.
    pub fn write(&self, record: &ResponseRecord) -> Result<()> {
        std::fs::create_dir_all(&self.directory).map_err(|source| Error::DirectoryCreate {
            path: self.directory.clone(),
            source,
        })?;

        let header = encode_row(&COLUMNS)?;
        let row = encode_row(&record.to_row())?;

        let single = self.record_path(record);
        let mut contents = header.clone();
        contents.extend_from_slice(&row);
        std::fs::write(&single, contents)?;

        // Only the writer that creates the master file adds the header. A row
        // from a concurrent writer may still land ahead of it; the mirror is
        // best-effort and the database stays authoritative.
        let (mut master, fresh) = match OpenOptions::new()
            .append(true)
            .create_new(true)
            .open(self.master_path())
        {
            Ok(file) => (file, true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                (OpenOptions::new().append(true).open(self.master_path())?, false)
            }
            Err(e) => return Err(e.into()),
        };
        let mut chunk = Vec::with_capacity(header.len() + row.len());
        if fresh {
            chunk.extend_from_slice(&header);
        }
        chunk.extend_from_slice(&row);
        master.write_all(&chunk)?;

        debug!("Mirrored response to {}", single.display());
        Ok(())
    }
}

fn encode_row<I, T>(fields: I) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(fields)?;
    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

/// A response store that copies every saved response to a [`CsvMirror`].
///
/// The mirror runs only after the primary store succeeded, and its failures
/// never fail [`ResponseStore::persist`].
#[derive(Debug)]
pub struct MirroredStore<S> {
    primary: S,
    mirror: Option<CsvMirror>,
}

impl<S: ResponseStore> MirroredStore<S> {
    /// Wrap `primary`, optionally mirroring to `mirror`.
    #[must_use]
    pub fn new(primary: S, mirror: Option<CsvMirror>) -> Self {
        Self { primary, mirror }
    }

    /// The primary store.
    #[must_use]
    pub fn primary(&self) -> &S {
        &self.primary
    }

    /// The mirror, if enabled.
    #[must_use]
    pub fn mirror(&self) -> Option<&CsvMirror> {
        self.mirror.as_ref()
    }
}

impl<S: ResponseStore> ResponseStore for MirroredStore<S> {
    fn persist(&self, record: &ResponseRecord) -> Result<i64> {
        let id = self.primary.persist(record)?;

        if let Some(mirror) = &self.mirror {
            let mut saved = record.clone();
            saved.id = Some(id);
            if let Err(err) = mirror.write(&saved) {
                warn!(
                    id,
                    error = %err,
                    "Failed to mirror response to {}",
                    mirror.directory().display()
                );
            }
        }

        Ok(id)
    }

    fn list_all(&self) -> Result<Vec<ResponseRecord>> {
        self.primary.list_all()
    }
}
