//! Admin export of all stored responses.
//!
//! The export sits behind a password taken from configuration and checked
//! with plain string equality. It keeps casual respondents out of the data
//! and nothing more.

use std::io::Write;

use tracing::{info, warn};

use crate::config::AdminConfig;
use crate::error::{Error, Result};
use crate::record::{ResponseRecord, COLUMNS};
use crate::storage::ResponseStore;

/// File name offered for the exported table.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "all_survey_responses.csv";

/// Password check in front of the admin export.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AdminGate {
    password: Option<String>,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl AdminGate {
    /// Create a gate; `None` disables the export entirely.
    #[must_use]
    pub fn new(password: Option<String>) -> Self {
        Self { password }
    }

    /// Create a gate from the admin section of the configuration.
    #[must_use]
    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(config.password.clone())
    }

    /// Whether an admin password has been configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.password.is_some()
    }

    /// Check a supplied password.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AdminNotConfigured`] if no password is configured, or
    /// [`Error::AdminAccessDenied`] if `supplied` does not match.
    pub fn authorize(&self, supplied: &str) -> Result<()> {
        match &self.password {
            None => Err(Error::AdminNotConfigured),
            Some(expected) if expected == supplied => Ok(()),
            Some(_) => {
                warn!("Admin export refused: incorrect password");
                Err(Error::AdminAccessDenied)
            }
        }
    }
}

/// Write `records` as CSV with a header row. Returns the number of records.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn write_csv<W: Write>(records: &[ResponseRecord], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(COLUMNS)?;
    for record in records {
        csv_writer.write_record(record.to_row())?;
    }
    csv_writer.flush()?;
    Ok(records.len())
}

/// Write `records` as a pretty-printed JSON array. Returns the number of records.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn write_json<W: Write>(records: &[ResponseRecord], mut writer: W) -> Result<usize> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writeln!(writer)?;
    Ok(records.len())
}

/// Check the password, then read every response from `store`.
///
/// # Errors
///
/// Returns an admin gate error if the password is refused, or a storage
/// error if the store cannot be read.
pub fn fetch_all<S: ResponseStore + ?Sized>(
    store: &S,
    gate: &AdminGate,
    password: &str,
) -> Result<Vec<ResponseRecord>> {
    gate.authorize(password)?;
    let records = store.list_all()?;
    info!(count = records.len(), "Admin export of survey responses");
    Ok(records)
}

/// Check the password and export every stored response as CSV.
///
/// # Errors
///
/// Returns an admin gate error if the password is refused, or an error if
/// reading the store or writing the output fails.
pub fn export_csv<S, W>(store: &S, gate: &AdminGate, password: &str, writer: W) -> Result<usize>
where
    S: ResponseStore + ?Sized,
    W: Write,
{
    let records = fetch_all(store, gate, password)?;
    write_csv(&records, writer)
}
