//! `insights-survey` - A multi-page survey wizard with durable response storage
//!
//! The library holds the survey's page-flow state machine ([`Session`]), the
//! [`ResponseStore`] contract with its `SQLite` implementation, and the
//! password-gated admin export. The `insights` binary puts a terminal front
//! end on top.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod record;
pub mod storage;
pub mod survey;
pub mod terminal;

pub use config::Config;
pub use error::{Error, Result};
pub use export::AdminGate;
pub use logging::init_logging;
pub use record::ResponseRecord;
pub use storage::{CsvMirror, MirroredStore, ResponseStore, Storage, StorageStats};
pub use survey::{AnswerKey, AnswerValue, Answers, Event, Page, Session};
