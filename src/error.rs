//! Error types for the journal library.

use crate::entry::EntryId;
use std::fmt;
use thiserror::Error;

/// Reasons a stored journal could not be read.
///
/// Never returned to callers of [`crate::store::EntryStore::load`], which
/// degrades to an empty journal; kept as a type so the cause can be logged.
#[derive(Error, Debug)]
pub enum StorageReadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored journal is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Stored journal is not a list of entries")]
    NotAList,
}

/// Persisting the journal failed; the previously stored journal is untouched.
#[derive(Error, Debug)]
pub enum StorageWriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Storage rejected the write: {0}")]
    Rejected(String),
}

/// A single invalid form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        FieldError {
            field,
            message: message.into(),
        }
    }
}

/// Fields of an entry that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Date,
    Mood,
    Content,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Title => "title",
            Field::Date => "date",
            Field::Mood => "mood",
            Field::Content => "content",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Entry is missing required fields: {}", describe(.0))]
    MissingFields(Vec<FieldError>),

    #[error("Entry has no id")]
    EmptyId,

    #[error("An entry with id {0} already exists")]
    DuplicateId(EntryId),
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.field.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Weather lookup failures. None of these block creating an entry.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("City name is required")]
    EmptyCity,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Weather service answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("No matching location found for {0:?}")]
    NoMatch(String),

    #[error("No current weather data available")]
    NoCurrentWeather,

    #[error("Failed to decode weather payload: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not find a data directory; pass --data-dir or set JOURNAL_DATA_DIR")]
    NoDataDir,
}
