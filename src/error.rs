//! Unified error type for document rendering.

use sheetpress_write::{UnknownFormatError, WriteError};
use thiserror::Error;

/// The main error enum for all high-level operations in the wrapper layer.
#[derive(Error, Debug)]
pub enum SheetError {
    /// Output format string no writer recognizes (invalid argument).
    #[error(transparent)]
    UnknownFormat(#[from] UnknownFormatError),

    /// Deployment or environment misconfiguration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The disk caching directory could not be created.
    #[error("disk cache error: {0}")]
    Cache(String),

    /// A template property carried an unusable value.
    #[error("invalid property \"{key}\": {message}")]
    Property { key: String, message: String },

    /// Failure while loading a workbook template file.
    #[error("template read error: {0}")]
    Read(String),

    /// Failure surfaced by a format writer; propagated, not translated.
    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SheetError {
    pub(crate) fn property(key: &str, message: impl Into<String>) -> Self {
        SheetError::Property {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

impl From<calamine::Error> for SheetError {
    fn from(e: calamine::Error) -> Self {
        SheetError::Read(e.to_string())
    }
}
