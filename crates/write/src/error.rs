//! Error types for writer selection and serialization.

use thiserror::Error;

/// An output format string that no writer recognizes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown format \"{0}\"")]
pub struct UnknownFormatError(pub String);

/// Errors surfaced while selecting a writer or serializing a workbook.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error(transparent)]
    UnknownFormat(#[from] UnknownFormatError),

    /// PDF output was requested but the `pdf` feature was compiled out.
    #[error("PDF renderer unavailable: rebuild with the `pdf` feature enabled")]
    PdfRendererMissing,

    #[error("disk cache error: {0}")]
    Cache(String),

    #[error("XLSX serialization error: {0}")]
    Xlsx(String),

    #[error("ODS package error: {0}")]
    Ods(String),

    #[error("XLS container error: {0}")]
    Xls(String),

    #[error("PDF serialization error: {0}")]
    Pdf(String),

    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rust_xlsxwriter::XlsxError> for WriteError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        WriteError::Xlsx(e.to_string())
    }
}

impl From<zip::result::ZipError> for WriteError {
    fn from(e: zip::result::ZipError) -> Self {
        WriteError::Ods(e.to_string())
    }
}

#[cfg(feature = "pdf")]
impl From<lopdf::Error> for WriteError {
    fn from(e: lopdf::Error) -> Self {
        WriteError::Pdf(e.to_string())
    }
}
