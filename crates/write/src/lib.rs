//! Output writers for sheetpress workbooks.
//!
//! This crate is the format seam of the pipeline. It provides:
//!
//! - **`Format`**: the supported output formats, parsed case-insensitively
//! - **`BookWriter`**: the trait every format backend implements
//! - **`for_format`**: writer selection (the factory the wrapper calls)
//! - **`write_book`**: serialization entry point with optional disk spooling
//!
//! Encoding itself is delegated to format libraries where the ecosystem has
//! them: `rust_xlsxwriter` for XLSX, `csv` for CSV, `zip` for the ODS package,
//! `cfb` for the XLS compound file, and `lopdf` for PDF (feature `pdf`).

mod csv_writer;
pub mod error;
mod ods;
#[cfg(feature = "pdf")]
mod pdf;
mod xls;
mod xlsx;

pub use csv_writer::CsvWriter;
pub use error::{UnknownFormatError, WriteError};
pub use ods::OdsWriter;
#[cfg(feature = "pdf")]
pub use pdf::PdfWriter;
pub use xls::XlsWriter;
pub use xlsx::XlsxWriter;

use sheetpress_model::Book;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    Csv,
    Ods,
    Pdf,
    Xls,
    #[default]
    Xlsx,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::Csv,
        Format::Ods,
        Format::Pdf,
        Format::Xls,
        Format::Xlsx,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Ods => "ods",
            Format::Pdf => "pdf",
            Format::Xls => "xls",
            Format::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Format::Csv => "text/csv",
            Format::Ods => "application/vnd.oasis.opendocument.spreadsheet",
            Format::Pdf => "application/pdf",
            Format::Xls => "application/vnd.ms-excel",
            Format::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = UnknownFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "ods" => Ok(Format::Ods),
            "pdf" => Ok(Format::Pdf),
            "xls" => Ok(Format::Xls),
            "xlsx" => Ok(Format::Xlsx),
            _ => Err(UnknownFormatError(s.to_string())),
        }
    }
}

/// Per-render serialization options.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Prefer cached formula results over formula text in formats that cannot
    /// carry live formulas.
    pub pre_calculate_formulas: bool,
    /// When set, serialized output is spooled through a temporary file in this
    /// directory instead of being built up against the output channel directly.
    pub disk_cache_dir: Option<PathBuf>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            pre_calculate_formulas: true,
            disk_cache_dir: None,
        }
    }
}

/// A format backend that serializes a [`Book`] to an output stream.
pub trait BookWriter {
    /// The format this writer produces.
    fn format(&self) -> Format;

    /// Serialize `book` to `out` in one shot.
    fn write(
        &self,
        book: &Book,
        options: &WriterOptions,
        out: &mut dyn Write,
    ) -> Result<(), WriteError>;
}

/// Selects the writer for an output format.
///
/// Selecting [`Format::Pdf`] fails with [`WriteError::PdfRendererMissing`]
/// when the `pdf` feature is compiled out.
pub fn for_format(format: Format) -> Result<Box<dyn BookWriter>, WriteError> {
    match format {
        Format::Csv => Ok(Box::new(CsvWriter)),
        Format::Ods => Ok(Box::new(OdsWriter)),
        Format::Xls => Ok(Box::new(XlsWriter)),
        Format::Xlsx => Ok(Box::new(XlsxWriter)),
        #[cfg(feature = "pdf")]
        Format::Pdf => Ok(Box::new(PdfWriter)),
        #[cfg(not(feature = "pdf"))]
        Format::Pdf => Err(WriteError::PdfRendererMissing),
    }
}

/// Runs a writer against an output stream.
///
/// With `disk_cache_dir` set, the writer serializes into an anonymous
/// temporary file inside that directory, and the bytes are then copied to
/// `out`. The directory must already exist.
pub fn write_book(
    writer: &dyn BookWriter,
    book: &Book,
    options: &WriterOptions,
    out: &mut dyn Write,
) -> Result<(), WriteError> {
    log::debug!(
        "serializing workbook ({} sheets) as {}",
        book.sheet_count(),
        writer.format()
    );

    match &options.disk_cache_dir {
        Some(dir) => {
            let mut spool = tempfile::tempfile_in(dir)
                .map_err(|e| WriteError::Cache(format!("{}: {e}", dir.display())))?;
            writer.write(book, options, &mut spool)?;
            use std::io::Seek;
            spool.seek(io::SeekFrom::Start(0))?;
            io::copy(&mut spool, out)?;
            Ok(())
        }
        None => writer.write(book, options, out),
    }
}
