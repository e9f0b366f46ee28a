//! Declarative spreadsheet document rendering.
//!
//! `sheetpress` lets a template layer build spreadsheet documents and stream
//! them in any supported format (xlsx, xls, ods, csv, pdf). A render is
//! driven through a [`DocumentWrapper`]: `start` seeds a workbook from a
//! properties bag (optionally from an existing template file resolved
//! through namespaced paths), the caller fills sheets, and `end` selects a
//! writer for the requested format and serializes the result.
//!
//! ```no_run
//! use serde_json::json;
//! use sheetpress::{Attributes, DocumentWrapper, RenderContext, TemplateLoader};
//!
//! # fn main() -> Result<(), sheetpress::SheetError> {
//! let mut wrapper = DocumentWrapper::new(
//!     RenderContext::new().with_request_format("csv"),
//!     TemplateLoader::new(),
//!     Attributes::default(),
//! );
//!
//! wrapper.start(json!({"title": "Report"}).as_object().unwrap())?;
//! if let Some(book) = wrapper.book_mut() {
//!     let sheet = book.add_sheet("Totals");
//!     sheet.set_value(0, 0, "region");
//!     sheet.set_value(0, 1, 42.0);
//! }
//!
//! let mut out = Vec::new();
//! wrapper.end(&mut out)?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod error;
pub mod loader;
pub mod reader;
pub mod wrapper;

pub use context::RenderContext;
pub use error::SheetError;
pub use loader::TemplateLoader;
pub use reader::load_book;
pub use wrapper::{Attributes, DocumentWrapper};

pub use sheetpress_model::{Book, Cell, CellValue, Metadata, Security, Sheet, Style};
pub use sheetpress_write::{
    for_format, write_book, BookWriter, Format, UnknownFormatError, WriteError, WriterOptions,
};
