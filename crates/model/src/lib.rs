//! In-memory workbook model for the sheetpress pipeline.
//!
//! This crate holds the document state that the lifecycle wrapper builds up and
//! the format writers consume:
//!
//! - **`Book`**: the workbook — metadata, security flags, default style, sheets
//! - **`Sheet`** / **`Cell`** / **`CellValue`**: sparse cell storage
//! - **`Metadata`** / **`Security`** / **`Style`**: document-level properties
//!
//! The model is deliberately small. It carries exactly what the property
//! mappings can set and what the writers can serialize; evaluation, rich
//! styling, and format-specific features live behind the writer seam.

mod book;
mod cell;
mod metadata;
mod sheet;
mod style;

pub use book::Book;
pub use cell::{Cell, CellValue};
pub use metadata::{Metadata, Security};
pub use sheet::Sheet;
pub use style::Style;
