//! Workbook template loading via `calamine`.
//!
//! An existing workbook file (xlsx, xlsb, xls, or ods — calamine infers the
//! format) is imported into a [`Book`] so the template layer can build on top
//! of it. Only cell values and formula text survive the import; styling and
//! other format features are out of scope for template seeds.

use crate::error::SheetError;
use calamine::{Data, Reader};
use sheetpress_model::{Book, CellValue};
use std::path::Path;

/// Loads a workbook template from disk.
pub fn load_book(path: &Path) -> Result<Book, SheetError> {
    let mut workbook = calamine::open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names().to_owned();
    log::debug!(
        "loading template {} ({} sheets)",
        path.display(),
        sheet_names.len()
    );

    let mut book = Book::new();
    for sheet_name in sheet_names {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| SheetError::Read(format!("sheet \"{sheet_name}\": {e}")))?;

        let sheet = book.add_sheet(&sheet_name);
        let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
        for (row, col, data) in range.cells() {
            let value = match data {
                Data::Empty => continue,
                Data::String(s) => CellValue::Text(s.clone()),
                Data::Float(f) => CellValue::Number(*f),
                Data::Int(i) => CellValue::Number(*i as f64),
                Data::Bool(b) => CellValue::Bool(*b),
                Data::Error(e) => CellValue::Text(format!("{e:?}")),
                other => CellValue::Text(other.to_string()),
            };
            sheet.set_value(row_offset + row as u32, col_offset + col as u32, value);
        }

        // Formula ranges are absent for some formats; treat them as optional.
        if let Ok(formulas) = workbook.worksheet_formula(&sheet_name) {
            let (row_offset, col_offset) = formulas.start().unwrap_or((0, 0));
            for (row, col, formula) in formulas.cells() {
                if formula.trim().is_empty() {
                    continue;
                }
                let row = row_offset + row as u32;
                let col = col_offset + col as u32;

                // Keep the imported value as the cached result.
                let cached = match sheet.value(row, col) {
                    Some(CellValue::Number(n)) => Some(*n),
                    _ => None,
                };
                sheet.set_value(row, col, CellValue::Formula {
                    expr: if formula.starts_with('=') {
                        formula.clone()
                    } else {
                        format!("={formula}")
                    },
                    cached,
                });
            }
        }
    }

    book.set_active_sheet(0);
    Ok(book)
}
