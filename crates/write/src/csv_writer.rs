//! CSV output via the `csv` crate.
//!
//! CSV is a single-table format, so only the active sheet is serialized.

use crate::{BookWriter, Format, WriteError, WriterOptions};
use sheetpress_model::{Book, Sheet};
use std::io::Write;

pub struct CsvWriter;

impl BookWriter for CsvWriter {
    fn format(&self) -> Format {
        Format::Csv
    }

    fn write(
        &self,
        book: &Book,
        options: &WriterOptions,
        out: &mut dyn Write,
    ) -> Result<(), WriteError> {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(out);

        if let Some(sheet) = book.active_sheet() {
            for record in records(sheet, options.pre_calculate_formulas) {
                writer.write_record(&record)?;
            }
        } else {
            log::debug!("workbook has no active sheet, emitting empty CSV");
        }

        writer.flush()?;
        Ok(())
    }
}

/// Expands the sparse grid into dense rows of display strings.
///
/// Trailing empty rows are not emitted; gaps inside the populated area are.
fn records(sheet: &Sheet, pre_calculated: bool) -> Vec<Vec<String>> {
    let (rows, cols) = sheet.dimensions();
    let mut records = vec![vec![String::new(); cols as usize]; rows as usize];

    for (row, col, cell) in sheet.cells() {
        records[row as usize][col as usize] = cell.value.display(pre_calculated);
    }

    records
}
