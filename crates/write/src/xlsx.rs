//! XLSX output via `rust_xlsxwriter`.

use crate::{BookWriter, Format, WriteError, WriterOptions};
use rust_xlsxwriter::{DocProperties, Format as XlsxFormat, Formula, Workbook};
use sheetpress_model::{Book, CellValue, Style};
use std::io::Write;

pub struct XlsxWriter;

impl BookWriter for XlsxWriter {
    fn format(&self) -> Format {
        Format::Xlsx
    }

    fn write(
        &self,
        book: &Book,
        options: &WriterOptions,
        out: &mut dyn Write,
    ) -> Result<(), WriteError> {
        let mut workbook = Workbook::new();
        workbook.set_properties(&doc_properties(book));

        let default_format = cell_format(book.default_style());

        for sheet in book.sheets() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(sheet.name())?;

            // Workbook-level protection maps onto per-sheet protection here;
            // rust_xlsxwriter exposes no workbook.xml protection element.
            if book.security().any_protection() {
                match book.security().workbook_password.as_deref() {
                    Some(password) => worksheet.protect_with_password(password),
                    None => worksheet.protect(),
                };
            }

            for (row, col, cell) in sheet.cells() {
                let col = u16::try_from(col).map_err(|_| {
                    WriteError::Xlsx(format!("column {col} out of XLSX range"))
                })?;

                match (&cell.value, &default_format) {
                    (CellValue::Empty, _) => {}
                    (CellValue::Text(s), None) => {
                        worksheet.write_string(row, col, s)?;
                    }
                    (CellValue::Text(s), Some(f)) => {
                        worksheet.write_string_with_format(row, col, s, f)?;
                    }
                    (CellValue::Number(n), None) => {
                        worksheet.write_number(row, col, *n)?;
                    }
                    (CellValue::Number(n), Some(f)) => {
                        worksheet.write_number_with_format(row, col, *n, f)?;
                    }
                    (CellValue::Bool(b), None) => {
                        worksheet.write_boolean(row, col, *b)?;
                    }
                    (CellValue::Bool(b), Some(f)) => {
                        worksheet.write_boolean_with_format(row, col, *b, f)?;
                    }
                    (CellValue::Formula { expr, cached }, default) => {
                        let mut formula = Formula::new(expr.as_str());
                        if options.pre_calculate_formulas
                            && let Some(v) = cached
                        {
                            formula = formula.set_result(v.to_string());
                        }
                        match default {
                            Some(f) => {
                                worksheet.write_formula_with_format(row, col, formula, f)?
                            }
                            None => worksheet.write_formula(row, col, formula)?,
                        };
                    }
                }
            }
        }

        let buffer = workbook.save_to_buffer()?;
        out.write_all(&buffer)?;
        Ok(())
    }
}

fn doc_properties(book: &Book) -> DocProperties {
    let meta = book.metadata();
    let mut properties = DocProperties::new();

    if let Some(creator) = &meta.creator {
        properties = properties.set_author(creator);
    }
    if let Some(title) = &meta.title {
        properties = properties.set_title(title);
    }
    if let Some(subject) = &meta.subject {
        properties = properties.set_subject(subject);
    }
    if let Some(description) = &meta.description {
        properties = properties.set_comment(description);
    }
    if let Some(keywords) = &meta.keywords {
        properties = properties.set_keywords(keywords);
    }
    if let Some(category) = &meta.category {
        properties = properties.set_category(category);
    }
    if let Some(company) = &meta.company {
        properties = properties.set_company(company);
    }
    if let Some(manager) = &meta.manager {
        properties = properties.set_manager(manager);
    }

    properties
}

fn cell_format(style: &Style) -> Option<XlsxFormat> {
    if style.is_default() {
        return None;
    }

    let mut format = XlsxFormat::new();
    if let Some(name) = &style.font_name {
        format = format.set_font_name(name);
    }
    if let Some(size) = style.font_size {
        format = format.set_font_size(size);
    }
    if style.bold {
        format = format.set_bold();
    }
    if style.italic {
        format = format.set_italic();
    }
    Some(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx};
    use std::io::Cursor;

    fn write_to_bytes(book: &Book) -> Vec<u8> {
        let mut out = Vec::new();
        XlsxWriter
            .write(book, &WriterOptions::default(), &mut out)
            .unwrap();
        out
    }

    #[test]
    fn test_xlsx_round_trips_through_calamine() {
        let mut book = Book::new();
        let sheet = book.add_sheet("Report");
        sheet.set_value(0, 0, "total");
        sheet.set_value(0, 1, 99.5);
        sheet.set_value(1, 1, true);

        let bytes = write_to_bytes(&book);
        let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Report".to_string()]);

        let range = workbook.worksheet_range("Report").unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("total".into())));
        assert_eq!(range.get_value((0, 1)), Some(&Data::Float(99.5)));
        assert_eq!(range.get_value((1, 1)), Some(&Data::Bool(true)));
    }

    #[test]
    fn test_xlsx_multiple_sheets() {
        let mut book = Book::new();
        book.add_sheet("One").set_value(0, 0, 1.0);
        book.add_sheet("Two").set_value(0, 0, 2.0);

        let bytes = write_to_bytes(&book);
        let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(
            workbook.sheet_names(),
            vec!["One".to_string(), "Two".to_string()]
        );
    }

    #[test]
    fn test_xlsx_formula_with_cached_result() {
        let mut book = Book::new();
        let sheet = book.add_sheet("Calc");
        sheet.set_value(0, 0, 1.0);
        sheet.set_value(1, 0, 2.0);
        sheet.set_cell(
            2,
            0,
            CellValue::Formula {
                expr: "=SUM(A1:A2)".to_string(),
                cached: Some(3.0),
            }
            .into(),
        );

        let bytes = write_to_bytes(&book);
        let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        let formulas = workbook.worksheet_formula("Calc").unwrap();
        assert_eq!(formulas.get_value((2, 0)), Some(&"SUM(A1:A2)".to_string()));
    }

    #[test]
    fn test_xlsx_empty_book_still_serializes() {
        // rust_xlsxwriter adds a blank sheet to workbooks with none, so the
        // output is a valid file either way.
        let book = Book::new();
        let bytes = write_to_bytes(&book);
        assert!(!bytes.is_empty());
        // XLSX is a ZIP container; check the local-file-header signature.
        assert_eq!(&bytes[0..2], b"PK");
    }
}
