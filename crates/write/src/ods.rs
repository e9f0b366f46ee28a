//! ODS output: an ODF package assembled with the `zip` crate.
//!
//! The package layout follows ODF 1.3: a `mimetype` entry stored first and
//! uncompressed, a manifest, and content/styles/meta parts.

use crate::{BookWriter, Format, WriteError, WriterOptions};
use sheetpress_model::{Book, CellValue, Metadata, Sheet};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const MIMETYPE: &str = "application/vnd.oasis.opendocument.spreadsheet";
const GENERATOR: &str = concat!("sheetpress/", env!("CARGO_PKG_VERSION"));

pub struct OdsWriter;

impl BookWriter for OdsWriter {
    fn format(&self) -> Format {
        Format::Ods
    }

    fn write(
        &self,
        book: &Book,
        options: &WriterOptions,
        out: &mut dyn Write,
    ) -> Result<(), WriteError> {
        // ZipWriter needs Seek, so the package is assembled in memory.
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file("mimetype", stored)?;
        zip.write_all(MIMETYPE.as_bytes())?;

        zip.start_file("META-INF/manifest.xml", deflated)?;
        zip.write_all(manifest_xml().as_bytes())?;

        zip.start_file("content.xml", deflated)?;
        zip.write_all(content_xml(book, options.pre_calculate_formulas).as_bytes())?;

        zip.start_file("styles.xml", deflated)?;
        zip.write_all(styles_xml().as_bytes())?;

        zip.start_file("meta.xml", deflated)?;
        zip.write_all(meta_xml(book.metadata()).as_bytes())?;

        let cursor = zip.finish()?;
        out.write_all(&cursor.into_inner())?;
        Ok(())
    }
}

fn manifest_xml() -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.3">
"#,
    );
    for (path, media_type) in [
        ("/", MIMETYPE),
        ("content.xml", "text/xml"),
        ("styles.xml", "text/xml"),
        ("meta.xml", "text/xml"),
    ] {
        xml.push_str(&format!(
            "  <manifest:file-entry manifest:full-path=\"{path}\" manifest:media-type=\"{media_type}\"/>\n"
        ));
    }
    xml.push_str("</manifest:manifest>\n");
    xml
}

fn content_xml(book: &Book, pre_calculated: bool) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:of="urn:oasis:names:tc:opendocument:xmlns:of:1.2" office:version="1.3"><office:font-face-decls/><office:automatic-styles/><office:body><office:spreadsheet>"#,
    );
    for sheet in book.sheets() {
        push_table(&mut xml, sheet, pre_calculated);
    }
    xml.push_str("</office:spreadsheet></office:body></office:document-content>");
    xml
}

fn push_table(xml: &mut String, sheet: &Sheet, pre_calculated: bool) {
    let (rows, cols) = sheet.dimensions();
    xml.push_str(&format!(
        r#"<table:table table:name="{}">"#,
        escape_xml(sheet.name())
    ));
    if cols > 0 {
        xml.push_str(&format!(
            r#"<table:table-column table:number-columns-repeated="{cols}"/>"#
        ));
    }

    for row in 0..rows {
        xml.push_str("<table:table-row>");
        for col in 0..cols {
            match sheet.value(row, col) {
                Some(value) if !value.is_empty() => push_cell(xml, value, pre_calculated),
                _ => xml.push_str("<table:table-cell/>"),
            }
        }
        xml.push_str("</table:table-row>");
    }
    xml.push_str("</table:table>");
}

fn push_cell(xml: &mut String, value: &CellValue, pre_calculated: bool) {
    match value {
        CellValue::Empty => xml.push_str("<table:table-cell/>"),
        CellValue::Text(s) => xml.push_str(&format!(
            r#"<table:table-cell office:value-type="string"><text:p>{}</text:p></table:table-cell>"#,
            escape_xml(s)
        )),
        CellValue::Number(n) => xml.push_str(&format!(
            r#"<table:table-cell office:value-type="float" office:value="{n}"><text:p>{}</text:p></table:table-cell>"#,
            escape_xml(&value.display(pre_calculated))
        )),
        CellValue::Bool(b) => xml.push_str(&format!(
            r#"<table:table-cell office:value-type="boolean" office:boolean-value="{b}"><text:p>{}</text:p></table:table-cell>"#,
            escape_xml(&value.display(pre_calculated))
        )),
        CellValue::Formula { expr, cached } => {
            let formula = escape_xml(&format!("of:{expr}"));
            match cached {
                Some(v) if pre_calculated => xml.push_str(&format!(
                    r#"<table:table-cell table:formula="{formula}" office:value-type="float" office:value="{v}"><text:p>{}</text:p></table:table-cell>"#,
                    escape_xml(&value.display(true))
                )),
                _ => xml.push_str(&format!(
                    r#"<table:table-cell table:formula="{formula}"><text:p>{}</text:p></table:table-cell>"#,
                    escape_xml(expr)
                )),
            }
        }
    }
}

fn styles_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8"?><office:document-styles xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" office:version="1.3"><office:styles/><office:automatic-styles/><office:master-styles/></office:document-styles>"#
        .to_string()
}

fn meta_xml(metadata: &Metadata) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><office:document-meta xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:xlink="http://www.w3.org/1999/xlink" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:meta="urn:oasis:names:tc:opendocument:xmlns:meta:1.0" office:version="1.3"><office:meta><meta:generator>{GENERATOR}</meta:generator><meta:creation-date>{}</meta:creation-date><dc:date>{}</dc:date>"#,
        metadata.created.to_rfc3339(),
        metadata.modified.to_rfc3339(),
    );

    if let Some(title) = &metadata.title {
        xml.push_str(&format!("<dc:title>{}</dc:title>", escape_xml(title)));
    }
    if let Some(description) = &metadata.description {
        xml.push_str(&format!(
            "<dc:description>{}</dc:description>",
            escape_xml(description)
        ));
    }
    if let Some(subject) = &metadata.subject {
        xml.push_str(&format!("<dc:subject>{}</dc:subject>", escape_xml(subject)));
    }
    if let Some(creator) = &metadata.creator {
        xml.push_str(&format!("<dc:creator>{}</dc:creator>", escape_xml(creator)));
    }
    if let Some(keywords) = &metadata.keywords {
        xml.push_str(&format!(
            "<meta:keyword>{}</meta:keyword>",
            escape_xml(keywords)
        ));
    }

    xml.push_str("</office:meta></office:document-meta>");
    xml
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
