//! PDF output via `lopdf`.
//!
//! A plain tabular rendering: each sheet becomes a run of A4 pages with the
//! sheet name as a heading and one text line per row. This is intentionally
//! not a layout engine; it exists so spreadsheet renders can be previewed and
//! archived as PDF.

use crate::{BookWriter, Format, WriteError, WriterOptions};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use sheetpress_model::{Book, Sheet};
use std::io::Write;

const PAGE_WIDTH: f32 = 595.0; // A4 portrait, points
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const FONT_SIZE: f32 = 10.0;
const HEADING_SIZE: f32 = 14.0;
const LINE_HEIGHT: f32 = 14.0;

pub struct PdfWriter;

impl BookWriter for PdfWriter {
    fn format(&self) -> Format {
        Format::Pdf
    }

    fn write(
        &self,
        book: &Book,
        options: &WriterOptions,
        out: &mut dyn Write,
    ) -> Result<(), WriteError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut page_ids = Vec::new();
        for sheet in book.sheets() {
            for page in paginate(sheet, options.pre_calculate_formulas) {
                let content = page_content(&page)?;
                let content_id = doc.add_object(Stream::new(dictionary! {}, content));
                let page_id = doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                });
                page_ids.push(page_id);
            }
        }

        // A document with no sheets still gets one empty page so the PDF is
        // structurally valid.
        if page_ids.is_empty() {
            let content = page_content(&PageText::default())?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            page_ids.push(page_id);
        }

        let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
        let page_count = page_ids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let info_id = doc.add_object(Object::Dictionary(info_dictionary(book)));
        doc.trailer.set("Info", info_id);

        let mut out = out;
        doc.save_to(&mut out)?;
        Ok(())
    }
}

/// Text content of one rendered page: an optional heading plus row lines.
#[derive(Default)]
struct PageText {
    heading: Option<String>,
    lines: Vec<String>,
}

fn paginate(sheet: &Sheet, pre_calculated: bool) -> Vec<PageText> {
    let usable = PAGE_HEIGHT - 2.0 * MARGIN - 2.0 * LINE_HEIGHT; // heading + gap
    let rows_per_page = (usable / LINE_HEIGHT).max(1.0) as usize;

    let (rows, cols) = sheet.dimensions();
    let mut lines = Vec::with_capacity(rows as usize);
    for row in 0..rows {
        let fields: Vec<String> = (0..cols)
            .map(|col| {
                sheet
                    .value(row, col)
                    .map(|v| v.display(pre_calculated))
                    .unwrap_or_default()
            })
            .collect();
        lines.push(fields.join("  "));
    }

    if lines.is_empty() {
        return vec![PageText {
            heading: Some(sheet.name().to_string()),
            lines: Vec::new(),
        }];
    }

    lines
        .chunks(rows_per_page)
        .enumerate()
        .map(|(i, chunk)| PageText {
            heading: (i == 0).then(|| sheet.name().to_string()),
            lines: chunk.to_vec(),
        })
        .collect()
}

fn page_content(page: &PageText) -> Result<Vec<u8>, WriteError> {
    let mut operations = vec![Operation::new("BT", vec![])];
    let mut cursor_y = PAGE_HEIGHT - MARGIN;

    if let Some(heading) = &page.heading {
        operations.push(Operation::new(
            "Tf",
            vec!["F1".into(), HEADING_SIZE.into()],
        ));
        operations.push(Operation::new(
            "Td",
            vec![MARGIN.into(), cursor_y.into()],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(win_ansi(heading))],
        ));
        cursor_y -= 2.0 * LINE_HEIGHT;
    }

    operations.push(Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]));
    for line in &page.lines {
        // Absolute positioning per line keeps the operation stream simple.
        operations.push(Operation::new("ET", vec![]));
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]));
        operations.push(Operation::new(
            "Td",
            vec![MARGIN.into(), cursor_y.into()],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(win_ansi(line))],
        ));
        cursor_y -= LINE_HEIGHT;
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    content
        .encode()
        .map_err(|e| WriteError::Pdf(e.to_string()))
}

fn info_dictionary(book: &Book) -> lopdf::Dictionary {
    let meta = book.metadata();
    let mut info = dictionary! {
        "Producer" => Object::string_literal(concat!("sheetpress/", env!("CARGO_PKG_VERSION"))),
    };
    if let Some(title) = &meta.title {
        info.set("Title", Object::string_literal(win_ansi(title)));
    }
    if let Some(creator) = &meta.creator {
        info.set("Author", Object::string_literal(win_ansi(creator)));
    }
    if let Some(subject) = &meta.subject {
        info.set("Subject", Object::string_literal(win_ansi(subject)));
    }
    if let Some(keywords) = &meta.keywords {
        info.set("Keywords", Object::string_literal(win_ansi(keywords)));
    }
    info
}

/// Best-effort Latin-1 projection for the WinAnsi-encoded base font.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if (0x20..=0xFF).contains(&code) {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}
