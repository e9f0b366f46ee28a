//! XLS output: a minimal BIFF8 workbook stream inside a CFB compound file.
//!
//! Just enough BIFF8 to carry values, booleans, shared strings, and workbook
//! protection. Formula cells are written as their cached value (or formula
//! text) since this writer has no token compiler. Layout per substream:
//!
//! - globals: BOF, CODEPAGE, DATEMODE, protection, WINDOW1, FONT, XF table,
//!   BOUNDSHEET per sheet (offsets patched after layout), SST, EOF
//! - per sheet: BOF, DIMENSIONS, WINDOW2, cell records, EOF

use crate::{BookWriter, Format, WriteError, WriterOptions};
use sheetpress_model::{Book, CellValue, Sheet};
use std::collections::HashMap;
use std::io::{Cursor, Write};

const RECORD_BOF: u16 = 0x0809;
const RECORD_EOF: u16 = 0x000A;
const RECORD_CODEPAGE: u16 = 0x0042;
const RECORD_DATEMODE: u16 = 0x0022;
const RECORD_PROTECT: u16 = 0x0012;
const RECORD_PASSWORD: u16 = 0x0013;
const RECORD_WINDOWPROTECT: u16 = 0x0019;
const RECORD_WINDOW1: u16 = 0x003D;
const RECORD_FONT: u16 = 0x0031;
const RECORD_XF: u16 = 0x00E0;
const RECORD_BOUNDSHEET: u16 = 0x0085;
const RECORD_SST: u16 = 0x00FC;
const RECORD_WINDOW2: u16 = 0x023E;
const RECORD_DIMENSIONS: u16 = 0x0200;
const RECORD_NUMBER: u16 = 0x0203;
const RECORD_LABELSST: u16 = 0x00FD;
const RECORD_BOOLERR: u16 = 0x0205;

const BOF_VERSION_BIFF8: u16 = 0x0600;
const BOF_DT_WORKBOOK_GLOBALS: u16 = 0x0005;
const BOF_DT_WORKSHEET: u16 = 0x0010;

const XF_FLAG_LOCKED: u16 = 0x0001;
const XF_FLAG_STYLE: u16 = 0x0004;
const COLOR_AUTOMATIC: u16 = 0x7FFF;

// The XF table carries the 16 style XFs many readers expect, then one cell XF.
const CELL_XF: u16 = 16;

// BIFF8 caps record payloads at 8224 bytes. This writer does not emit
// CONTINUE records, so anything that would overflow a single record is an
// error rather than a corrupt file.
const MAX_RECORD_DATA: usize = 8224;

pub struct XlsWriter;

impl BookWriter for XlsWriter {
    fn format(&self) -> Format {
        Format::Xls
    }

    fn write(
        &self,
        book: &Book,
        options: &WriterOptions,
        out: &mut dyn Write,
    ) -> Result<(), WriteError> {
        let stream = workbook_stream(book, options)?;

        let cursor = Cursor::new(Vec::new());
        let mut compound = cfb::CompoundFile::create(cursor)
            .map_err(|e| WriteError::Xls(e.to_string()))?;
        {
            let mut workbook = compound
                .create_stream("Workbook")
                .map_err(|e| WriteError::Xls(e.to_string()))?;
            workbook.write_all(&stream)?;
        }

        out.write_all(&compound.into_inner().into_inner())?;
        Ok(())
    }
}

fn workbook_stream(book: &Book, options: &WriterOptions) -> Result<Vec<u8>, WriteError> {
    let strings = SharedStrings::collect(book, options.pre_calculate_formulas);

    let mut globals = Vec::<u8>::new();
    push_record(&mut globals, RECORD_BOF, &bof(BOF_DT_WORKBOOK_GLOBALS))?;
    push_record(&mut globals, RECORD_CODEPAGE, &1200u16.to_le_bytes())?;
    push_record(&mut globals, RECORD_DATEMODE, &0u16.to_le_bytes())?;

    let security = book.security();
    if security.lock_windows {
        push_record(&mut globals, RECORD_WINDOWPROTECT, &1u16.to_le_bytes())?;
    }
    if security.any_protection() {
        push_record(&mut globals, RECORD_PROTECT, &1u16.to_le_bytes())?;
    }
    if let Some(password) = &security.workbook_password {
        push_record(
            &mut globals,
            RECORD_PASSWORD,
            &password_hash(password).to_le_bytes(),
        )?;
    }

    push_record(&mut globals, RECORD_WINDOW1, &window1())?;
    push_record(&mut globals, RECORD_FONT, &font(book))?;

    for _ in 0..16 {
        push_record(&mut globals, RECORD_XF, &xf_record(true))?;
    }
    push_record(&mut globals, RECORD_XF, &xf_record(false))?;

    // BOUNDSHEET substream offsets are not known until the globals substream
    // is complete; remember where each placeholder lives and patch below.
    let mut offset_positions = Vec::with_capacity(book.sheet_count());
    for sheet in book.sheets() {
        let record_start = globals.len();
        let mut payload = Vec::<u8>::new();
        payload.extend_from_slice(&0u32.to_le_bytes()); // lbPlyPos placeholder
        payload.extend_from_slice(&0u16.to_le_bytes()); // visible worksheet
        write_short_unicode_string(&mut payload, sheet.name())?;
        push_record(&mut globals, RECORD_BOUNDSHEET, &payload)?;
        offset_positions.push(record_start + 4);
    }

    push_record(&mut globals, RECORD_SST, &strings.sst_payload()?)?;
    push_record(&mut globals, RECORD_EOF, &[])?;

    for (sheet, offset_position) in book.sheets().iter().zip(offset_positions) {
        let offset = globals.len() as u32;
        globals[offset_position..offset_position + 4].copy_from_slice(&offset.to_le_bytes());
        sheet_stream(&mut globals, sheet, &strings, options.pre_calculate_formulas)?;
    }

    Ok(globals)
}

fn sheet_stream(
    out: &mut Vec<u8>,
    sheet: &Sheet,
    strings: &SharedStrings,
    pre_calculated: bool,
) -> Result<(), WriteError> {
    push_record(out, RECORD_BOF, &bof(BOF_DT_WORKSHEET))?;

    let (rows, cols) = sheet.dimensions();
    let mut dims = Vec::<u8>::new();
    dims.extend_from_slice(&0u32.to_le_bytes()); // first row
    dims.extend_from_slice(&rows.to_le_bytes()); // last row + 1
    dims.extend_from_slice(&0u16.to_le_bytes()); // first col
    dims.extend_from_slice(&(cols as u16).to_le_bytes()); // last col + 1
    dims.extend_from_slice(&0u16.to_le_bytes()); // reserved
    push_record(out, RECORD_DIMENSIONS, &dims)?;
    push_record(out, RECORD_WINDOW2, &window2())?;

    for (row, col, cell) in sheet.cells() {
        let row = u16::try_from(row)
            .map_err(|_| WriteError::Xls(format!("row {row} out of BIFF8 range")))?;
        let col = u16::try_from(col)
            .map_err(|_| WriteError::Xls(format!("column {col} out of BIFF8 range")))?;

        match &cell.value {
            CellValue::Empty => {}
            CellValue::Number(n) => {
                push_record(out, RECORD_NUMBER, &number_cell(row, col, *n))?;
            }
            CellValue::Bool(b) => {
                let mut payload = cell_header(row, col);
                payload.push(u8::from(*b));
                payload.push(0); // value, not an error code
                push_record(out, RECORD_BOOLERR, &payload)?;
            }
            value @ (CellValue::Text(_) | CellValue::Formula { .. }) => {
                match formula_as_number(value, pre_calculated) {
                    Some(n) => push_record(out, RECORD_NUMBER, &number_cell(row, col, n))?,
                    None => {
                        let text = value.display(pre_calculated);
                        let isst = strings.index_of(&text);
                        let mut payload = cell_header(row, col);
                        payload.extend_from_slice(&isst.to_le_bytes());
                        push_record(out, RECORD_LABELSST, &payload)?;
                    }
                }
            }
        }
    }

    push_record(out, RECORD_EOF, &[])?;
    Ok(())
}

/// Shared string table: text cells plus formulas that fall back to text.
struct SharedStrings {
    unique: Vec<String>,
    index: HashMap<String, u32>,
    total_refs: u32,
}

impl SharedStrings {
    fn collect(book: &Book, pre_calculated: bool) -> Self {
        let mut table = Self {
            unique: Vec::new(),
            index: HashMap::new(),
            total_refs: 0,
        };

        for sheet in book.sheets() {
            for (_, _, cell) in sheet.cells() {
                match &cell.value {
                    CellValue::Text(_) => {
                        table.add(cell.value.display(pre_calculated));
                    }
                    value @ CellValue::Formula { .. }
                        if formula_as_number(value, pre_calculated).is_none() =>
                    {
                        table.add(value.display(pre_calculated));
                    }
                    _ => {}
                }
            }
        }
        table
    }

    fn add(&mut self, text: String) {
        self.total_refs += 1;
        if !self.index.contains_key(&text) {
            self.index.insert(text.clone(), self.unique.len() as u32);
            self.unique.push(text);
        }
    }

    fn index_of(&self, text: &str) -> u32 {
        self.index.get(text).copied().unwrap_or(0)
    }

    fn sst_payload(&self) -> Result<Vec<u8>, WriteError> {
        let mut payload = Vec::<u8>::new();
        payload.extend_from_slice(&self.total_refs.to_le_bytes());
        payload.extend_from_slice(&(self.unique.len() as u32).to_le_bytes());
        for text in &self.unique {
            write_unicode_string(&mut payload, text)?;
        }
        Ok(payload)
    }
}

/// Formulas degrade to their cached numeric value when pre-calculation is on.
fn formula_as_number(value: &CellValue, pre_calculated: bool) -> Option<f64> {
    match value {
        CellValue::Formula {
            cached: Some(v), ..
        } if pre_calculated => Some(*v),
        _ => None,
    }
}

fn push_record(out: &mut Vec<u8>, id: u16, data: &[u8]) -> Result<(), WriteError> {
    if data.len() > MAX_RECORD_DATA {
        return Err(WriteError::Xls(format!(
            "record 0x{id:04X} payload of {} bytes exceeds the BIFF8 record limit",
            data.len()
        )));
    }
    out.extend_from_slice(&id.to_le_bytes());
    out.extend_from_slice(&(data.len() as u16).to_le_bytes());
    out.extend_from_slice(data);
    Ok(())
}

fn bof(dt: u16) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[0..2].copy_from_slice(&BOF_VERSION_BIFF8.to_le_bytes());
    out[2..4].copy_from_slice(&dt.to_le_bytes());
    out[4..6].copy_from_slice(&0x0DBBu16.to_le_bytes()); // build
    out[6..8].copy_from_slice(&0x07CCu16.to_le_bytes()); // build year
    out
}

fn window1() -> [u8; 18] {
    let mut out = [0u8; 18];
    out[14..16].copy_from_slice(&1u16.to_le_bytes()); // cTabSel
    out[16..18].copy_from_slice(&600u16.to_le_bytes()); // wTabRatio
    out
}

fn window2() -> [u8; 18] {
    let mut out = [0u8; 18];
    let grbit: u16 = 0x02B6;
    out[0..2].copy_from_slice(&grbit.to_le_bytes());
    out
}

fn font(book: &Book) -> Vec<u8> {
    let style = book.default_style();
    let height_twips = (style.font_size.unwrap_or(10.0) * 20.0) as u16;
    let weight: u16 = if style.bold { 700 } else { 400 };
    let name = style.font_name.as_deref().unwrap_or("Arial");

    let mut out = Vec::<u8>::new();
    out.extend_from_slice(&height_twips.to_le_bytes());
    let flags: u16 = if style.italic { 0x0002 } else { 0 };
    out.extend_from_slice(&flags.to_le_bytes());
    out.extend_from_slice(&COLOR_AUTOMATIC.to_le_bytes());
    out.extend_from_slice(&weight.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes()); // escapement
    out.push(0); // underline
    out.push(0); // family
    out.push(0); // charset
    out.push(0); // reserved
    // The name length is always in range here, so the error path is unreachable
    // in practice; fall back to a truncated marker if it ever is not.
    if write_short_unicode_string(&mut out, name).is_err() {
        out.push(1);
        out.push(0);
        out.push(b'A');
    }
    out
}

fn xf_record(is_style_xf: bool) -> [u8; 20] {
    let mut out = [0u8; 20];
    // font 0, format 0 (General)
    let flags: u16 = XF_FLAG_LOCKED | if is_style_xf { XF_FLAG_STYLE } else { 0 };
    out[4..6].copy_from_slice(&flags.to_le_bytes());
    out[6] = 0x20; // General + Bottom alignment
    out[9] = 0x3F; // apply all attribute groups
    out
}

fn cell_header(row: u16, col: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    out.extend_from_slice(&row.to_le_bytes());
    out.extend_from_slice(&col.to_le_bytes());
    out.extend_from_slice(&CELL_XF.to_le_bytes());
    out
}

fn number_cell(row: u16, col: u16, value: f64) -> [u8; 14] {
    let mut out = [0u8; 14];
    out[0..2].copy_from_slice(&row.to_le_bytes());
    out[2..4].copy_from_slice(&col.to_le_bytes());
    out[4..6].copy_from_slice(&CELL_XF.to_le_bytes());
    out[6..14].copy_from_slice(&value.to_le_bytes());
    out
}

/// BIFF8 ShortXLUnicodeString: `[cch: u8][flags: u8][chars]`, UTF-16LE.
fn write_short_unicode_string(out: &mut Vec<u8>, s: &str) -> Result<(), WriteError> {
    let units: Vec<u16> = s.encode_utf16().collect();
    let len = u8::try_from(units.len())
        .map_err(|_| WriteError::Xls(format!("string \"{s}\" too long for BIFF8 name")))?;
    out.push(len);
    out.push(0x01); // fHighByte: 16-bit characters
    for unit in units {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    Ok(())
}

/// BIFF8 XLUnicodeRichExtendedString: `[cch: u16][flags: u8][chars]`, UTF-16LE.
fn write_unicode_string(out: &mut Vec<u8>, s: &str) -> Result<(), WriteError> {
    let units: Vec<u16> = s.encode_utf16().collect();
    let len = u16::try_from(units.len())
        .map_err(|_| WriteError::Xls("string too long for BIFF8 record".to_string()))?;
    out.extend_from_slice(&len.to_le_bytes());
    out.push(0x01); // fHighByte: 16-bit characters
    for unit in units {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    Ok(())
}

/// The documented XOR obfuscation password verifier for legacy Excel formats.
fn password_hash(plain: &str) -> u16 {
    let mut hash: u16 = 0;
    for (i, byte) in plain.bytes().take(15).enumerate() {
        let mut value = (byte as u32) << (i + 1);
        let rotated = value >> 15;
        value &= 0x7FFF;
        hash ^= (value | rotated) as u16;
    }
    hash ^= plain.bytes().take(15).count() as u16;
    hash ^ 0xCE4B
}
