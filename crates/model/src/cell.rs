use serde::{Deserialize, Serialize};

/// The value stored in a single cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// A formula expression (leading `=` included) with an optional cached
    /// result captured when the cell was loaded or populated. Writers that
    /// cannot carry formulas fall back to the cached value or the expression
    /// text, depending on the pre-calculation option.
    Formula {
        expr: String,
        cached: Option<f64>,
    },
}

impl CellValue {
    /// Formula value without a cached result.
    pub fn formula(expr: impl Into<String>) -> Self {
        let expr = expr.into();
        let expr = if expr.starts_with('=') {
            expr
        } else {
            format!("={expr}")
        };
        CellValue::Formula { expr, cached: None }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Plain-text rendering used by the CSV and PDF writers.
    ///
    /// When `pre_calculated` is set, formulas render their cached result if one
    /// is available; otherwise the formula text is emitted verbatim.
    pub fn display(&self, pre_calculated: bool) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Formula { expr, cached } => match cached {
                Some(v) if pre_calculated => format_number(*v),
                _ => expr.clone(),
            },
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// A cell: currently just its value. Kept as a struct so per-cell attributes
/// can grow without touching the sheet storage layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub value: CellValue,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Self { value }
    }
}

impl From<CellValue> for Cell {
    fn from(value: CellValue) -> Self {
        Cell::new(value)
    }
}

/// Integers print without a trailing `.0` so text output matches what a
/// spreadsheet UI would show.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
