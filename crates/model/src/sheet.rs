use crate::{Cell, CellValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single worksheet with sparse cell storage.
///
/// Cells are keyed by zero-based `(row, column)` and iterate in row-major
/// order, which is the order every writer emits them in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sheet {
    name: String,
    cells: BTreeMap<(u32, u32), Cell>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_value(&mut self, row: u32, col: u32, value: impl Into<CellValue>) {
        self.cells.insert((row, col), Cell::new(value.into()));
    }

    pub fn set_cell(&mut self, row: u32, col: u32, cell: Cell) {
        self.cells.insert((row, col), cell);
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    pub fn value(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&(row, col)).map(|c| &c.value)
    }

    /// Row-major iteration over populated cells.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, &Cell)> {
        self.cells.iter().map(|(&(r, c), cell)| (r, c, cell))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Exclusive bounds of the populated area: `(rows, cols)`.
    ///
    /// An empty sheet has dimensions `(0, 0)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.cells
            .keys()
            .fold((0, 0), |(rows, cols), &(r, c)| {
                (rows.max(r + 1), cols.max(c + 1))
            })
    }
}
