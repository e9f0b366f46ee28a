use crate::{Metadata, Security, Sheet, Style};
use serde::{Deserialize, Serialize};

/// The workbook under construction for one render.
///
/// A new `Book` starts with no sheets; the template layer adds them. The
/// active sheet index tracks the sheet single-sheet writers (CSV) serialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Book {
    metadata: Metadata,
    security: Security,
    default_style: Style,
    sheets: Vec<Sheet>,
    active_sheet: usize,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    pub fn security(&self) -> &Security {
        &self.security
    }

    pub fn security_mut(&mut self) -> &mut Security {
        &mut self.security
    }

    pub fn default_style(&self) -> &Style {
        &self.default_style
    }

    pub fn set_default_style(&mut self, style: Style) {
        self.default_style = style;
    }

    /// Appends a sheet, makes it active, and returns a mutable reference to it.
    pub fn add_sheet(&mut self, name: impl Into<String>) -> &mut Sheet {
        self.sheets.push(Sheet::new(name));
        self.active_sheet = self.sheets.len() - 1;
        &mut self.sheets[self.active_sheet]
    }

    pub fn push_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
        self.active_sheet = self.sheets.len() - 1;
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> &mut [Sheet] {
        &mut self.sheets
    }

    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    pub fn sheet_by_name_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name() == name)
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn active_sheet(&self) -> Option<&Sheet> {
        self.sheets.get(self.active_sheet)
    }

    pub fn active_sheet_index(&self) -> usize {
        self.active_sheet
    }

    /// Sets the active sheet; out-of-range indices are ignored.
    pub fn set_active_sheet(&mut self, index: usize) {
        if index < self.sheets.len() {
            self.active_sheet = index;
        }
    }
}
