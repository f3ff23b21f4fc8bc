//! Edit batches
//!
//! An edit names a cell and what to do with it. A batch is checked against
//! the sheet's extent before anything is written, so it applies whole or not
//! at all.

use crate::{Cell, CellAddress, CellValue, Result, Sheet};
use tracing::debug;

/// What to do with a cell
#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
    /// Store a literal value
    SetValue(CellValue),
    /// Store formula text; text that does not parse is stored as a `PARSE`
    /// error cell
    SetFormula(String),
    /// Remove whatever the cell holds
    Clear,
}

impl EditAction {
    /// Classify raw user input
    ///
    /// A leading `=` makes a formula, numeric text a number, `TRUE`/`FALSE`
    /// (any case) a boolean, blank text a clear and anything else a string.
    pub fn from_input(text: &str) -> Self {
        let trimmed = text.trim();

        if trimmed.starts_with('=') {
            return EditAction::SetFormula(trimmed.to_string());
        }
        if trimmed.is_empty() {
            return EditAction::Clear;
        }
        if let Some(n) = trimmed.parse::<f64>().ok().filter(|n| n.is_finite()) {
            return EditAction::SetValue(CellValue::Number(n));
        }
        if trimmed.eq_ignore_ascii_case("TRUE") {
            return EditAction::SetValue(CellValue::Boolean(true));
        }
        if trimmed.eq_ignore_ascii_case("FALSE") {
            return EditAction::SetValue(CellValue::Boolean(false));
        }

        EditAction::SetValue(CellValue::string(text))
    }
}

/// A single cell edit
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub address: CellAddress,
    pub action: EditAction,
}

impl Edit {
    /// Create an edit
    pub fn new(address: CellAddress, action: EditAction) -> Self {
        Self { address, action }
    }

    /// Store a literal value
    pub fn set_value(address: CellAddress, value: impl Into<CellValue>) -> Self {
        Self::new(address, EditAction::SetValue(value.into()))
    }

    /// Store formula text
    pub fn set_formula(address: CellAddress, source: impl Into<String>) -> Self {
        Self::new(address, EditAction::SetFormula(source.into()))
    }

    /// Clear a cell
    pub fn clear(address: CellAddress) -> Self {
        Self::new(address, EditAction::Clear)
    }

    /// Edit a cell from raw user input (see [`EditAction::from_input`])
    pub fn from_input(address: CellAddress, text: &str) -> Self {
        Self::new(address, EditAction::from_input(text))
    }
}

/// Apply a batch of edits in order, returning how many were applied
///
/// Fails without touching the sheet if any edit lies outside its extent.
/// Formula text that does not parse never fails the batch; the cell stores a
/// `PARSE` error instead.
pub fn apply_edits(sheet: &mut Sheet, edits: impl IntoIterator<Item = Edit>) -> Result<usize> {
    let edits: Vec<Edit> = edits.into_iter().collect();

    for edit in &edits {
        sheet.check_bounds(edit.address)?;
    }

    for edit in &edits {
        match &edit.action {
            EditAction::SetValue(value) => {
                sheet.set(edit.address, Cell::Literal(value.clone()))?;
            }
            EditAction::SetFormula(source) => {
                let cell = Cell::formula(source.as_str());
                if let Cell::Error { code, .. } = &cell {
                    debug!(cell = %edit.address, %code, "storing formula as an error cell");
                }
                sheet.set(edit.address, cell)?;
            }
            EditAction::Clear => {
                sheet.remove(edit.address);
            }
        }
    }

    debug!(sheet = sheet.id(), edits = edits.len(), "applied edit batch");
    Ok(edits.len())
}
