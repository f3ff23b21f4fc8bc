//! Row and column insertion and deletion
//!
//! A structural edit moves cells and rewrites every formula so its
//! references keep pointing at the same data. The sheet's extent does not
//! change: cells pushed past the last row or column are dropped.

use crate::{adjust_formula, Cell, CellAddress, Sheet, StructuralEdit};
use tracing::debug;

/// Where a cell at `addr` ends up, or `None` if the edit removes it
fn move_address(addr: CellAddress, edit: StructuralEdit) -> Option<CellAddress> {
    let mut moved = addr;
    match edit {
        StructuralEdit::InsertRow(at) if addr.row >= at => moved.row = addr.row.checked_add(1)?,
        StructuralEdit::InsertColumn(at) if addr.col >= at => moved.col = addr.col.checked_add(1)?,
        StructuralEdit::DeleteRow(at) if addr.row == at => return None,
        StructuralEdit::DeleteRow(at) if addr.row > at => moved.row = addr.row - 1,
        StructuralEdit::DeleteColumn(at) if addr.col == at => return None,
        StructuralEdit::DeleteColumn(at) if addr.col > at => moved.col = addr.col - 1,
        _ => {}
    }
    Some(moved)
}

/// Build the sheet that results from inserting or deleting a row or column
///
/// The input sheet is left untouched. Formula text is rewritten with
/// [`adjust_formula`] and parsed again; a reference that no longer points
/// anywhere becomes `#REF!`.
pub fn apply_structural_edit(sheet: &Sheet, edit: StructuralEdit) -> Sheet {
    let mut result = Sheet::with_extent(sheet.id(), sheet.name(), sheet.rows(), sheet.cols());
    let mut dropped = 0usize;

    for (addr, cell) in sheet.iter() {
        let Some(target) = move_address(addr, edit) else {
            dropped += 1;
            continue;
        };

        let cell = match cell {
            Cell::Formula { source, .. } => Cell::formula(adjust_formula(source, edit)),
            other => other.clone(),
        };

        // Past the last row or column
        if result.set(target, cell).is_err() {
            dropped += 1;
        }
    }

    debug!(
        sheet = sheet.id(),
        ?edit,
        moved = result.len(),
        dropped,
        "applied structural edit"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CellValue, SheetCalculationExt};
    use pretty_assertions::assert_eq;

    fn addr(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    fn sheet() -> Sheet {
        let mut sheet = Sheet::with_extent("s", "S", 5, 3);
        sheet.set(addr("A1"), Cell::literal(1)).unwrap();
        sheet.set(addr("A2"), Cell::literal(2)).unwrap();
        sheet.set(addr("A3"), Cell::literal(3)).unwrap();
        sheet.set(addr("B3"), Cell::formula("=SUM(A2:A3)+$A$1")).unwrap();
        sheet
    }

    #[test]
    fn test_insert_row() {
        let edited = apply_structural_edit(&sheet(), StructuralEdit::InsertRow(1));

        assert_eq!(edited.get(addr("A1")), Some(&Cell::literal(1)));
        assert_eq!(edited.get(addr("A2")), None);
        assert_eq!(edited.get(addr("A3")), Some(&Cell::literal(2)));
        assert_eq!(
            edited.get(addr("B4")).and_then(Cell::source),
            Some("=SUM(A3:A4)+$A$1")
        );
        assert_eq!(
            edited.calculate().get(addr("B4")).and_then(|r| r.value().cloned()),
            Some(CellValue::Number(6.0))
        );
    }

    #[test]
    fn test_delete_row() {
        let edited = apply_structural_edit(&sheet(), StructuralEdit::DeleteRow(0));

        assert_eq!(edited.get(addr("A1")), Some(&Cell::literal(2)));
        assert_eq!(edited.get(addr("A3")), None);
        // The fixed reference does not move, so it now reads the shifted data
        assert_eq!(
            edited.get(addr("B2")).and_then(Cell::source),
            Some("=SUM(A1:A2)+$A$1")
        );
    }

    #[test]
    fn test_delete_row_breaks_references_into_it() {
        let mut sheet = Sheet::with_extent("s", "S", 6, 3);
        sheet.set(addr("A1"), Cell::literal(100)).unwrap();
        sheet.set(addr("A2"), Cell::literal(5)).unwrap();
        sheet.set(addr("A3"), Cell::literal(7)).unwrap();
        sheet.set(addr("B5"), Cell::formula("=A2*2")).unwrap();
        sheet.set(addr("B6"), Cell::formula("=SUM(A2:A3)")).unwrap();

        let edited = apply_structural_edit(&sheet, StructuralEdit::DeleteRow(1));
        assert_eq!(edited.get(addr("B4")).and_then(Cell::source), Some("=#REF!*2"));
        assert_eq!(
            edited.get(addr("B5")).and_then(Cell::source),
            Some("=SUM(A2:A2)")
        );

        let result = edited.calculate();
        assert_eq!(
            result.get(addr("B4")).and_then(|r| r.code()),
            Some(crate::ErrorCode::Ref)
        );
        assert_eq!(
            result.get(addr("B5")).and_then(|r| r.value().cloned()),
            Some(CellValue::Number(7.0))
        );
    }

    #[test]
    fn test_delete_column_leaves_ref_error() {
        let edited = apply_structural_edit(&sheet(), StructuralEdit::DeleteColumn(0));

        assert_eq!(edited.len(), 1);
        assert_eq!(
            edited.get(addr("A3")).and_then(Cell::source),
            Some("=SUM(#REF!)+$A$1")
        );
        let result = edited.calculate();
        assert_eq!(
            result.get(addr("A3")).and_then(|r| r.code()),
            Some(crate::ErrorCode::Ref)
        );
    }

    #[test]
    fn test_cells_pushed_off_the_sheet_are_dropped() {
        let mut sheet = sheet();
        sheet.set(addr("C5"), Cell::literal(9)).unwrap();

        let edited = apply_structural_edit(&sheet, StructuralEdit::InsertRow(0));
        assert_eq!(edited.len(), 4);
        assert_eq!(edited.rows(), 5);

        let edited = apply_structural_edit(&sheet, StructuralEdit::InsertColumn(0));
        assert_eq!(edited.get(addr("B1")), Some(&Cell::literal(1)));
        assert_eq!(edited.len(), 4);
    }
}
