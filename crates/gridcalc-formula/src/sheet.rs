//! Sheet: a sparse grid of cells with a fixed extent

use crate::cell::Cell;
use ahash::AHashMap;
use gridcalc_core::{
    CellAddress, CellRange, Error, Result, DEFAULT_COLS, DEFAULT_ROWS, MAX_COLS, MAX_ROWS,
};

/// A named grid of cells
///
/// Storage is sparse: an address with no entry is an empty cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    id: String,
    name: String,
    rows: u32,
    cols: u32,
    cells: AHashMap<CellAddress, Cell>,
}

impl Sheet {
    /// Create an empty sheet with the default extent
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_extent(id, name, DEFAULT_ROWS, DEFAULT_COLS)
    }

    /// Create an empty sheet with the given extent, clamped to the maximum
    pub fn with_extent(
        id: impl Into<String>,
        name: impl Into<String>,
        rows: u32,
        cols: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rows: rows.clamp(1, MAX_ROWS),
            cols: cols.clamp(1, MAX_COLS),
            cells: AHashMap::new(),
        }
    }

    /// Sheet identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Every address the sheet can hold, `A1` to the bottom-right corner
    pub fn extent(&self) -> CellRange {
        CellRange::new(
            CellAddress::new(0, 0),
            CellAddress::new(self.cols - 1, self.rows - 1),
        )
    }

    /// Whether the address lies inside the sheet's extent
    pub fn contains(&self, addr: CellAddress) -> bool {
        addr.row < self.rows && addr.col < self.cols
    }

    /// Fail unless the address lies inside the sheet's extent
    pub fn check_bounds(&self, addr: CellAddress) -> Result<()> {
        if addr.row >= self.rows {
            return Err(Error::RowOutOfBounds(addr.row, self.rows - 1));
        }
        if addr.col >= self.cols {
            return Err(Error::ColumnOutOfBounds(addr.col, self.cols - 1));
        }
        Ok(())
    }

    /// The cell at an address, if one is stored
    pub fn get(&self, addr: CellAddress) -> Option<&Cell> {
        self.cells.get(&addr)
    }

    /// Store a cell, returning the one it replaces
    pub fn set(&mut self, addr: CellAddress, cell: Cell) -> Result<Option<Cell>> {
        self.check_bounds(addr)?;
        Ok(self.cells.insert(addr, cell))
    }

    /// Remove the cell at an address, leaving it empty
    pub fn remove(&mut self, addr: CellAddress) -> Option<Cell> {
        self.cells.remove(&addr)
    }

    /// Iterate over stored cells in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (CellAddress, &Cell)> + '_ {
        self.cells.iter().map(|(addr, cell)| (*addr, cell))
    }

    /// Addresses of formula cells, in row-major order
    pub fn formula_cells(&self) -> Vec<CellAddress> {
        let mut addrs: Vec<_> = self
            .iter()
            .filter(|(_, cell)| cell.is_formula())
            .map(|(addr, _)| addr)
            .collect();
        addrs.sort_unstable();
        addrs
    }

    /// Number of stored cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cells are stored
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_sheet() {
        let sheet = Sheet::new("s1", "Budget");
        assert_eq!(sheet.id(), "s1");
        assert_eq!(sheet.name(), "Budget");
        assert_eq!(sheet.rows(), DEFAULT_ROWS);
        assert_eq!(sheet.cols(), DEFAULT_COLS);
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_extent_is_clamped() {
        let sheet = Sheet::with_extent("s", "S", u32::MAX, 0);
        assert_eq!(sheet.rows(), MAX_ROWS);
        assert_eq!(sheet.cols(), 1);
        assert_eq!(sheet.extent(), CellRange::parse("A1:A1048576").unwrap());
    }

    #[test]
    fn test_set_checks_bounds() {
        let mut sheet = Sheet::with_extent("s", "S", 10, 3);
        assert_eq!(sheet.set(CellAddress::new(2, 9), Cell::literal(1)), Ok(None));
        assert_eq!(
            sheet.set(CellAddress::new(3, 0), Cell::literal(1)),
            Err(Error::ColumnOutOfBounds(3, 2))
        );
        assert_eq!(
            sheet.set(CellAddress::new(0, 10), Cell::literal(1)),
            Err(Error::RowOutOfBounds(10, 9))
        );
        assert_eq!(sheet.len(), 1);
    }

    #[test]
    fn test_set_replace_and_remove() {
        let mut sheet = Sheet::new("s", "S");
        let a1 = CellAddress::new(0, 0);
        sheet.set(a1, Cell::literal(1)).unwrap();
        let old = sheet.set(a1, Cell::formula("=2")).unwrap();
        assert_eq!(old, Some(Cell::literal(1)));
        assert!(sheet.get(a1).is_some_and(Cell::is_formula));
        assert!(sheet.remove(a1).is_some());
        assert_eq!(sheet.get(a1), None);
    }

    #[test]
    fn test_formula_cells_sorted() {
        let mut sheet = Sheet::new("s", "S");
        sheet.set(CellAddress::new(0, 2), Cell::formula("=1")).unwrap();
        sheet.set(CellAddress::new(1, 0), Cell::formula("=2")).unwrap();
        sheet.set(CellAddress::new(0, 0), Cell::literal(5)).unwrap();
        sheet.set(CellAddress::new(0, 1), Cell::formula("=3")).unwrap();

        assert_eq!(
            sheet.formula_cells(),
            vec![
                CellAddress::new(1, 0),
                CellAddress::new(0, 1),
                CellAddress::new(0, 2)
            ]
        );
    }
}
