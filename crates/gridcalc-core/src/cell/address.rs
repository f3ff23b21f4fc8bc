//! Cell address, reference and range types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell location (e.g., "A1")
///
/// Both indices are 0-based. Addresses order row-major: by row, then by
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., Z=25, AA=26)
    pub col: u32,
}

impl CellAddress {
    /// Create a new cell address from column and row indices
    pub fn new(col: u32, row: u32) -> Self {
        Self { row, col }
    }

    /// Parse a cell address from A1-style notation, discarding any `$` markers
    ///
    /// # Examples
    /// ```
    /// use gridcalc_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("B3").unwrap();
    /// assert_eq!(addr.col, 1);
    /// assert_eq!(addr.row, 2);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        CellReference::parse(s).map(|reference| reference.address)
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u32) -> String {
        let mut result = String::new();
        let mut n = col as u64 + 1; // 1-based for calculation

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
            col = col
                .checked_mul(26)
                .and_then(|v| v.checked_add(digit))
                .filter(|v| *v <= MAX_COLS)
                .ok_or_else(|| {
                    Error::InvalidAddress(format!("column '{}' out of range", letters))
                })?;
        }

        Ok(col - 1) // Convert to 0-based
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row as u64 + 1)
    }

    /// Create a range from this address to another
    pub fn to(&self, other: CellAddress) -> CellRange {
        CellRange::new(*self, other)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A cell address as written in a formula (e.g., "A1", "$B$2", "C$3")
///
/// The optional `$` prefix fixes an axis: a fixed column or row does not
/// move when a formula is copied or when rows/columns are inserted or
/// deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellReference {
    /// The referenced location
    pub address: CellAddress,
    /// Whether the column is fixed (`$A1`)
    pub col_fixed: bool,
    /// Whether the row is fixed (`A$1`)
    pub row_fixed: bool,
}

impl CellReference {
    /// Create a reference with explicit fixed flags
    pub fn new(address: CellAddress, col_fixed: bool, row_fixed: bool) -> Self {
        Self {
            address,
            col_fixed,
            row_fixed,
        }
    }

    /// Create a reference with both axes relative
    pub fn relative(address: CellAddress) -> Self {
        Self::new(address, false, false)
    }

    /// Create a reference with both axes fixed (`$A$1` style)
    pub fn fixed(address: CellAddress) -> Self {
        Self::new(address, true, true)
    }

    /// Parse a reference from A1-style notation
    ///
    /// Accepts `('$')? LETTERS ('$')? DIGITS`; letters are case-insensitive.
    ///
    /// # Examples
    /// ```
    /// use gridcalc_core::CellReference;
    ///
    /// let reference = CellReference::parse("A1").unwrap();
    /// assert_eq!(reference.address.row, 0);
    /// assert_eq!(reference.address.col, 0);
    ///
    /// let reference = CellReference::parse("$B$2").unwrap();
    /// assert_eq!(reference.address.row, 1);
    /// assert_eq!(reference.address.col, 1);
    /// assert!(reference.col_fixed);
    /// assert!(reference.row_fixed);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        // Check for column fixed marker
        let col_fixed = if bytes.get(pos) == Some(&b'$') {
            pos += 1;
            true
        } else {
            false
        };

        // Parse column letters
        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }

        if pos == col_start {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let col = CellAddress::letters_to_column(&s[col_start..pos])?;

        // Check for row fixed marker
        let row_fixed = if bytes.get(pos) == Some(&b'$') {
            pos += 1;
            true
        } else {
            false
        };

        // Parse row number
        let row_str = &s[pos..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }
        if !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!(
                "invalid row number in '{}'",
                s
            )));
        }

        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        // Rows are 1-based in text, 0-based internally
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        let row = row - 1;

        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }

        Ok(Self {
            address: CellAddress::new(col, row),
            col_fixed,
            row_fixed,
        })
    }

    /// Whether both axes are fixed
    pub fn is_fully_fixed(&self) -> bool {
        self.col_fixed && self.row_fixed
    }

    /// Format as A1-style string, including `$` markers
    pub fn to_a1_string(&self) -> String {
        let mut result = String::new();

        if self.col_fixed {
            result.push('$');
        }
        result.push_str(&CellAddress::column_to_letters(self.address.col));

        if self.row_fixed {
            result.push('$');
        }
        result.push_str(&(self.address.row as u64 + 1).to_string());

        result
    }

    /// Move the relative axes by a column/row delta, as when a formula is
    /// copied from one cell to another
    ///
    /// Returns `None` when the moved reference would fall off the sheet.
    pub fn offset(&self, col_delta: i64, row_delta: i64) -> Option<Self> {
        let shift = |index: u32, fixed: bool, delta: i64, limit: u32| -> Option<u32> {
            if fixed {
                return Some(index);
            }
            let moved = index as i64 + delta;
            (0..limit as i64).contains(&moved).then_some(moved as u32)
        };

        Some(Self {
            address: CellAddress::new(
                shift(self.address.col, self.col_fixed, col_delta, MAX_COLS)?,
                shift(self.address.row, self.row_fixed, row_delta, MAX_ROWS)?,
            ),
            ..*self
        })
    }

    /// Adjust this reference for a row/column insertion or deletion
    ///
    /// Returns `None` when the reference falls off the sheet or points at
    /// the row or column being deleted.
    pub fn adjust(&self, edit: StructuralEdit) -> Option<Self> {
        self.adjust_edge(edit, Edge::Lone, Edge::Lone)
    }

    fn adjust_edge(&self, edit: StructuralEdit, col_edge: Edge, row_edge: Edge) -> Option<Self> {
        Some(Self {
            address: CellAddress::new(
                adjust_index(
                    self.address.col,
                    self.col_fixed,
                    edit.column_edit(),
                    col_edge,
                    MAX_COLS,
                )?,
                adjust_index(
                    self.address.row,
                    self.row_fixed,
                    edit.row_edit(),
                    row_edge,
                    MAX_ROWS,
                )?,
            ),
            ..*self
        })
    }
}

/// How an index sitting on a deleted row or column reacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    /// A lone reference: it vanishes
    Lone,
    /// The near end of a range: the next row or column slides under it
    Near,
    /// The far end of a range: it retreats by one
    Far,
}

#[derive(Debug, Clone, Copy)]
enum AxisEdit {
    Insert(u32),
    Delete(u32),
}

fn adjust_index(
    index: u32,
    fixed: bool,
    edit: Option<AxisEdit>,
    edge: Edge,
    limit: u32,
) -> Option<u32> {
    if fixed {
        return Some(index);
    }
    match edit {
        Some(AxisEdit::Insert(at)) if at <= index => index.checked_add(1).filter(|i| *i < limit),
        Some(AxisEdit::Delete(at)) if at < index => Some(index - 1),
        Some(AxisEdit::Delete(at)) if at == index => match edge {
            Edge::Lone => None,
            Edge::Near => Some(index),
            Edge::Far => index.checked_sub(1),
        },
        _ => Some(index),
    }
}

impl fmt::Display for CellReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<CellAddress> for CellReference {
    fn from(address: CellAddress) -> Self {
        Self::relative(address)
    }
}

/// A single-row or single-column insertion or deletion
///
/// The index is the 0-based row or column at which the edit happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralEdit {
    /// A row inserted before the given row
    InsertRow(u32),
    /// The given row removed
    DeleteRow(u32),
    /// A column inserted before the given column
    InsertColumn(u32),
    /// The given column removed
    DeleteColumn(u32),
}

impl StructuralEdit {
    fn row_edit(self) -> Option<AxisEdit> {
        match self {
            StructuralEdit::InsertRow(at) => Some(AxisEdit::Insert(at)),
            StructuralEdit::DeleteRow(at) => Some(AxisEdit::Delete(at)),
            _ => None,
        }
    }

    fn column_edit(self) -> Option<AxisEdit> {
        match self {
            StructuralEdit::InsertColumn(at) => Some(AxisEdit::Insert(at)),
            StructuralEdit::DeleteColumn(at) => Some(AxisEdit::Delete(at)),
            _ => None,
        }
    }
}

/// A range of cells (e.g., "A1:B10")
///
/// Always normalized so `start` is the top-left corner and `end` the
/// bottom-right, whichever corners it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        Self {
            start: CellAddress::new(start.col.min(end.col), start.row.min(end.row)),
            end: CellAddress::new(start.col.max(end.col), start.row.max(end.row)),
        }
    }

    /// Create a single-cell range
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse a range from A1:B10 notation
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        match s.split_once(':') {
            Some((start, end)) => {
                let start = CellAddress::parse(start)
                    .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;
                let end = CellAddress::parse(end)
                    .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;
                Ok(Self::new(start, end))
            }
            None => CellAddress::parse(s).map(Self::single),
        }
    }

    /// Check if a cell is within this range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }

    /// The cells this range shares with `other`, if any
    pub fn intersection(&self, other: &CellRange) -> Option<CellRange> {
        let start = CellAddress::new(
            self.start.col.max(other.start.col),
            self.start.row.max(other.start.row),
        );
        let end = CellAddress::new(
            self.end.col.min(other.end.col),
            self.end.row.min(other.end.row),
        );
        (start.col <= end.col && start.row <= end.row).then(|| CellRange::new(start, end))
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    /// Get the total number of cells in the range
    pub fn cell_count(&self) -> u64 {
        self.row_count() as u64 * self.col_count() as u64
    }

    /// Iterate over all cell addresses in the range (row by row)
    pub fn cells(&self) -> CellRangeIterator {
        CellRangeIterator {
            range: *self,
            current_row: self.start.row,
            current_col: self.start.col,
        }
    }

    /// Format as A1:B10 string
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Iterator over cells in a range
pub struct CellRangeIterator {
    range: CellRange,
    current_row: u32,
    current_col: u32,
}

impl Iterator for CellRangeIterator {
    type Item = CellAddress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row > self.range.end.row {
            return None;
        }

        let addr = CellAddress::new(self.current_col, self.current_row);

        // Move to next cell
        self.current_col += 1;
        if self.current_col > self.range.end.col {
            self.current_col = self.range.start.col;
            self.current_row += 1;
        }

        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.current_row > self.range.end.row {
            return (0, Some(0));
        }
        let width = self.range.col_count() as u64;
        let full_rows_left = (self.range.end.row - self.current_row) as u64;
        let in_current_row = (self.range.end.col - self.current_col + 1) as u64;
        let remaining = (full_rows_left * width + in_current_row) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CellRangeIterator {}

/// Parse `('$')? LETTERS ('$')? DIGITS` into a location plus fixed flags
pub fn parse_address(text: &str) -> Result<CellReference> {
    CellReference::parse(text)
}

/// Format a location plus fixed flags as A1-style text
pub fn format_address(col: u32, row: u32, col_fixed: bool, row_fixed: bool) -> String {
    CellReference::new(CellAddress::new(col, row), col_fixed, row_fixed).to_a1_string()
}

/// Enumerate every address in the rectangle spanned by two corners, row by row
pub fn expand_range(start: CellAddress, end: CellAddress) -> Vec<CellAddress> {
    CellRange::new(start, end).cells().collect()
}

/// Shift a reference for a row/column insertion or deletion; fixed axes
/// never move
pub fn adjust_reference(reference: &CellReference, edit: StructuralEdit) -> Option<CellReference> {
    reference.adjust(edit)
}

/// Shift both ends of a range reference for a row/column insertion or
/// deletion
///
/// Deleting a row or column inside the range shrinks it; deleting its only
/// row or column leaves nothing, and `None` is returned. The ends may be
/// written in either order.
pub fn adjust_range(
    first: &CellReference,
    second: &CellReference,
    edit: StructuralEdit,
) -> Option<(CellReference, CellReference)> {
    let edges = |a: u32, b: u32| {
        if a <= b {
            (Edge::Near, Edge::Far)
        } else {
            (Edge::Far, Edge::Near)
        }
    };
    let (first_col, second_col) = edges(first.address.col, second.address.col);
    let (first_row, second_row) = edges(first.address.row, second.address.row);

    let new_first = first.adjust_edge(edit, first_col, first_row)?;
    let new_second = second.adjust_edge(edit, second_col, second_row)?;

    // An axis whose ends crossed had every row or column on it deleted
    let crossed =
        |a: u32, b: u32, new_a: u32, new_b: u32| (a <= b) != (new_a <= new_b) && new_a != new_b;
    if crossed(
        first.address.col,
        second.address.col,
        new_first.address.col,
        new_second.address.col,
    ) || crossed(
        first.address.row,
        second.address.row,
        new_first.address.row,
        new_second.address.row,
    ) {
        return None;
    }

    Some((new_first, new_second))
}
