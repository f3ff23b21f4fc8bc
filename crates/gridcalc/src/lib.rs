//! # gridcalc
//!
//! A spreadsheet formula engine.
//!
//! gridcalc turns formula text into a syntax tree, orders formula cells by the
//! cells they read, and evaluates them to a value or one of five error codes
//! (`#CYCLE!`, `#REF!`, `#PARSE!`, `#DIV0!`, `#EVAL!`).
//!
//! ## Features
//!
//! - A1-style addressing with `$` fixed markers and `A1:B3` ranges
//! - Arithmetic, comparison and string concatenation operators
//! - `SUM`, `AVG`/`AVERAGE`, `MIN`, `MAX`, `COUNT` and `IF`
//! - Circular reference detection that tolerates diamond-shaped dependencies
//! - Reference rewriting for copy/paste and row/column insertion or deletion
//!
//! ## Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut sheet = Sheet::new("s1", "Budget");
//! apply_edits(
//!     &mut sheet,
//!     vec![
//!         Edit::from_input(CellAddress::parse("A1").unwrap(), "10"),
//!         Edit::from_input(CellAddress::parse("A2").unwrap(), "32"),
//!         Edit::from_input(CellAddress::parse("A3").unwrap(), "=SUM(A1:A2)"),
//!     ],
//! )
//! .unwrap();
//!
//! let calculation = sheet.calculate();
//! assert_eq!(calculation.stats.formula_count, 1);
//! assert_eq!(
//!     calculation.get(CellAddress::parse("A3").unwrap()).unwrap().to_string(),
//!     "42"
//! );
//! ```

pub mod calculation;
pub mod edit;
pub mod prelude;
pub mod structure;

// Re-export calculation types
pub use calculation::{Calculation, CalculationOptions, CalculationStats, SheetCalculationExt};

// Re-export edit types
pub use edit::{apply_edits, Edit, EditAction};
pub use structure::apply_structural_edit;

// Re-export core types
pub use gridcalc_core::{
    adjust_range,
    adjust_reference,
    expand_range,
    format_address,
    parse_address,
    CellAddress,
    CellRange,
    CellReference,
    // Cell types
    CellValue,
    // Error types
    Error,
    ErrorCode,
    Result,
    StructuralEdit,
    // Constants
    DEFAULT_COLS,
    DEFAULT_ROWS,
    MAX_COLS,
    MAX_ROWS,
};

// Re-export formula types
pub use gridcalc_formula::{
    adjust_formula, extract_references, extract_references_within, parse_formula,
    translate_formula, Cell, DependencyGraph, EvalResult, EvaluationOptions, Evaluator,
    FormulaError, FormulaExpr, FormulaResult, ParseError, Sheet, MAX_REFERENCE_DEPTH,
};
