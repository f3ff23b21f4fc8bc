//! Prelude module - common imports for gridcalc users
//!
//! ```rust
//! use gridcalc::prelude::*;
//! ```

pub use crate::{
    // Edits
    apply_edits,
    apply_structural_edit,
    // Calculation types
    Calculation,
    CalculationOptions,
    CalculationStats,
    // Cell types
    Cell,
    CellAddress,
    CellRange,
    CellReference,
    CellValue,
    Edit,
    EditAction,
    // Error types
    Error,
    ErrorCode,
    EvalResult,
    Evaluator,
    FormulaError,
    Result,
    // Main types
    Sheet,
    // Extension traits
    SheetCalculationExt,
    StructuralEdit,
};
