//! # gridcalc-formula
//!
//! Formula parser and evaluator for gridcalc.
//!
//! This crate provides:
//! - Formula lexing and parsing (text → AST)
//! - A dependency graph over cell addresses (cycle detection, evaluation order)
//! - Formula evaluation (AST → value or classified error)
//! - Built-in functions (`SUM`, `AVG`/`AVERAGE`, `MIN`, `MAX`, `COUNT`, `IF`)
//! - Reference rewriting for copy/paste and row/column insertion or deletion
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{CellAddress, CellValue};
//! use gridcalc_formula::{Cell, EvalResult, Evaluator, Sheet};
//!
//! let mut sheet = Sheet::new("s1", "Budget");
//! sheet.set(CellAddress::new(0, 0), Cell::literal(10.0)).unwrap();
//! sheet.set(CellAddress::new(0, 1), Cell::formula("=A1*2")).unwrap();
//!
//! let mut evaluator = Evaluator::new();
//! let results = evaluator.evaluate_sheet(&sheet);
//! assert_eq!(
//!     results[&CellAddress::new(0, 1)],
//!     EvalResult::Value(CellValue::Number(20.0))
//! );
//! ```

pub mod ast;
pub mod cell;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod sheet;
pub mod translate;

pub use ast::{BinaryOperator, FormulaExpr, RangeReference, UnaryOperator};
pub use cell::Cell;
pub use dependency::{extract_references, extract_references_within, DependencyGraph};
pub use error::{FormulaError, FormulaResult, ParseError};
pub use evaluator::{
    EvalResult, EvaluationContext, EvaluationOptions, Evaluator, FormulaValue, MAX_REFERENCE_DEPTH,
};
pub use lexer::{Lexer, Token};
pub use parser::parse_formula;
pub use sheet::Sheet;
pub use translate::{adjust_formula, translate_formula};
