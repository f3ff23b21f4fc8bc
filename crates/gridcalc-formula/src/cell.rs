//! Cell contents

use crate::ast::FormulaExpr;
use crate::parser::parse_formula;
use gridcalc_core::{CellValue, ErrorCode};

/// What a sheet stores at an address
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// A plain value
    Literal(CellValue),
    /// Formula text together with its parsed tree
    Formula { source: String, ast: FormulaExpr },
    /// A cell that could not be turned into a usable formula
    Error { code: ErrorCode, message: String },
}

impl Cell {
    /// A literal cell
    pub fn literal(value: impl Into<CellValue>) -> Self {
        Cell::Literal(value.into())
    }

    /// Parse formula text into a formula cell
    ///
    /// Text that does not parse becomes an error cell with code `PARSE`
    /// holding the parser's message; the failure never reaches the caller.
    pub fn formula(source: impl Into<String>) -> Self {
        let source = source.into();
        match parse_formula(&source) {
            Ok(ast) => Cell::Formula { source, ast },
            Err(e) => {
                tracing::debug!(%source, error = %e, "formula failed to parse");
                Cell::error(e.code(), e.to_string())
            }
        }
    }

    /// An error cell
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Cell::Error {
            code,
            message: message.into(),
        }
    }

    /// Check if this cell holds a formula
    pub fn is_formula(&self) -> bool {
        matches!(self, Cell::Formula { .. })
    }

    /// The parsed formula, if any
    pub fn ast(&self) -> Option<&FormulaExpr> {
        match self {
            Cell::Formula { ast, .. } => Some(ast),
            _ => None,
        }
    }

    /// The formula text, if any
    pub fn source(&self) -> Option<&str> {
        match self {
            Cell::Formula { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<CellValue> for Cell {
    fn from(value: CellValue) -> Self {
        Cell::Literal(value)
    }
}
