//! Formula error types

use gridcalc_core::{CellAddress, ErrorCode};
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Formula text that does not match the grammar
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message} (at {token})")]
pub struct ParseError {
    /// What the parser expected or rejected
    pub message: String,
    /// The offending token, as text
    pub token: String,
}

impl ParseError {
    /// Create a parse error for the given token
    pub fn new(message: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            token: token.into(),
        }
    }
}

/// Errors that can occur during formula parsing or evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Circular reference
    #[error("Circular reference detected at {0}")]
    CircularReference(CellAddress),

    /// Division by exactly zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Reference to invalid cell
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// A referenced cell holds an error
    #[error("Cell {address} has error {code}: {message}")]
    ReferencedError {
        address: CellAddress,
        code: ErrorCode,
        message: String,
    },

    /// Formula evaluation error
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },
}

impl FormulaError {
    /// The external error code this failure is reported as
    pub fn code(&self) -> ErrorCode {
        match self {
            FormulaError::Parse(_) => ErrorCode::Parse,
            FormulaError::CircularReference(_) => ErrorCode::Cycle,
            FormulaError::DivisionByZero => ErrorCode::Div0,
            FormulaError::InvalidReference(_) => ErrorCode::Ref,
            FormulaError::ReferencedError { code, .. } => *code,
            FormulaError::Evaluation(_)
            | FormulaError::UnknownFunction(_)
            | FormulaError::ArgumentCount { .. } => ErrorCode::Eval,
        }
    }
}
