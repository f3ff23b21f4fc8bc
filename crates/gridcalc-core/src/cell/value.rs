//! Cell value types

use std::fmt;
use std::str::FromStr;

/// A scalar: the value a literal cell holds and the only valid final form of
/// a formula result
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum CellValue {
    /// Empty cell (no value)
    #[default]
    Empty,

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Numeric value
    Number(f64),

    /// String value
    String(String),
}

impl CellValue {
    /// Create a new string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(s.into())
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Get the value as a number, only if it is one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Boolean(_) => "boolean",
            CellValue::Number(_) => "number",
            CellValue::String(_) => "string",
        }
    }
}

/// Format a number the way a cell displays it: integral values without a
/// decimal point
fn format_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{}", n)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => format_number(*n, f),
            CellValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

/// Error codes surfaced for failing cells
///
/// These are the only error tokens visible outside the engine; their text
/// form (`CYCLE`, `REF`, `PARSE`, `DIV0`, `EVAL`) is part of the external
/// contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum ErrorCode {
    /// A chain of references closes back on itself
    Cycle,
    /// A reference points outside the sheet or at a malformed address
    Ref,
    /// Formula text does not match the grammar
    Parse,
    /// Division by exactly zero
    Div0,
    /// Type mismatch, wrong argument count, unknown function
    Eval,
}

impl ErrorCode {
    /// All codes, in declaration order
    pub const ALL: [ErrorCode; 5] = [
        ErrorCode::Cycle,
        ErrorCode::Ref,
        ErrorCode::Parse,
        ErrorCode::Div0,
        ErrorCode::Eval,
    ];

    /// Get the bare code (e.g. `DIV0`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Cycle => "CYCLE",
            ErrorCode::Ref => "REF",
            ErrorCode::Parse => "PARSE",
            ErrorCode::Div0 => "DIV0",
            ErrorCode::Eval => "EVAL",
        }
    }

    /// Get the display token (e.g. `#DIV0!`)
    pub fn token(&self) -> String {
        format!("#{}!", self.as_str())
    }

    /// Parse a display token such as `#REF!`
    pub fn from_token(s: &str) -> Option<Self> {
        s.strip_prefix('#')
            .and_then(|s| s.strip_suffix('!'))
            .and_then(|code| code.parse().ok())
    }
}

impl FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}!", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(CellValue::from(42), CellValue::Number(42.0));
        assert_eq!(CellValue::from(3.5), CellValue::Number(3.5));
        assert_eq!(CellValue::from(true), CellValue::Boolean(true));

        assert_eq!(CellValue::from("hello"), CellValue::String("hello".into()));
    }

    #[test]
    fn test_cell_value_as_number() {
        assert_eq!(CellValue::Number(42.0).as_number(), Some(42.0));
        assert_eq!(CellValue::Boolean(true).as_number(), None);
        assert_eq!(CellValue::string("12").as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);
    }

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::Number(7.0).to_string(), "7");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Boolean(false).to_string(), "FALSE");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::Div0.to_string(), "#DIV0!");
        assert_eq!(ErrorCode::Cycle.to_string(), "#CYCLE!");
        assert_eq!(ErrorCode::Parse.token(), "#PARSE!");
    }

    #[test]
    fn test_error_code_parse() {
        assert_eq!("REF".parse::<ErrorCode>(), Ok(ErrorCode::Ref));
        assert_eq!("eval".parse::<ErrorCode>(), Ok(ErrorCode::Eval));
        assert_eq!(ErrorCode::from_token("#DIV0!"), Some(ErrorCode::Div0));
        assert_eq!(ErrorCode::from_token("#VALUE!"), None);
        assert_eq!(ErrorCode::from_token("CYCLE"), None);
    }
}
