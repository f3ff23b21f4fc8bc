//! Logical functions

use gridcalc_core::CellValue;

/// Truthiness of an `IF` condition
///
/// Empty, `0`, `""` and `FALSE` are false; everything else is true.
pub fn is_truthy(value: &CellValue) -> bool {
    match value {
        CellValue::Empty => false,
        CellValue::Boolean(b) => *b,
        CellValue::Number(n) => *n != 0.0,
        CellValue::String(s) => !s.is_empty(),
    }
}
