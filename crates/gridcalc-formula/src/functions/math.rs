//! Math functions
//!
//! All of these skip non-numeric operands, inside ranges or not.

use super::{flatten, numbers};
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::FormulaValue;
use gridcalc_core::CellValue;

/// Wrap a result, failing if it overflowed
fn number(n: f64) -> FormulaResult<FormulaValue> {
    if !n.is_finite() {
        return Err(FormulaError::Evaluation(format!("{} is not a finite number", n)));
    }
    Ok(FormulaValue::Scalar(CellValue::Number(n)))
}

/// SUM function
pub fn fn_sum(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    number(numbers(args).sum())
}

/// AVERAGE / AVG function; 0 when there is nothing to average
pub fn fn_average(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let (sum, count) = numbers(args).fold((0.0, 0usize), |(sum, count), n| (sum + n, count + 1));

    if count == 0 {
        number(0.0)
    } else {
        number(sum / count as f64)
    }
}

/// MIN function; 0 when there are no numbers
pub fn fn_min(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    number(numbers(args).reduce(f64::min).unwrap_or(0.0))
}

/// MAX function; 0 when there are no numbers
pub fn fn_max(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    number(numbers(args).reduce(f64::max).unwrap_or(0.0))
}

/// COUNT function: non-empty scalars of any type
pub fn fn_count(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    number(flatten(args).filter(|value| !value.is_empty()).count() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args() -> Vec<FormulaValue> {
        vec![
            FormulaValue::Scalar(CellValue::Number(4.0)),
            FormulaValue::Range(vec![
                CellValue::Number(-2.0),
                CellValue::string("7"),
                CellValue::Empty,
                CellValue::Boolean(true),
                CellValue::Number(10.0),
            ]),
        ]
    }

    fn scalar(result: FormulaResult<FormulaValue>) -> CellValue {
        match result.unwrap() {
            FormulaValue::Scalar(value) => value,
            other => panic!("expected a scalar, got {other:?}"),
        }
    }

    #[test]
    fn test_sum_skips_non_numbers() {
        assert_eq!(scalar(fn_sum(&args())), CellValue::Number(12.0));
    }

    #[test]
    fn test_average() {
        assert_eq!(scalar(fn_average(&args())), CellValue::Number(4.0));
        let text = [FormulaValue::Scalar(CellValue::string("x"))];
        assert_eq!(scalar(fn_average(&text)), CellValue::Number(0.0));
    }

    #[test]
    fn test_min_max() {
        assert_eq!(scalar(fn_min(&args())), CellValue::Number(-2.0));
        assert_eq!(scalar(fn_max(&args())), CellValue::Number(10.0));

        let empty = [FormulaValue::Range(vec![CellValue::Empty, CellValue::string("a")])];
        assert_eq!(scalar(fn_min(&empty)), CellValue::Number(0.0));
        assert_eq!(scalar(fn_max(&empty)), CellValue::Number(0.0));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let huge = [
            FormulaValue::Scalar(CellValue::Number(f64::MAX)),
            FormulaValue::Range(vec![CellValue::Number(f64::MAX)]),
        ];
        assert!(matches!(fn_sum(&huge), Err(FormulaError::Evaluation(_))));
        assert!(matches!(fn_average(&huge), Err(FormulaError::Evaluation(_))));
        assert_eq!(scalar(fn_max(&huge)), CellValue::Number(f64::MAX));
    }

    #[test]
    fn test_no_arguments() {
        assert_eq!(scalar(fn_sum(&[])), CellValue::Number(0.0));
        assert_eq!(scalar(fn_min(&[])), CellValue::Number(0.0));
        assert_eq!(scalar(fn_count(&[])), CellValue::Number(0.0));
    }

    #[test]
    fn test_count_counts_non_empty_scalars() {
        assert_eq!(scalar(fn_count(&args())), CellValue::Number(5.0));
    }
}
