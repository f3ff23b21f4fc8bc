//! Sheet calculation
//!
//! Evaluates every formula on a sheet and summarizes the outcome.
//!
//! # Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut sheet = Sheet::new("s1", "Sheet1");
//! sheet.set(CellAddress::new(0, 0), Cell::literal(10.0)).unwrap();
//! sheet.set(CellAddress::new(0, 1), Cell::literal(20.0)).unwrap();
//! sheet.set(CellAddress::new(0, 2), Cell::formula("=A1+A2")).unwrap();
//!
//! // Calculate all formulas
//! let calculation = sheet.calculate();
//! assert_eq!(calculation.stats.cells_calculated, 1);
//! assert_eq!(calculation.stats.errors, 0);
//! ```

use crate::{Cell, CellAddress, ErrorCode, EvalResult, EvaluationOptions, Evaluator, Sheet};
use std::collections::BTreeMap;
use tracing::debug;

/// Options for sheet calculation
#[derive(Debug, Clone)]
pub struct CalculationOptions {
    /// Resolve references outside the sheet's extent to `#REF!` (default:
    /// true); when false they read as empty
    pub enforce_bounds: bool,
}

impl Default for CalculationOptions {
    fn default() -> Self {
        Self {
            enforce_bounds: true,
        }
    }
}

impl From<&CalculationOptions> for EvaluationOptions {
    fn from(options: &CalculationOptions) -> Self {
        EvaluationOptions {
            enforce_bounds: options.enforce_bounds,
        }
    }
}

/// Statistics from a calculation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationStats {
    /// Total number of formula cells
    pub formula_count: usize,
    /// Number of cells calculated
    pub cells_calculated: usize,
    /// Number of formula cells that evaluated to an error
    pub errors: usize,
    /// Number of formula cells caught in a circular reference
    pub circular_references: usize,
    /// Number of cells stored as errors because their formula did not parse
    pub parse_errors: usize,
}

/// Per-cell results of a calculation run plus its statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Calculation {
    /// Result for every formula cell, in row-major order
    pub results: BTreeMap<CellAddress, EvalResult>,
    pub stats: CalculationStats,
}

impl Calculation {
    /// The result for a formula cell
    pub fn get(&self, addr: CellAddress) -> Option<&EvalResult> {
        self.results.get(&addr)
    }

    /// Iterate over results that are errors
    pub fn errors(&self) -> impl Iterator<Item = (CellAddress, &EvalResult)> + '_ {
        self.results
            .iter()
            .filter(|(_, result)| result.is_error())
            .map(|(addr, result)| (*addr, result))
    }
}

/// Extension trait for Sheet to add calculation methods
pub trait SheetCalculationExt {
    /// Calculate all formulas on the sheet with default options
    fn calculate(&self) -> Calculation;

    /// Calculate all formulas with custom options
    fn calculate_with_options(&self, options: &CalculationOptions) -> Calculation;
}

impl SheetCalculationExt for Sheet {
    fn calculate(&self) -> Calculation {
        self.calculate_with_options(&CalculationOptions::default())
    }

    fn calculate_with_options(&self, options: &CalculationOptions) -> Calculation {
        let mut evaluator = Evaluator::with_options(options.into());
        let results = evaluator.evaluate_sheet(self);

        let mut stats = CalculationStats {
            formula_count: self.formula_cells().len(),
            cells_calculated: results.len(),
            parse_errors: self
                .iter()
                .filter(|(_, cell)| matches!(cell, Cell::Error { .. }))
                .count(),
            ..Default::default()
        };
        for result in results.values() {
            match result.code() {
                Some(ErrorCode::Cycle) => {
                    stats.errors += 1;
                    stats.circular_references += 1;
                }
                Some(_) => stats.errors += 1,
                None => {}
            }
        }

        debug!(
            sheet = self.id(),
            formulas = stats.formula_count,
            errors = stats.errors,
            cycles = stats.circular_references,
            "calculated sheet"
        );

        Calculation { results, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellValue;
    use pretty_assertions::assert_eq;

    fn addr(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    #[test]
    fn test_calculation_stats() {
        let mut sheet = Sheet::new("s", "S");
        sheet.set(addr("A1"), Cell::literal(4)).unwrap();
        sheet.set(addr("A2"), Cell::formula("=A1*A1")).unwrap();
        sheet.set(addr("A3"), Cell::formula("=A2/0")).unwrap();
        sheet.set(addr("B1"), Cell::formula("=B2")).unwrap();
        sheet.set(addr("B2"), Cell::formula("=B1")).unwrap();
        sheet.set(addr("C1"), Cell::formula("=(")).unwrap();

        let calculation = sheet.calculate();

        assert_eq!(
            calculation.stats,
            CalculationStats {
                formula_count: 4,
                cells_calculated: 4,
                errors: 3,
                circular_references: 2,
                parse_errors: 1,
            }
        );
        assert_eq!(
            calculation.get(addr("A2")),
            Some(&EvalResult::Value(CellValue::Number(16.0)))
        );
        assert_eq!(
            calculation.errors().map(|(addr, _)| addr).collect::<Vec<_>>(),
            vec![addr("B1"), addr("B2"), addr("A3")]
        );
    }

    #[test]
    fn test_calculate_with_options() {
        let mut sheet = Sheet::with_extent("s", "S", 3, 3);
        sheet.set(addr("A1"), Cell::formula("=D1+1")).unwrap();

        let strict = sheet.calculate();
        assert_eq!(
            strict.get(addr("A1")).and_then(EvalResult::code),
            Some(ErrorCode::Ref)
        );

        let lenient = sheet.calculate_with_options(&CalculationOptions {
            enforce_bounds: false,
        });
        assert_eq!(
            lenient.get(addr("A1")),
            Some(&EvalResult::Value(CellValue::Number(1.0)))
        );
    }
}
