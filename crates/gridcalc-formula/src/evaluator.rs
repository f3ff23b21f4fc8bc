//! Formula evaluator
//!
//! Evaluates formula ASTs against a sheet to produce values. Every failure
//! inside a formula is caught at the cell boundary and turned into an
//! [`EvalResult::Error`]; nothing escapes a sheet-wide evaluation.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::cell::Cell;
use crate::dependency::{extract_references_within, DependencyGraph};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::{logical::is_truthy, registry, FunctionKind};
use crate::sheet::Sheet;
use ahash::AHashSet;
use gridcalc_core::{CellAddress, CellRange, CellValue, ErrorCode};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, trace};

/// Value types during formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    /// A single value
    Scalar(CellValue),
    /// The values of a range, row-major; only valid as a function argument
    Range(Vec<CellValue>),
}

impl FormulaValue {
    /// Unwrap a scalar; a range in scalar position is an evaluation error
    pub fn into_scalar(self) -> FormulaResult<CellValue> {
        match self {
            FormulaValue::Scalar(value) => Ok(value),
            FormulaValue::Range(values) => Err(FormulaError::Evaluation(format!(
                "A range of {} cells cannot be used as a single value",
                values.len()
            ))),
        }
    }
}

impl From<CellValue> for FormulaValue {
    fn from(value: CellValue) -> Self {
        FormulaValue::Scalar(value)
    }
}

/// Evaluation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationOptions {
    /// Treat references outside the sheet's extent as `#REF!`; when off they
    /// read as empty
    pub enforce_bounds: bool,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            enforce_bounds: true,
        }
    }
}

/// Longest chain of cell references followed from one top-level cell
pub const MAX_REFERENCE_DEPTH: usize = 256;

/// State for one top-level cell evaluation
///
/// `visited` holds the chain of cells currently being resolved; it is never
/// shared between top-level cells.
pub struct EvaluationContext<'a> {
    sheet: &'a Sheet,
    visited: AHashSet<CellAddress>,
    /// Results already settled earlier in a sheet-wide pass
    computed: Option<&'a BTreeMap<CellAddress, EvalResult>>,
    options: EvaluationOptions,
}

impl<'a> EvaluationContext<'a> {
    /// Create a context for evaluating the formula at `current`
    pub fn new(sheet: &'a Sheet, current: CellAddress, options: EvaluationOptions) -> Self {
        let mut visited = AHashSet::new();
        visited.insert(current);
        Self {
            sheet,
            visited,
            computed: None,
            options,
        }
    }
}

/// Outcome of evaluating one cell
#[derive(Debug, Clone, PartialEq)]
pub enum EvalResult {
    Value(CellValue),
    Error { code: ErrorCode, message: String },
}

impl EvalResult {
    /// Check if this result is an error
    pub fn is_error(&self) -> bool {
        matches!(self, EvalResult::Error { .. })
    }

    /// The error code, if this is an error
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            EvalResult::Error { code, .. } => Some(*code),
            EvalResult::Value(_) => None,
        }
    }

    /// The value, if this is not an error
    pub fn value(&self) -> Option<&CellValue> {
        match self {
            EvalResult::Value(value) => Some(value),
            EvalResult::Error { .. } => None,
        }
    }
}

impl From<FormulaResult<CellValue>> for EvalResult {
    fn from(result: FormulaResult<CellValue>) -> Self {
        match result {
            Ok(value) => EvalResult::Value(value),
            Err(e) => EvalResult::Error {
                code: e.code(),
                message: e.to_string(),
            },
        }
    }
}

impl fmt::Display for EvalResult {
    /// The value as a cell shows it, or the error token (`#DIV0!`)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalResult::Value(value) => write!(f, "{}", value),
            EvalResult::Error { code, .. } => write!(f, "{}", code),
        }
    }
}

/// Sheet evaluator
///
/// Owns the dependency graph used to order evaluation. Two sheets evaluated
/// at the same time need two evaluators.
#[derive(Debug, Default)]
pub struct Evaluator {
    graph: DependencyGraph,
    options: EvaluationOptions,
}

impl Evaluator {
    /// Create an evaluator with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an evaluator with the given options
    pub fn with_options(options: EvaluationOptions) -> Self {
        Self {
            graph: DependencyGraph::new(),
            options,
        }
    }

    /// Evaluation settings
    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    /// The dependency graph as of the last registration
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Replace the recorded dependencies of the cell at `addr`
    ///
    /// Only references inside the sheet's extent are recorded; anything past
    /// it never holds a formula, so there is no order to respect.
    pub fn register_formula(&mut self, sheet: &Sheet, addr: CellAddress) {
        self.graph.remove_dependencies(addr);

        let Some(ast) = sheet.get(addr).and_then(Cell::ast) else {
            return;
        };
        for target in extract_references_within(ast, &sheet.extent()) {
            self.graph.add_dependency(addr, target);
        }
    }

    /// Forget the dependencies of a cleared or replaced cell
    pub fn unregister(&mut self, addr: CellAddress) {
        self.graph.remove_dependencies(addr);
    }

    /// Evaluate a single cell
    ///
    /// Missing cells are empty, literals are returned verbatim and error
    /// cells report their stored code.
    pub fn evaluate_cell(&self, sheet: &Sheet, addr: CellAddress) -> EvalResult {
        self.evaluate_cell_with(sheet, addr, None)
    }

    fn evaluate_cell_with(
        &self,
        sheet: &Sheet,
        addr: CellAddress,
        computed: Option<&BTreeMap<CellAddress, EvalResult>>,
    ) -> EvalResult {
        match sheet.get(addr) {
            None => EvalResult::Value(CellValue::Empty),
            Some(Cell::Literal(value)) => EvalResult::Value(value.clone()),
            Some(Cell::Error { code, message }) => EvalResult::Error {
                code: *code,
                message: message.clone(),
            },
            Some(Cell::Formula { ast, .. }) => {
                let mut ctx = EvaluationContext::new(sheet, addr, self.options);
                ctx.computed = computed;
                let result: EvalResult = evaluate(ast, &mut ctx)
                    .and_then(FormulaValue::into_scalar)
                    .into();

                match &result {
                    EvalResult::Error { code, message } => {
                        debug!(cell = %addr, %code, %message, "formula evaluated to an error");
                    }
                    EvalResult::Value(value) => trace!(cell = %addr, %value, "formula evaluated"),
                }
                result
            }
        }
    }

    /// Evaluate every formula cell in the sheet
    ///
    /// The dependency graph is rebuilt from the sheet's formulas first, so
    /// cells are visited after the cells they read and each one reuses the
    /// results of its precedents instead of walking them again.
    pub fn evaluate_sheet(&mut self, sheet: &Sheet) -> BTreeMap<CellAddress, EvalResult> {
        self.graph.clear();

        let formula_cells = sheet.formula_cells();
        for &addr in &formula_cells {
            self.register_formula(sheet, addr);
        }

        debug!(
            sheet = sheet.id(),
            formulas = formula_cells.len(),
            "evaluating sheet"
        );

        let mut results = BTreeMap::new();
        for addr in self.graph.evaluation_order(&formula_cells) {
            if sheet.get(addr).is_some_and(Cell::is_formula) {
                let result = self.evaluate_cell_with(sheet, addr, Some(&results));
                results.insert(addr, result);
            }
        }
        results
    }
}

/// Evaluate a formula expression
pub fn evaluate(
    expr: &FormulaExpr,
    ctx: &mut EvaluationContext<'_>,
) -> FormulaResult<FormulaValue> {
    match expr {
        // === Literals ===
        FormulaExpr::Number(n) => Ok(CellValue::Number(*n).into()),
        FormulaExpr::String(s) => Ok(CellValue::String(s.clone()).into()),
        FormulaExpr::Boolean(b) => Ok(CellValue::Boolean(*b).into()),

        // === References ===
        FormulaExpr::CellRef(reference) => {
            evaluate_cell_ref(reference.address, ctx).map(Into::into)
        }

        FormulaExpr::RangeRef(range) => evaluate_range(range.range(), ctx).map(FormulaValue::Range),

        FormulaExpr::RefError => Err(FormulaError::InvalidReference(
            "reference no longer points at a cell".into(),
        )),

        // === Operators ===
        FormulaExpr::BinaryOp { op, left, right } => {
            evaluate_binary_op(*op, left, right, ctx).map(Into::into)
        }

        FormulaExpr::UnaryOp { op, operand } => {
            evaluate_unary_op(*op, operand, ctx).map(Into::into)
        }

        // === Functions ===
        FormulaExpr::Function { name, args } => evaluate_function(name, args, ctx),
    }
}

/// Resolve the value of a referenced cell
fn evaluate_cell_ref(
    addr: CellAddress,
    ctx: &mut EvaluationContext<'_>,
) -> FormulaResult<CellValue> {
    let sheet = ctx.sheet;

    if !sheet.contains(addr) {
        if ctx.options.enforce_bounds {
            return Err(FormulaError::InvalidReference(format!(
                "{} is outside the sheet",
                addr
            )));
        }
        return Ok(CellValue::Empty);
    }

    if let Some(settled) = ctx.computed.and_then(|computed| computed.get(&addr)) {
        return match settled {
            EvalResult::Value(value) => Ok(value.clone()),
            EvalResult::Error { code, message } => Err(FormulaError::ReferencedError {
                address: addr,
                code: *code,
                message: message.clone(),
            }),
        };
    }

    if ctx.visited.contains(&addr) {
        return Err(FormulaError::CircularReference(addr));
    }
    if ctx.visited.len() >= MAX_REFERENCE_DEPTH {
        return Err(FormulaError::Evaluation(format!(
            "More than {} nested cell references",
            MAX_REFERENCE_DEPTH
        )));
    }
    ctx.visited.insert(addr);

    let result = match sheet.get(addr) {
        None => Ok(CellValue::Empty),
        Some(Cell::Literal(value)) => Ok(value.clone()),
        Some(Cell::Error { code, message }) => Err(FormulaError::ReferencedError {
            address: addr,
            code: *code,
            message: message.clone(),
        }),
        Some(Cell::Formula { ast, .. }) => evaluate(ast, ctx).and_then(FormulaValue::into_scalar),
    };

    // Leaving the chain lets a second path reach the same cell
    ctx.visited.remove(&addr);
    result
}

/// Resolve every cell of a range, row-major
///
/// With bounds enforced, a range reaching past the sheet is a `#REF!`.
/// Otherwise only the part inside the sheet is read: the rest is empty, and
/// every function skips empty cells.
fn evaluate_range(
    range: CellRange,
    ctx: &mut EvaluationContext<'_>,
) -> FormulaResult<Vec<CellValue>> {
    let inside = range.intersection(&ctx.sheet.extent());
    if ctx.options.enforce_bounds && inside != Some(range) {
        return Err(FormulaError::InvalidReference(format!(
            "{} reaches outside the sheet",
            range
        )));
    }

    match inside {
        Some(inside) => inside.cells().map(|addr| evaluate_cell_ref(addr, ctx)).collect(),
        None => Ok(Vec::new()),
    }
}

/// Numeric view of an operand; empty counts as 0
fn as_numeric(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) => Some(*n),
        CellValue::Empty => Some(0.0),
        _ => None,
    }
}

/// Evaluate a binary operation; both operands are always evaluated
fn evaluate_binary_op(
    op: BinaryOperator,
    left: &FormulaExpr,
    right: &FormulaExpr,
    ctx: &mut EvaluationContext<'_>,
) -> FormulaResult<CellValue> {
    let left_val = evaluate(left, ctx)?.into_scalar()?;
    let right_val = evaluate(right, ctx)?.into_scalar()?;
    apply_binary_op(op, &left_val, &right_val)
}

/// Apply a binary operator to two scalars
pub fn apply_binary_op(
    op: BinaryOperator,
    left: &CellValue,
    right: &CellValue,
) -> FormulaResult<CellValue> {
    if let (Some(l), Some(r)) = (as_numeric(left), as_numeric(right)) {
        return apply_numeric_op(op, l, r);
    }

    match op {
        BinaryOperator::Add
            if matches!(left, CellValue::String(_)) || matches!(right, CellValue::String(_)) =>
        {
            Ok(CellValue::String(format!("{}{}", left, right)))
        }
        BinaryOperator::Equal => Ok(CellValue::Boolean(left == right)),
        BinaryOperator::NotEqual => Ok(CellValue::Boolean(left != right)),
        _ => Err(FormulaError::Evaluation(format!(
            "Cannot apply '{}' to {} and {}",
            op,
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn apply_numeric_op(op: BinaryOperator, l: f64, r: f64) -> FormulaResult<CellValue> {
    let n = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide => {
            if r == 0.0 {
                return Err(FormulaError::DivisionByZero);
            }
            l / r
        }
        BinaryOperator::Power => l.powf(r),
        BinaryOperator::Equal => return Ok(CellValue::Boolean(l == r)),
        BinaryOperator::NotEqual => return Ok(CellValue::Boolean(l != r)),
        BinaryOperator::LessThan => return Ok(CellValue::Boolean(l < r)),
        BinaryOperator::LessEqual => return Ok(CellValue::Boolean(l <= r)),
        BinaryOperator::GreaterThan => return Ok(CellValue::Boolean(l > r)),
        BinaryOperator::GreaterEqual => return Ok(CellValue::Boolean(l >= r)),
    };

    if !n.is_finite() {
        return Err(FormulaError::Evaluation(format!(
            "{} {} {} is not a finite number",
            l, op, r
        )));
    }
    Ok(CellValue::Number(n))
}

/// Evaluate a unary operation
fn evaluate_unary_op(
    op: UnaryOperator,
    operand: &FormulaExpr,
    ctx: &mut EvaluationContext<'_>,
) -> FormulaResult<CellValue> {
    let value = evaluate(operand, ctx)?.into_scalar()?;

    match op {
        UnaryOperator::Negate => as_numeric(&value)
            .map(|n| CellValue::Number(-n))
            .ok_or_else(|| {
                FormulaError::Evaluation(format!("Cannot negate {}", value.type_name()))
            }),
    }
}

/// Evaluate a function call
fn evaluate_function(
    name: &str,
    args: &[FormulaExpr],
    ctx: &mut EvaluationContext<'_>,
) -> FormulaResult<FormulaValue> {
    let func = registry()
        .get(name)
        .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;

    func.check_arity(args.len())?;

    match func.kind {
        FunctionKind::Conditional => evaluate_if(func.name, args, ctx),
        FunctionKind::Eager(implementation) => {
            let mut evaluated_args = Vec::with_capacity(args.len());
            for arg in args {
                evaluated_args.push(evaluate(arg, ctx)?);
            }
            implementation(&evaluated_args)
        }
    }
}

/// `IF(condition, if_true, if_false)`: only the selected branch is evaluated
fn evaluate_if(
    name: &str,
    args: &[FormulaExpr],
    ctx: &mut EvaluationContext<'_>,
) -> FormulaResult<FormulaValue> {
    let [condition, if_true, if_false] = args else {
        return Err(FormulaError::ArgumentCount {
            function: name.to_string(),
            expected: "exactly 3".into(),
            actual: args.len(),
        });
    };

    let condition = evaluate(condition, ctx)?.into_scalar()?;
    let branch = if is_truthy(&condition) {
        if_true
    } else {
        if_false
    };
    evaluate(branch, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn addr(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    fn sheet(cells: &[(&str, Cell)]) -> Sheet {
        let mut sheet = Sheet::new("test", "Test");
        for (a1, cell) in cells {
            sheet.set(addr(a1), cell.clone()).unwrap();
        }
        sheet
    }

    /// Evaluate formula text in an otherwise empty sheet
    fn eval(formula: &str) -> EvalResult {
        let sheet = sheet(&[("Z100", Cell::formula(formula))]);
        Evaluator::new().evaluate_cell(&sheet, addr("Z100"))
    }

    fn number(n: f64) -> EvalResult {
        EvalResult::Value(CellValue::Number(n))
    }

    fn boolean(b: bool) -> EvalResult {
        EvalResult::Value(CellValue::Boolean(b))
    }

    #[test]
    fn test_evaluate_literals() {
        assert_eq!(eval("=42"), number(42.0));
        assert_eq!(eval("=\"hi\""), EvalResult::Value(CellValue::string("hi")));
        assert_eq!(eval("=FALSE"), boolean(false));
    }

    #[test]
    fn test_evaluate_arithmetic() {
        assert_eq!(eval("=1+2*3"), number(7.0));
        assert_eq!(eval("=(1+2)*3"), number(9.0));
        assert_eq!(eval("=10/4"), number(2.5));
        assert_eq!(eval("=8-3-2"), number(3.0));
        assert_eq!(eval("=2^3^2"), number(64.0));
        assert_eq!(eval("=-2^2"), number(4.0));
        assert_eq!(eval("=-(3-5)"), number(2.0));
    }

    #[test]
    fn test_evaluate_comparison() {
        assert_eq!(eval("=1<2"), boolean(true));
        assert_eq!(eval("=2<=1"), boolean(false));
        assert_eq!(eval("=3>=3"), boolean(true));
        assert_eq!(eval("=1<>1"), boolean(false));
        assert_eq!(eval("=1+1=2"), boolean(true));
        assert_eq!(eval("=\"a\"=\"a\""), boolean(true));
        assert_eq!(eval("=\"a\"<>1"), boolean(true));
    }

    #[test]
    fn test_evaluate_concatenation() {
        assert_eq!(
            eval("=\"Total: \"+3"),
            EvalResult::Value(CellValue::string("Total: 3"))
        );
        assert_eq!(
            eval("=1.5+\"x\""),
            EvalResult::Value(CellValue::string("1.5x"))
        );
    }

    #[test]
    fn test_evaluate_type_errors() {
        assert_eq!(eval("=\"a\"-1").code(), Some(ErrorCode::Eval));
        assert_eq!(eval("=\"a\"<\"b\"").code(), Some(ErrorCode::Eval));
        assert_eq!(eval("=TRUE+1").code(), Some(ErrorCode::Eval));
        assert_eq!(eval("=-\"a\"").code(), Some(ErrorCode::Eval));
    }

    #[test]
    fn test_evaluate_division_by_zero() {
        assert_eq!(eval("=1/0").code(), Some(ErrorCode::Div0));
        assert_eq!(eval("=1/(2-2)").code(), Some(ErrorCode::Div0));
        assert_eq!(eval("=0^-1").code(), Some(ErrorCode::Eval));
    }

    #[test]
    fn test_evaluate_functions() {
        assert_eq!(eval("=SUM(1,2,3)"), number(6.0));
        assert_eq!(eval("=AVG(2,4)"), number(3.0));
        assert_eq!(eval("=average(2,4,9)"), number(5.0));
        assert_eq!(eval("=MIN(3,1,2)"), number(1.0));
        assert_eq!(eval("=MAX(3,1,2)"), number(3.0));
        assert_eq!(eval("=MAX(\"a\")"), number(0.0));
        assert_eq!(eval("=COUNT(1,\"a\",TRUE)"), number(3.0));
        assert_eq!(eval("=SUM(1,MAX(2,5))*2"), number(12.0));
        assert_eq!(eval("=SUM()"), number(0.0));
        assert_eq!(eval("=MIN()"), number(0.0));
        assert_eq!(eval("=SUM(10^308,10^308)").code(), Some(ErrorCode::Eval));
    }

    #[test]
    fn test_evaluate_function_errors() {
        let unknown = eval("=UNKNOWN()");
        assert_eq!(unknown.code(), Some(ErrorCode::Eval));
        assert!(
            matches!(&unknown, EvalResult::Error { message, .. } if message.contains("UNKNOWN"))
        );

        assert_eq!(eval("=IF(1,2)").code(), Some(ErrorCode::Eval));
    }

    #[test]
    fn test_evaluate_if() {
        assert_eq!(
            eval("=IF(1>0,\"yes\",\"no\")"),
            EvalResult::Value(CellValue::string("yes"))
        );
        assert_eq!(eval("=IF(0,1,2)"), number(2.0));
        assert_eq!(eval("=IF(\"\",1,2)"), number(2.0));
        assert_eq!(eval("=IF(A1,1,2)"), number(2.0));
        assert_eq!(eval("=IF(\"x\",1,2)"), number(1.0));
    }

    #[test]
    fn test_if_evaluates_only_selected_branch() {
        assert_eq!(eval("=IF(TRUE,1,1/0)"), number(1.0));
        assert_eq!(eval("=IF(FALSE,UNKNOWN(),2)"), number(2.0));
        assert_eq!(eval("=IF(TRUE,1/0,2)").code(), Some(ErrorCode::Div0));
    }

    #[test]
    fn test_references() {
        let sheet = sheet(&[
            ("A1", Cell::literal(10)),
            ("A2", Cell::literal("text")),
            ("B1", Cell::formula("=A1*2")),
            ("B2", Cell::formula("=B1+A3")),
        ]);
        let evaluator = Evaluator::new();
        assert_eq!(evaluator.evaluate_cell(&sheet, addr("B2")), number(20.0));
        assert_eq!(
            evaluator.evaluate_cell(&sheet, addr("A2")),
            EvalResult::Value(CellValue::string("text"))
        );
        assert_eq!(
            evaluator.evaluate_cell(&sheet, addr("C9")),
            EvalResult::Value(CellValue::Empty)
        );
    }

    #[test]
    fn test_range_functions() {
        let sheet = sheet(&[
            ("A1", Cell::literal(1)),
            ("A2", Cell::literal("skip")),
            ("A3", Cell::literal(3)),
            ("B1", Cell::formula("=A1+1")),
            ("C1", Cell::formula("=SUM(A1:B3)")),
            ("C2", Cell::formula("=COUNT(A1:B3)")),
            ("C3", Cell::formula("=A1:A3")),
        ]);
        let evaluator = Evaluator::new();
        assert_eq!(evaluator.evaluate_cell(&sheet, addr("C1")), number(6.0));
        assert_eq!(evaluator.evaluate_cell(&sheet, addr("C2")), number(4.0));
        assert_eq!(
            evaluator.evaluate_cell(&sheet, addr("C3")).code(),
            Some(ErrorCode::Eval)
        );
    }

    #[test]
    fn test_cycles() {
        let sheet = sheet(&[
            ("A1", Cell::formula("=B1")),
            ("B1", Cell::formula("=A1+1")),
            ("C1", Cell::formula("=C1")),
            ("D1", Cell::formula("=SUM(D1:D2)")),
        ]);
        let evaluator = Evaluator::new();
        for cell in ["A1", "B1", "C1", "D1"] {
            assert_eq!(
                evaluator.evaluate_cell(&sheet, addr(cell)).code(),
                Some(ErrorCode::Cycle),
                "{cell}"
            );
        }
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let sheet = sheet(&[
            ("A1", Cell::literal(2)),
            ("B1", Cell::formula("=A1*10")),
            ("C1", Cell::formula("=A1+1")),
            ("D1", Cell::formula("=B1+C1+A1")),
        ]);
        let evaluator = Evaluator::new();
        assert_eq!(evaluator.evaluate_cell(&sheet, addr("D1")), number(25.0));
    }

    #[test]
    fn test_errors_propagate_with_their_code() {
        let sheet = sheet(&[
            ("A1", Cell::formula("=(1")),
            ("A2", Cell::formula("=A1+1")),
            ("B1", Cell::formula("=1/0")),
            ("B2", Cell::formula("=SUM(B1, 5)")),
        ]);
        let evaluator = Evaluator::new();
        assert_eq!(
            evaluator.evaluate_cell(&sheet, addr("A1")).code(),
            Some(ErrorCode::Parse)
        );
        assert_eq!(
            evaluator.evaluate_cell(&sheet, addr("A2")).code(),
            Some(ErrorCode::Parse)
        );
        assert_eq!(
            evaluator.evaluate_cell(&sheet, addr("B2")).code(),
            Some(ErrorCode::Div0)
        );
    }

    #[test]
    fn test_references_outside_the_sheet() {
        let mut small = Sheet::with_extent("s", "Small", 5, 2);
        small.set(addr("A1"), Cell::formula("=C1")).unwrap();
        small.set(addr("A2"), Cell::formula("=SUM(A1:A10)")).unwrap();
        small.set(addr("B1"), Cell::formula("=#REF!+1")).unwrap();

        let strict = Evaluator::new();
        for cell in ["A1", "A2", "B1"] {
            assert_eq!(
                strict.evaluate_cell(&small, addr(cell)).code(),
                Some(ErrorCode::Ref),
                "{cell}"
            );
        }

        let lenient = Evaluator::with_options(EvaluationOptions {
            enforce_bounds: false,
        });
        assert_eq!(
            lenient.evaluate_cell(&small, addr("A1")),
            EvalResult::Value(CellValue::Empty)
        );
        assert_eq!(
            lenient.evaluate_cell(&small, addr("B1")).code(),
            Some(ErrorCode::Ref)
        );
    }

    #[test]
    fn test_evaluate_sheet() {
        let sheet = sheet(&[
            ("A1", Cell::literal(1)),
            ("A3", Cell::formula("=A2+1")),
            ("A2", Cell::formula("=A1+1")),
            ("B1", Cell::formula("=B2")),
            ("B2", Cell::formula("=B1")),
        ]);
        let mut evaluator = Evaluator::new();
        let results = evaluator.evaluate_sheet(&sheet);

        assert_eq!(results.len(), 4);
        assert_eq!(results[&addr("A2")], number(2.0));
        assert_eq!(results[&addr("A3")], number(3.0));
        assert_eq!(results[&addr("B1")].code(), Some(ErrorCode::Cycle));
        assert!(!results.contains_key(&addr("A1")));

        assert!(evaluator.graph().dependencies(addr("A3")).any(|c| c == addr("A2")));

        // Evaluation does not change the sheet, so a second pass agrees
        assert_eq!(evaluator.evaluate_sheet(&sheet), results);
    }

    /// `A1` holds 1 and every later row adds one to the row above
    fn chain(rows: u32) -> Sheet {
        let mut sheet = Sheet::with_extent("chain", "Chain", rows, 1);
        sheet.set(CellAddress::new(0, 0), Cell::literal(1)).unwrap();
        for row in 1..rows {
            let cell = Cell::formula(format!("=A{}+1", row));
            sheet.set(CellAddress::new(0, row), cell).unwrap();
        }
        sheet
    }

    #[test]
    fn test_long_chains() {
        let sheet = chain(30_000);
        let results = Evaluator::new().evaluate_sheet(&sheet);
        assert_eq!(results.len(), 29_999);
        assert_eq!(results[&addr("A30000")], number(30_000.0));

        let short = chain(MAX_REFERENCE_DEPTH as u32 - 1);
        let last = CellAddress::new(0, MAX_REFERENCE_DEPTH as u32 - 2);
        assert_eq!(
            Evaluator::new().evaluate_cell(&short, last),
            number(MAX_REFERENCE_DEPTH as f64 - 1.0)
        );
    }

    #[test]
    fn test_reference_depth_limit() {
        let sheet = chain(MAX_REFERENCE_DEPTH as u32 + 10);
        let last = CellAddress::new(0, MAX_REFERENCE_DEPTH as u32 + 9);

        let result = Evaluator::new().evaluate_cell(&sheet, last);
        assert_eq!(result.code(), Some(ErrorCode::Eval));

        // A sheet-wide pass reuses settled results and never goes deep
        let results = Evaluator::new().evaluate_sheet(&sheet);
        assert_eq!(results[&last], number(MAX_REFERENCE_DEPTH as f64 + 10.0));
    }

    #[test]
    fn test_whole_column_range() {
        let mut sheet = sheet(&[
            ("B1", Cell::literal(2)),
            ("B1000", Cell::literal(3)),
            ("A1", Cell::formula("=SUM(B1:B1048576)")),
            ("A2", Cell::formula("=SUM(B1:B1000)")),
            ("A3", Cell::formula("=COUNT(A1:XFD1048576)")),
        ]);
        sheet.set(addr("C1"), Cell::formula("=SUM(C2:C1048576)")).unwrap();

        let mut strict = Evaluator::new();
        let results = strict.evaluate_sheet(&sheet);
        assert_eq!(results[&addr("A1")].code(), Some(ErrorCode::Ref));
        assert_eq!(results[&addr("A2")], number(5.0));
        assert_eq!(results[&addr("A3")].code(), Some(ErrorCode::Ref));
        assert_eq!(strict.graph().dependencies(addr("A1")).count(), 1000);
        assert_eq!(strict.graph().dependencies(addr("A3")).count(), 26_000);

        let mut lenient = Evaluator::with_options(EvaluationOptions {
            enforce_bounds: false,
        });
        let results = lenient.evaluate_sheet(&sheet);
        assert_eq!(results[&addr("A1")], number(5.0));
        assert_eq!(results[&addr("C1")], number(0.0));
        // The clipped range still covers A3 itself
        assert_eq!(results[&addr("A3")].code(), Some(ErrorCode::Cycle));
    }

    #[test]
    fn test_eval_result_display() {
        assert_eq!(number(3.0).to_string(), "3");
        assert_eq!(eval("=1/0").to_string(), "#DIV0!");
        assert_eq!(EvalResult::Value(CellValue::Empty).to_string(), "");
    }
}
