//! Built-in functions

pub mod logical;
pub mod math;

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::FormulaValue;
use ahash::AHashMap;
use gridcalc_core::CellValue;
use std::sync::OnceLock;

/// Function implementation signature
///
/// Arguments arrive fully evaluated; a range argument is a flat list of the
/// scalars it covers.
pub type FunctionImpl = fn(&[FormulaValue]) -> FormulaResult<FormulaValue>;

/// How a function's arguments are evaluated
#[derive(Clone, Copy)]
pub enum FunctionKind {
    /// Every argument is evaluated up front and handed to the implementation
    Eager(FunctionImpl),
    /// `IF`: the condition is evaluated first and only the selected branch
    /// after it
    Conditional,
}

/// Function definition
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub kind: FunctionKind,
}

impl FunctionDef {
    /// Fail with an argument-count error unless `count` arguments fit
    pub fn check_arity(&self, count: usize) -> FormulaResult<()> {
        let expected = match self.max_args {
            Some(max) if max == self.min_args && count != max => format!("exactly {}", max),
            Some(max) if count > max => format!("at most {}", max),
            _ if count < self.min_args => format!("at least {}", self.min_args),
            _ => return Ok(()),
        };

        Err(FormulaError::ArgumentCount {
            function: self.name.to_string(),
            expected,
            actual: count,
        })
    }
}

/// Function registry
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

/// The shared registry of built-in functions
pub fn registry() -> &'static FunctionRegistry {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new)
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
        };

        registry.register_math_functions();
        registry.register_logical_functions();

        registry
    }

    /// Look up a function by name, case-insensitively
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_ascii_uppercase())
    }

    /// Register a function
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_ascii_uppercase(), def);
    }

    /// Names of every registered function, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.values().map(|def| def.name).collect();
        names.sort_unstable();
        names
    }

    fn register_aggregate(&mut self, name: &'static str, implementation: FunctionImpl) {
        self.register(FunctionDef {
            name,
            min_args: 0,
            max_args: None,
            kind: FunctionKind::Eager(implementation),
        });
    }

    fn register_math_functions(&mut self) {
        self.register_aggregate("SUM", math::fn_sum);
        self.register_aggregate("AVERAGE", math::fn_average);
        self.register_aggregate("AVG", math::fn_average);
        self.register_aggregate("MIN", math::fn_min);
        self.register_aggregate("MAX", math::fn_max);
        self.register_aggregate("COUNT", math::fn_count);
    }

    fn register_logical_functions(&mut self) {
        // IF
        self.register(FunctionDef {
            name: "IF",
            min_args: 3,
            max_args: Some(3),
            kind: FunctionKind::Conditional,
        });
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Every scalar in the arguments, with ranges flattened
pub(crate) fn flatten(args: &[FormulaValue]) -> impl Iterator<Item = &CellValue> + '_ {
    args.iter().flat_map(|arg| match arg {
        FormulaValue::Scalar(value) => std::slice::from_ref(value).iter(),
        FormulaValue::Range(values) => values.iter(),
    })
}

/// Every numeric scalar in the arguments; everything else is skipped
pub(crate) fn numbers(args: &[FormulaValue]) -> impl Iterator<Item = f64> + '_ {
    flatten(args).filter_map(|value| value.as_number())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_registry_lookup_is_case_insensitive() {
        let registry = registry();
        assert_eq!(registry.get("sum").map(|def| def.name), Some("SUM"));
        assert_eq!(registry.get("Avg").map(|def| def.name), Some("AVG"));
        assert!(registry.get("VLOOKUP").is_none());
    }

    #[test]
    fn test_registry_names() {
        assert_eq!(
            registry().names(),
            vec!["AVERAGE", "AVG", "COUNT", "IF", "MAX", "MIN", "SUM"]
        );
    }

    #[test]
    fn test_check_arity() {
        let registry = registry();
        let if_def = registry.get("IF").unwrap();
        assert!(if_def.check_arity(3).is_ok());
        assert_eq!(
            if_def.check_arity(2).unwrap_err().to_string(),
            "Wrong number of arguments for IF: expected exactly 3, got 2"
        );

        let sum = registry.get("SUM").unwrap();
        assert!(sum.check_arity(30).is_ok());
        assert!(sum.check_arity(0).is_ok());

        let bounded = FunctionDef {
            name: "PAIR",
            min_args: 1,
            max_args: Some(2),
            kind: FunctionKind::Conditional,
        };
        assert!(matches!(
            bounded.check_arity(0),
            Err(FormulaError::ArgumentCount { actual: 0, .. })
        ));
        assert_eq!(
            bounded.check_arity(3).unwrap_err().to_string(),
            "Wrong number of arguments for PAIR: expected at most 2, got 3"
        );
    }
}
