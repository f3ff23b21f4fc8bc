//! Textual reference rewriting
//!
//! Copying a formula to another cell and inserting or deleting rows and
//! columns both come down to rewriting every reference token in the formula
//! text. References inside string literals are left alone, and a reference
//! that would fall off the sheet becomes `#REF!`.

use gridcalc_core::{adjust_range, adjust_reference, CellAddress, CellReference, StructuralEdit};
use lazy_regex::regex;
use regex::Captures;
use std::borrow::Cow;

/// Rewrite every reference (or `A1:B2` range) in `formula`
///
/// `single` maps a lone reference and `range` both ends of a range. A
/// reference or range that maps to `None` is replaced by a single `#REF!`.
fn rewrite_references<'t>(
    formula: &'t str,
    mut single: impl FnMut(CellReference) -> Option<CellReference>,
    mut range: impl FnMut(CellReference, CellReference) -> Option<(CellReference, CellReference)>,
) -> Cow<'t, str> {
    let token_re = regex!(
        r#""[^"]*"|(\$?[A-Za-z]+\$?[0-9]+)(?::(\$?[A-Za-z]+\$?[0-9]+))?"#
    );

    token_re.replace_all(formula, |caps: &Captures| {
        let whole = &caps[0];
        let Some(start) = caps.get(1) else {
            // String literal
            return whole.to_string();
        };

        // Tokens that only look like references are kept as written
        let Ok(start) = CellReference::parse(start.as_str()) else {
            return whole.to_string();
        };
        let end = match caps.get(2).map(|end| CellReference::parse(end.as_str())) {
            Some(Err(_)) => return whole.to_string(),
            Some(Ok(end)) => Some(end),
            None => None,
        };

        let rewritten = match end {
            None => single(start).map(|start| start.to_a1_string()),
            Some(end) => range(start, end).map(|(start, end)| format!("{}:{}", start, end)),
        };
        rewritten.unwrap_or_else(|| "#REF!".to_string())
    })
}

/// Rewrite a formula copied from `from` so it reads correctly at `to`
///
/// Relative axes move by the column/row distance between the two cells;
/// fixed (`$`) axes stay put.
///
/// # Example
/// ```rust
/// use gridcalc_core::CellAddress;
/// use gridcalc_formula::translate_formula;
///
/// let from = CellAddress::parse("A1").unwrap();
/// let to = CellAddress::parse("B3").unwrap();
/// assert_eq!(translate_formula("=A1+$A$1+A$2", from, to), "=B3+$A$1+B$2");
/// ```
pub fn translate_formula(formula: &str, from: CellAddress, to: CellAddress) -> String {
    let col_delta = i64::from(to.col) - i64::from(from.col);
    let row_delta = i64::from(to.row) - i64::from(from.row);

    let shift = |reference: CellReference| {
        if reference.is_fully_fixed() {
            Some(reference)
        } else {
            reference.offset(col_delta, row_delta)
        }
    };

    rewrite_references(formula, shift, |start, end| Some((shift(start)?, shift(end)?)))
        .into_owned()
}

/// Rewrite a formula after a row or column is inserted or deleted
///
/// A reference to a deleted row or column becomes `#REF!`; a range loses the
/// deleted line and only becomes `#REF!` when nothing of it is left.
pub fn adjust_formula(formula: &str, edit: StructuralEdit) -> String {
    rewrite_references(
        formula,
        |reference| adjust_reference(&reference, edit),
        |start, end| adjust_range(&start, &end, edit),
    )
    .into_owned()
}
