//! Dependency tracking for formula calculation

use crate::ast::FormulaExpr;
use ahash::{AHashMap, AHashSet};
use gridcalc_core::{CellAddress, CellRange};

/// Dependency graph for formula cells
///
/// Tracks which cells read which other cells so evaluation can visit
/// precedents before the cells that read them. Both directions are kept in
/// step: `b` is in `depends_on[a]` exactly when `a` is in `depended_on_by[b]`.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Cell → cells it reads (precedents)
    depends_on: AHashMap<CellAddress, AHashSet<CellAddress>>,
    /// Cell → cells that read it (dependents)
    depended_on_by: AHashMap<CellAddress, AHashSet<CellAddress>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `from` reads `to`
    pub fn add_dependency(&mut self, from: CellAddress, to: CellAddress) {
        self.depends_on.entry(from).or_default().insert(to);
        self.depended_on_by.entry(to).or_default().insert(from);
    }

    /// Remove every edge sourced from `cell`
    ///
    /// Edges where `cell` is the target are left alone: other formulas still
    /// read it.
    pub fn remove_dependencies(&mut self, cell: CellAddress) {
        let Some(targets) = self.depends_on.remove(&cell) else {
            return;
        };

        for target in targets {
            if let Some(readers) = self.depended_on_by.get_mut(&target) {
                readers.remove(&cell);
                if readers.is_empty() {
                    self.depended_on_by.remove(&target);
                }
            }
        }
    }

    /// Cells that `cell` reads
    pub fn dependencies(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.depends_on
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Cells that read `cell`
    pub fn dependents(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.depended_on_by
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Whether adding the edge `from → to` would close a cycle
    pub fn has_cycle(&self, from: CellAddress, to: CellAddress) -> bool {
        if from == to {
            return true;
        }

        let mut visited = AHashSet::new();
        let mut stack = vec![to];

        while let Some(cell) = stack.pop() {
            if cell == from {
                return true;
            }
            if !visited.insert(cell) {
                continue;
            }
            stack.extend(self.dependencies(cell).filter(|dep| !visited.contains(dep)));
        }

        false
    }

    /// Order `cells` so that every cell comes after the cells it reads
    ///
    /// Post-order depth-first traversal over the read edges, with an explicit
    /// stack so long chains cannot exhaust the call stack. Precedents that
    /// are reachable but not requested are included too; callers filter the
    /// result down to the cells they care about. Cycles do not fail here:
    /// a back edge is skipped and the evaluator reports the cycle when it
    /// walks it.
    pub fn evaluation_order(&self, cells: &[CellAddress]) -> Vec<CellAddress> {
        let mut result = Vec::new();
        let mut visited = AHashSet::new();
        let mut in_stack = AHashSet::new();
        let mut stack = Vec::new();

        for &root in cells {
            if visited.contains(&root) {
                continue;
            }
            in_stack.insert(root);
            stack.push(self.frame(root));

            while let Some(frame) = stack.last_mut() {
                match frame.deps.get(frame.next).copied() {
                    Some(dep) => {
                        frame.next += 1;
                        if !visited.contains(&dep) && in_stack.insert(dep) {
                            stack.push(self.frame(dep));
                        }
                    }
                    None => {
                        let cell = frame.cell;
                        stack.pop();
                        in_stack.remove(&cell);
                        visited.insert(cell);
                        result.push(cell);
                    }
                }
            }
        }

        result
    }

    fn frame(&self, cell: CellAddress) -> Frame {
        // Sorted so the order does not depend on hash iteration
        let mut deps: Vec<_> = self.dependencies(cell).collect();
        deps.sort_unstable();
        Frame {
            cell,
            deps,
            next: 0,
        }
    }

    /// Clear the entire graph
    pub fn clear(&mut self) {
        self.depends_on.clear();
        self.depended_on_by.clear();
    }

    /// Whether the graph has no edges
    pub fn is_empty(&self) -> bool {
        self.depends_on.is_empty()
    }
}

/// A cell whose precedents are being walked
struct Frame {
    cell: CellAddress,
    deps: Vec<CellAddress>,
    next: usize,
}

/// Every address a formula reads, with ranges expanded, in first-seen order
pub fn extract_references(expr: &FormulaExpr) -> Vec<CellAddress> {
    collect_unique(expr, None)
}

/// Like [`extract_references`], but only the addresses inside `extent`
///
/// Ranges are clipped before they are expanded, so a whole-column range
/// costs no more than the rows the sheet actually has.
pub fn extract_references_within(expr: &FormulaExpr, extent: &CellRange) -> Vec<CellAddress> {
    collect_unique(expr, Some(extent))
}

fn collect_unique(expr: &FormulaExpr, extent: Option<&CellRange>) -> Vec<CellAddress> {
    let mut seen = AHashSet::new();
    let mut refs = Vec::new();
    collect_references(expr, extent, &mut |addr| {
        if seen.insert(addr) {
            refs.push(addr);
        }
    });
    refs
}

fn collect_references(
    expr: &FormulaExpr,
    extent: Option<&CellRange>,
    out: &mut impl FnMut(CellAddress),
) {
    match expr {
        FormulaExpr::Number(_)
        | FormulaExpr::String(_)
        | FormulaExpr::Boolean(_)
        | FormulaExpr::RefError => {}
        FormulaExpr::CellRef(reference) => {
            if extent.map_or(true, |extent| extent.contains(&reference.address)) {
                out(reference.address);
            }
        }
        FormulaExpr::RangeRef(range) => {
            let range = match extent {
                Some(extent) => range.range().intersection(extent),
                None => Some(range.range()),
            };
            if let Some(range) = range {
                range.cells().for_each(&mut *out);
            }
        }
        FormulaExpr::BinaryOp { left, right, .. } => {
            collect_references(left, extent, out);
            collect_references(right, extent, out);
        }
        FormulaExpr::UnaryOp { operand, .. } => collect_references(operand, extent, out),
        FormulaExpr::Function { args, .. } => {
            for arg in args {
                collect_references(arg, extent, out);
            }
        }
    }
}
