//! Run-level complexity score and run-wide counters

use sheetlens_model::{DependencyEdge, SheetSnapshot};
use std::collections::BTreeMap;

/// Upper bound of the run score
pub const MAX_RUN_SCORE: u8 = 100;

/// Formula counts per function tag across all sheets
#[must_use]
pub fn run_tag_counts(sheets: &[SheetSnapshot]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for sheet in sheets {
        for (tag, count) in &sheet.formula_type_counts {
            *counts.entry(tag.clone()).or_insert(0) += count;
        }
    }
    counts
}

/// Formula counts per category across all sheets
#[must_use]
pub fn run_category_counts(sheets: &[SheetSnapshot]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for formula in sheets.iter().flat_map(|s| &s.formulas) {
        *counts
            .entry(formula.category.as_str().to_string())
            .or_insert(0) += 1;
    }
    counts
}

/// `clamp(0, 100, formulas * 0.5 + distinct_tags * 2 + edges * 5)`
#[must_use]
pub fn run_complexity(sheets: &[SheetSnapshot], edges: &[DependencyEdge]) -> u8 {
    let formulas: usize = sheets.iter().map(SheetSnapshot::formula_count).sum();
    let distinct = run_tag_counts(sheets).len();
    let raw = formulas as f64 * 0.5 + distinct as f64 * 2.0 + edges.len() as f64 * 5.0;
    // Truncates toward zero after clamping
    raw.clamp(0.0, f64::from(MAX_RUN_SCORE)) as u8
}
