//! Function tag extraction and complexity scoring
//!
//! The score is additive over independent regex counts:
//!
//! | signal                                   | weight |
//! |------------------------------------------|--------|
//! | base                                     | 1      |
//! | `NAME(` occurrence, leading one included | +2     |
//! | `AND` / `OR` / `NOT` / `IF` keyword      | +1     |
//! | `A1:B2` style range                      | +1     |
//! | `Sheet!` / `'Sheet Name'!` qualifier     | +2     |
//!
//! clamped to `1..=10`. Signals overlap (`IF(` counts both as a call and as
//! a keyword); the overlap is part of the scoring contract.

use crate::category::detect_category;
use crate::references::SHEET_QUALIFIER;
use once_cell::sync::Lazy;
use regex::Regex;
use sheetlens_model::{CellLocation, FormulaCategory, FormulaRecord};

/// Tag for formulas without a recognizable leading function
pub const CUSTOM_TAG: &str = "CUSTOM";

/// Lowest possible complexity score
pub const MIN_COMPLEXITY: u8 = 1;

/// Highest possible complexity score
pub const MAX_COMPLEXITY: u8 = 10;

static LEADING_FUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_.]*)\(").expect("valid regex"));

static FUNCTION_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_.]*\(").expect("valid regex"));

static LOGICAL_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:AND|OR|NOT|IF)\b").expect("valid regex"));

static RANGE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$?[A-Za-z]{1,3}\$?[0-9]+:\$?[A-Za-z]{1,3}\$?[0-9]+").expect("valid regex")
});

/// Result of classifying one formula string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Upper-cased leading function name, or [`CUSTOM_TAG`]
    pub function_tag: String,
    /// Formula family
    pub category: FormulaCategory,
    /// Complexity within `1..=10`
    pub complexity: u8,
}

/// Whether a cell value is a formula
#[inline]
#[must_use]
pub fn is_formula(cell: &str) -> bool {
    cell.starts_with('=')
}

fn body(raw: &str) -> &str {
    raw.strip_prefix('=').unwrap_or(raw).trim_start()
}

/// Upper-cased leading function name, if the expression starts with `NAME(`
#[must_use]
pub fn leading_function(raw: &str) -> Option<String> {
    LEADING_FUNCTION
        .captures(body(raw))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_uppercase())
}

/// Lexical complexity score, clamped to `1..=10`
#[must_use]
pub fn complexity_score(raw: &str) -> u8 {
    let text = body(raw);
    let calls = FUNCTION_CALL.find_iter(text).count();
    let keywords = LOGICAL_KEYWORD.find_iter(text).count();
    let ranges = RANGE_REFERENCE.find_iter(text).count();
    let qualifiers = SHEET_QUALIFIER.find_iter(text).count();

    let score = 1usize
        .saturating_add(calls.saturating_mul(2))
        .saturating_add(keywords)
        .saturating_add(ranges)
        .saturating_add(qualifiers.saturating_mul(2));

    let clamped = score.clamp(usize::from(MIN_COMPLEXITY), usize::from(MAX_COMPLEXITY));
    u8::try_from(clamped).unwrap_or(MAX_COMPLEXITY)
}

/// Classify one formula string
#[must_use]
pub fn classify(raw: &str) -> Classification {
    Classification {
        function_tag: leading_function(raw).unwrap_or_else(|| CUSTOM_TAG.to_string()),
        category: detect_category(raw),
        complexity: complexity_score(raw),
    }
}

/// Build a [`FormulaRecord`] for a formula cell
///
/// Returns `None` when the cell is not a formula.
#[must_use]
pub fn record_for(cell: &str, location: CellLocation) -> Option<FormulaRecord> {
    if !is_formula(cell) {
        return None;
    }
    let class = classify(cell);
    Some(FormulaRecord {
        function_tag: class.function_tag,
        category: class.category,
        location,
        raw_text: cell.to_string(),
        complexity_score: class.complexity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_function_is_upper_cased() {
        assert_eq!(leading_function("=sum(A1:A3)").as_deref(), Some("SUM"));
        assert_eq!(leading_function("=VLOOKUP(A1,B:C,2)").as_deref(), Some("VLOOKUP"));
    }

    #[test]
    fn leading_function_requires_immediate_paren() {
        assert_eq!(leading_function("=A1+B1"), None);
        assert_eq!(leading_function("=SUM (A1)"), None);
        assert_eq!(leading_function("=1+SUM(A1)"), None);
    }

    #[test]
    fn custom_tag_for_plain_expressions() {
        assert_eq!(classify("=A1*2").function_tag, CUSTOM_TAG);
        assert_eq!(classify("='Config'!B2").function_tag, CUSTOM_TAG);
    }

    #[test]
    fn plain_reference_scores_base() {
        assert_eq!(complexity_score("=A1"), 1);
    }

    #[test]
    fn single_range_sum() {
        // base 1 + call 2 + range 1
        assert_eq!(complexity_score("=SUM(A1:A10)"), 4);
    }

    #[test]
    fn cross_sheet_lookup() {
        // base 1 + call 2 + qualifier 2; `A:C` is not a cell range
        assert_eq!(complexity_score("=VLOOKUP(A1,'Products'!A:C,2,FALSE)"), 5);
    }

    #[test]
    fn if_counts_as_call_and_keyword() {
        // base 1 + call 2 + keyword 1
        assert_eq!(complexity_score("=IF(A1>0,1,0)"), 4);
    }

    #[test]
    fn iferror_is_not_a_keyword() {
        // base 1 + call 2
        assert_eq!(complexity_score("=IFERROR(A1,0)"), 3);
    }

    #[test]
    fn nested_formula_is_clamped() {
        let raw = "=IF(AND(A1>0,OR(B1<2,NOT(C1))),SUM(Data!A1:A9),AVERAGE('Other Sheet'!B1:B9))";
        assert_eq!(complexity_score(raw), MAX_COMPLEXITY);
    }

    #[test]
    fn record_for_skips_values() {
        assert!(record_for("42", CellLocation::new(0, 0)).is_none());
        assert!(record_for("", CellLocation::new(0, 0)).is_none());

        let record = record_for("=SUM(A1:A2)", CellLocation::new(4, 2)).unwrap();
        assert_eq!(record.function_tag, "SUM");
        assert_eq!(record.location, CellLocation::new(4, 2));
        assert_eq!(record.raw_text, "=SUM(A1:A2)");
        assert_eq!(record.category, FormulaCategory::Aggregation);
    }
}
