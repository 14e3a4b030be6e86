//! Structural pattern detection
//!
//! Thresholds are independent; a sheet may carry several tags at once.

use sheetlens_formula::families;
use sheetlens_graph::SheetGraph;
use sheetlens_model::{PatternKind, PatternMatch, SheetSnapshot};
use std::collections::BTreeSet;

/// Distinct referencing sheets needed for master-data
pub const MASTER_MIN_REFERENCING: usize = 2;

/// Formula-to-cell ratio a calculation sheet must exceed
pub const CALCULATION_MIN_RATIO: f64 = 0.3;

/// Formula count a calculation sheet must exceed
pub const CALCULATION_MIN_FORMULAS: usize = 10;

/// Aggregation-family count an aggregation sheet must exceed
pub const AGGREGATION_MIN: usize = 5;

/// Lookup-family count a lookup sheet must exceed
pub const LOOKUP_MIN: usize = 3;

/// Explanation attached to each pattern
#[must_use]
pub fn rationale(kind: PatternKind) -> &'static str {
    match kind {
        PatternKind::MasterData => "여러 시트에서 참조되는 마스터 데이터를 포함합니다",
        PatternKind::CalculationSheet => "복잡한 계산과 수식을 수행하는 시트입니다",
        PatternKind::AggregationSheet => "데이터를 집계하고 요약하는 시트입니다",
        PatternKind::LookupSheet => "다른 시트에서 데이터를 조회하고 가져오는 시트입니다",
    }
}

/// Whether a sheet qualifies as a calculation sheet
#[must_use]
pub fn is_calculation_sheet(sheet: &SheetSnapshot) -> bool {
    sheet.formula_ratio() > CALCULATION_MIN_RATIO
        && sheet.formula_count() > CALCULATION_MIN_FORMULAS
}

/// Whether a sheet qualifies as an aggregation sheet
#[must_use]
pub fn is_aggregation_sheet(sheet: &SheetSnapshot) -> bool {
    sheet.family_count(families::AGGREGATION) > AGGREGATION_MIN
}

/// Whether a sheet qualifies as a lookup sheet
#[must_use]
pub fn is_lookup_sheet(sheet: &SheetSnapshot) -> bool {
    sheet.family_count(families::LOOKUP_ROLE) > LOOKUP_MIN
}

/// Sheets referenced by enough distinct other sheets
///
/// Referenced sheets that were not harvested still count.
#[must_use]
pub fn master_sheets(graph: &SheetGraph<'_>, candidates: &[&str]) -> BTreeSet<String> {
    candidates
        .iter()
        .filter(|name| graph.in_degree(name) >= MASTER_MIN_REFERENCING)
        .map(|name| (*name).to_string())
        .collect()
}

/// Tag sheets with structural roles
///
/// Only patterns with at least one sheet are returned, in [`PatternKind::ALL`] order.
#[must_use]
pub fn detect_patterns(
    sheets: &[SheetSnapshot],
    graph: &SheetGraph<'_>,
    referenced: &[&str],
) -> Vec<PatternMatch> {
    let tagged = |pred: fn(&SheetSnapshot) -> bool| -> BTreeSet<String> {
        sheets
            .iter()
            .filter(|s| pred(s))
            .map(|s| s.name.clone())
            .collect()
    };

    PatternKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let sheet_names = match kind {
                PatternKind::MasterData => master_sheets(graph, referenced),
                PatternKind::CalculationSheet => tagged(is_calculation_sheet),
                PatternKind::AggregationSheet => tagged(is_aggregation_sheet),
                PatternKind::LookupSheet => tagged(is_lookup_sheet),
            };
            if sheet_names.is_empty() {
                return None;
            }
            tracing::debug!(pattern = %kind, sheets = sheet_names.len(), "pattern detected");
            Some(PatternMatch {
                pattern_name: kind,
                sheet_names,
                rationale: rationale(kind).to_string(),
            })
        })
        .collect()
}

/// Whether any sheet carries the pattern
#[inline]
#[must_use]
pub fn has_pattern(patterns: &[PatternMatch], kind: PatternKind) -> bool {
    patterns.iter().any(|p| p.pattern_name == kind)
}

/// Whether the named sheet carries the pattern
#[must_use]
pub fn sheet_has_pattern(patterns: &[PatternMatch], sheet: &str, kind: PatternKind) -> bool {
    patterns
        .iter()
        .any(|p| p.pattern_name == kind && p.contains(sheet))
}
