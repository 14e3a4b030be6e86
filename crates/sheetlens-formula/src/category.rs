//! Formula family detection
//!
//! The first matching rule wins, checked in the order of the
//! [`FormulaCategory`] variants.

use once_cell::sync::Lazy;
use regex::Regex;
use sheetlens_model::FormulaCategory;

static CONDITIONAL_AGGREGATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:SUM|AVERAGE|COUNT|MAX|MIN)IF").expect("valid regex"));

static AGGREGATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:SUM|AVERAGE|COUNT|MAX|MIN)\b").expect("valid regex"));

static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:DATE|TIME|NOW|TODAY|YEAR|MONTH|DAY)\b").expect("valid regex")
});

static TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:CONCATENATE|TEXTJOIN|LEFT|RIGHT|MID|TRIM)\b").expect("valid regex")
});

/// Detect the family of a formula from its whole text
#[must_use]
pub fn detect_category(raw: &str) -> FormulaCategory {
    let upper = raw.strip_prefix('=').unwrap_or(raw).trim_start().to_uppercase();

    if upper.contains("VLOOKUP") || upper.contains("HLOOKUP") || upper.contains("XLOOKUP") {
        FormulaCategory::Lookup
    } else if upper.contains("INDEX") && upper.contains("MATCH") {
        FormulaCategory::IndexMatch
    } else if CONDITIONAL_AGGREGATION.is_match(&upper) {
        FormulaCategory::ConditionalAggregation
    } else if AGGREGATION.is_match(&upper) {
        FormulaCategory::Aggregation
    } else if upper.starts_with("IF(") || upper.contains("IFS(") {
        FormulaCategory::Conditional
    } else if upper.contains("SWITCH(") {
        FormulaCategory::Switch
    } else if upper.contains("ARRAYFORMULA") {
        FormulaCategory::Array
    } else if upper.contains("FILTER(") || upper.contains("UNIQUE(") {
        FormulaCategory::ArrayFilter
    } else if DATE_TIME.is_match(&upper) {
        FormulaCategory::DateTime
    } else if TEXT.is_match(&upper) {
        FormulaCategory::Text
    } else {
        FormulaCategory::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_wins_over_aggregation() {
        assert_eq!(
            detect_category("=SUM(VLOOKUP(A1,B:C,2,FALSE))"),
            FormulaCategory::Lookup
        );
    }

    #[test]
    fn index_requires_match() {
        assert_eq!(
            detect_category("=INDEX(B:B,MATCH(A1,A:A,0))"),
            FormulaCategory::IndexMatch
        );
        assert_eq!(detect_category("=INDEX(B:B,3)"), FormulaCategory::Other);
    }

    #[test]
    fn aggregation_variants() {
        assert_eq!(
            detect_category("=SUMIFS(C:C,A:A,\"x\")"),
            FormulaCategory::ConditionalAggregation
        );
        assert_eq!(detect_category("=average(A1:A9)"), FormulaCategory::Aggregation);
    }

    #[test]
    fn conditional_and_array_families() {
        assert_eq!(detect_category("=IF(A1,1,2)"), FormulaCategory::Conditional);
        assert_eq!(detect_category("=SWITCH(A1,1,\"a\")"), FormulaCategory::Switch);
        assert_eq!(
            detect_category("=ARRAYFORMULA(A1:A9*2)"),
            FormulaCategory::Array
        );
        assert_eq!(detect_category("=UNIQUE(A:A)"), FormulaCategory::ArrayFilter);
    }

    #[test]
    fn date_and_text_families() {
        assert_eq!(detect_category("=TODAY()"), FormulaCategory::DateTime);
        assert_eq!(detect_category("=TRIM(A1)"), FormulaCategory::Text);
        assert_eq!(detect_category("=A1+B1"), FormulaCategory::Other);
    }
}
