//! Function-name families
//!
//! Tags are compared against the upper-cased leading function name of each
//! formula, so only the outermost call counts toward a family.

/// Leading functions that make a cross-sheet reference a lookup edge
pub const LOOKUP_EDGE: &[&str] = &["VLOOKUP", "HLOOKUP", "XLOOKUP", "INDEX", "MATCH"];

/// Tags counted toward the lookup-sheet role
pub const LOOKUP_ROLE: &[&str] = &["VLOOKUP", "HLOOKUP", "XLOOKUP", "INDEX"];

/// Tags counted toward the aggregation-sheet role
pub const AGGREGATION: &[&str] = &[
    "SUM",
    "SUMIF",
    "SUMIFS",
    "AVERAGE",
    "AVERAGEIF",
    "COUNT",
    "COUNTIF",
];

/// Conditional tag
pub const CONDITIONAL: &[&str] = &["IF"];

/// Validation tags
pub const VALIDATION: &[&str] = &["ISERROR", "IFERROR", "ISBLANK"];

/// Date and time tags
pub const DATE_TIME: &[&str] = &["DATE", "TODAY", "NOW", "YEAR", "MONTH"];

/// Text processing tags
pub const TEXT: &[&str] = &["CONCATENATE", "LEFT", "RIGHT", "MID", "TRIM"];

/// Tags that recalculate slowly at volume
pub const HEAVY: &[&str] = &["VLOOKUP", "SUMIFS", "COUNTIFS", "AVERAGEIFS"];

/// Whether a leading function makes its cross-sheet references lookups
#[inline]
#[must_use]
pub fn is_lookup_edge_tag(tag: &str) -> bool {
    LOOKUP_EDGE.contains(&tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_is_lookup_edge_but_not_role() {
        assert!(is_lookup_edge_tag("MATCH"));
        assert!(!LOOKUP_ROLE.contains(&"MATCH"));
        assert!(!is_lookup_edge_tag("SUM"));
    }
}
