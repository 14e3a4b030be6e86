//! Sheet-qualifier extraction
//!
//! Recognizes both reference forms:
//! - quoted: `'Sheet Name'!A1` (embedded quotes are doubled: `'Bob''s'!A1`)
//! - unquoted: `Sheet1!A1`, `매출!B2`
//!
//! Matches are candidates only; callers filter them against the set of real
//! sheet names, which discards lookalikes such as `"Hello!"` inside string
//! literals.

use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) static SHEET_QUALIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"'((?:[^']|'')+)'!|([\p{L}\p{N}_.]+)!").expect("valid regex")
});

/// Sheet names referenced by qualifiers in the formula, in order of appearance
#[must_use]
pub fn sheet_qualifiers(raw: &str) -> Vec<String> {
    SHEET_QUALIFIER
        .captures_iter(raw)
        .filter_map(|caps| {
            if let Some(quoted) = caps.get(1) {
                Some(quoted.as_str().replace("''", "'"))
            } else {
                caps.get(2).map(|m| m.as_str().to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_and_unquoted() {
        let refs = sheet_qualifiers("=VLOOKUP(A1,'Price List'!A:C,2,FALSE)+Data!B2");
        assert_eq!(refs, vec!["Price List", "Data"]);
    }

    #[test]
    fn doubled_quotes_are_unescaped() {
        assert_eq!(sheet_qualifiers("='Bob''s Sheet'!A1"), vec!["Bob's Sheet"]);
    }

    #[test]
    fn non_latin_names() {
        assert_eq!(sheet_qualifiers("=SUM(매출!B2:B9)"), vec!["매출"]);
        assert_eq!(sheet_qualifiers("='분석 리포트'!A1"), vec!["분석 리포트"]);
    }

    #[test]
    fn repeated_references_are_all_reported() {
        assert_eq!(sheet_qualifiers("=Data!A1+Data!A2"), vec!["Data", "Data"]);
    }

    #[test]
    fn no_qualifiers() {
        assert!(sheet_qualifiers("=SUM(A1:A9)").is_empty());
    }
}
