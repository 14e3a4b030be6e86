//! Harvested sheet content
//!
//! A [`SheetSnapshot`] is produced once per sheet by the harvester and holds
//! every formula found in the (possibly sampled) sheet region.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Spreadsheet identifier extracted from a locator
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpreadsheetId(pub String);

impl SpreadsheetId {
    /// Create new identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SpreadsheetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Zero-based cell coordinates within a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellLocation {
    /// Row index (0-based)
    pub row: u32,
    /// Column index (0-based)
    pub col: u32,
}

impl CellLocation {
    /// Create new location
    #[inline]
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1-style notation for this location (`B3` for row 2, col 1)
    #[must_use]
    pub fn to_a1(&self) -> String {
        format!("{}{}", column_letters(self.col), self.row + 1)
    }
}

impl std::fmt::Display for CellLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Convert a 0-based column index into spreadsheet column letters
///
/// `0 -> A`, `25 -> Z`, `26 -> AA`.
#[must_use]
pub fn column_letters(col: u32) -> String {
    let mut n = col + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Broad formula family, detected lexically from the whole expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormulaCategory {
    /// VLOOKUP / HLOOKUP
    Lookup,
    /// INDEX combined with MATCH
    IndexMatch,
    /// SUMIF, COUNTIF, ... family
    ConditionalAggregation,
    /// SUM, AVERAGE, COUNT, MAX, MIN
    Aggregation,
    /// IF / IFS
    Conditional,
    /// SWITCH
    Switch,
    /// ARRAYFORMULA
    Array,
    /// FILTER / UNIQUE
    ArrayFilter,
    /// Date and time functions
    DateTime,
    /// Text manipulation functions
    Text,
    /// Anything else
    Other,
}

impl FormulaCategory {
    /// Stable upper-case name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lookup => "LOOKUP",
            Self::IndexMatch => "INDEX_MATCH",
            Self::ConditionalAggregation => "CONDITIONAL_AGGREGATION",
            Self::Aggregation => "AGGREGATION",
            Self::Conditional => "CONDITIONAL",
            Self::Switch => "SWITCH",
            Self::Array => "ARRAY",
            Self::ArrayFilter => "ARRAY_FILTER",
            Self::DateTime => "DATETIME",
            Self::Text => "TEXT",
            Self::Other => "OTHER",
        }
    }
}

impl Default for FormulaCategory {
    fn default() -> Self {
        Self::Other
    }
}

impl std::fmt::Display for FormulaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One formula cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaRecord {
    /// Leading function name, or `CUSTOM`
    pub function_tag: String,
    /// Formula family
    #[serde(default)]
    pub category: FormulaCategory,
    /// Cell location as sourced
    pub location: CellLocation,
    /// Formula text including the leading `=`
    pub raw_text: String,
    /// Lexical complexity, always within `1..=10`
    pub complexity_score: u8,
}

/// Contiguous block of non-empty rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRange {
    /// First row of the block (0-based, inclusive)
    pub start_row: u32,
    /// Last row of the block (0-based, inclusive)
    pub end_row: u32,
    /// Widest row in the block
    pub columns: u32,
}

/// Harvested content of one sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSnapshot {
    /// Sheet name as shown in the spreadsheet
    pub name: String,
    /// Row extent reported by the source (not the sampled extent)
    pub row_count: u32,
    /// Column extent reported by the source (not the sampled extent)
    pub column_count: u32,
    /// Formulas found in the harvested region
    pub formulas: Vec<FormulaRecord>,
    /// Count of formulas per function tag
    pub formula_type_counts: BTreeMap<String, usize>,
    /// Contiguous data blocks in the harvested region
    #[serde(default)]
    pub data_ranges: Vec<DataRange>,
    /// Whether only part of the sheet was harvested
    #[serde(default)]
    pub sampled: bool,
}

impl SheetSnapshot {
    /// Create snapshot from formulas, deriving per-tag counts
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        row_count: u32,
        column_count: u32,
        formulas: Vec<FormulaRecord>,
    ) -> Self {
        let mut formula_type_counts = BTreeMap::new();
        for formula in &formulas {
            *formula_type_counts
                .entry(formula.function_tag.clone())
                .or_insert(0) += 1;
        }
        Self {
            name: name.into(),
            row_count,
            column_count,
            formulas,
            formula_type_counts,
            data_ranges: Vec::new(),
            sampled: false,
        }
    }

    /// With identified data ranges
    #[inline]
    #[must_use]
    pub fn with_data_ranges(mut self, ranges: Vec<DataRange>) -> Self {
        self.data_ranges = ranges;
        self
    }

    /// Mark as sampled
    #[inline]
    #[must_use]
    pub fn with_sampled(mut self, sampled: bool) -> Self {
        self.sampled = sampled;
        self
    }

    /// Number of formulas
    #[inline]
    #[must_use]
    pub fn formula_count(&self) -> usize {
        self.formulas.len()
    }

    /// Total cells by reported extent
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> u64 {
        u64::from(self.row_count) * u64::from(self.column_count)
    }

    /// Formulas per cell; zero for an empty sheet
    #[must_use]
    pub fn formula_ratio(&self) -> f64 {
        let cells = self.cell_count();
        if cells == 0 {
            return 0.0;
        }
        self.formula_count() as f64 / cells as f64
    }

    /// Count for a single function tag
    #[inline]
    #[must_use]
    pub fn tag_count(&self, tag: &str) -> usize {
        self.formula_type_counts.get(tag).copied().unwrap_or(0)
    }

    /// Combined count for a family of tags
    #[must_use]
    pub fn family_count(&self, tags: &[&str]) -> usize {
        tags.iter().map(|tag| self.tag_count(tag)).sum()
    }

    /// Whether any tag of the family is present
    #[must_use]
    pub fn has_any(&self, tags: &[&str]) -> bool {
        tags.iter().any(|tag| self.tag_count(tag) > 0)
    }

    /// Most frequent tags, ties broken by name
    #[must_use]
    pub fn top_tags(&self, limit: usize) -> Vec<&str> {
        let mut tags: Vec<(&str, usize)> = self
            .formula_type_counts
            .iter()
            .map(|(tag, count)| (tag.as_str(), *count))
            .collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        tags.into_iter().take(limit).map(|(tag, _)| tag).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tag: &str, row: u32, col: u32) -> FormulaRecord {
        FormulaRecord {
            function_tag: tag.to_string(),
            category: FormulaCategory::Other,
            location: CellLocation::new(row, col),
            raw_text: format!("={tag}(A1)"),
            complexity_score: 3,
        }
    }

    #[test]
    fn snapshot_counts_tags() {
        let sheet = SheetSnapshot::new(
            "Orders",
            10,
            4,
            vec![record("SUM", 0, 0), record("SUM", 1, 0), record("IF", 2, 1)],
        );

        assert_eq!(sheet.tag_count("SUM"), 2);
        assert_eq!(sheet.tag_count("IF"), 1);
        assert_eq!(sheet.tag_count("VLOOKUP"), 0);
        assert_eq!(sheet.family_count(&["SUM", "IF"]), 3);
        assert!(sheet.has_any(&["VLOOKUP", "IF"]));
    }

    #[test]
    fn formula_ratio_handles_empty_sheet() {
        let sheet = SheetSnapshot::new("Empty", 0, 0, Vec::new());
        assert_eq!(sheet.formula_ratio(), 0.0);
    }

    #[test]
    fn top_tags_orders_by_count_then_name() {
        let sheet = SheetSnapshot::new(
            "Mixed",
            5,
            5,
            vec![
                record("SUM", 0, 0),
                record("IF", 1, 0),
                record("IF", 2, 0),
                record("AVERAGE", 3, 0),
                record("COUNT", 4, 0),
            ],
        );
        assert_eq!(sheet.top_tags(3), vec!["IF", "AVERAGE", "COUNT"]);
    }

    #[test]
    fn column_letters_roll_over() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(12), "M");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn location_renders_a1() {
        assert_eq!(CellLocation::new(2, 1).to_a1(), "B3");
        assert_eq!(CellLocation::new(0, 0).to_string(), "A1");
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let sheet = SheetSnapshot::new("Orders", 3, 2, vec![record("SUM", 0, 0)]);
        let json = serde_json::to_value(&sheet).unwrap();
        assert_eq!(json["rowCount"], 3);
        assert_eq!(json["formulaTypeCounts"]["SUM"], 1);
        assert_eq!(json["formulas"][0]["functionTag"], "SUM");
        assert_eq!(json["formulas"][0]["complexityScore"], 3);
    }
}
