//! Snapshot files for offline runs
//!
//! A snapshot file is a JSON array of sheets as produced by a previous
//! harvest (`name`, `rowCount`, `columnCount`, `formulas`, ...).
//!
//! Tags, scores, categories and per-tag counts in the file are ignored and
//! derived again from each formula's text on load.

use crate::error::ConfigError;
use sheetlens_formula::record_for;
use sheetlens_model::SheetSnapshot;
use std::path::Path;

/// Rebuild a sheet's derived fields from its formula text
///
/// Records whose text is not a formula are dropped.
#[must_use]
pub fn reclassify(sheet: SheetSnapshot) -> SheetSnapshot {
    let total = sheet.formulas.len();
    let formulas: Vec<_> = sheet
        .formulas
        .iter()
        .filter_map(|f| record_for(&f.raw_text, f.location))
        .collect();
    if formulas.len() < total {
        tracing::debug!(
            sheet = %sheet.name,
            dropped = total - formulas.len(),
            "snapshot records without formula text dropped"
        );
    }
    SheetSnapshot::new(sheet.name, sheet.row_count, sheet.column_count, formulas)
        .with_data_ranges(sheet.data_ranges)
        .with_sampled(sheet.sampled)
}

/// Parse sheets from snapshot JSON
///
/// # Errors
/// - `ConfigError::Parse` on malformed JSON or a wrong shape
pub fn parse_snapshots(text: &str) -> Result<Vec<SheetSnapshot>, ConfigError> {
    let sheets: Vec<SheetSnapshot> =
        serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            what: "snapshot",
            message: e.to_string(),
        })?;
    Ok(sheets.into_iter().map(reclassify).collect())
}

/// Read sheets from a snapshot file
///
/// # Errors
/// - `ConfigError::Io` if the file cannot be read
/// - `ConfigError::Parse` on malformed JSON
pub fn load_snapshots(path: &Path) -> Result<Vec<SheetSnapshot>, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let sheets = parse_snapshots(&text)?;
    tracing::debug!(path = %path.display(), sheets = sheets.len(), "snapshots loaded");
    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::analyze_snapshots;
    use pretty_assertions::assert_eq;
    use sheetlens_formula::classify;
    use sheetlens_model::{DependencyKind, PatternKind, SpreadsheetId};
    use sheetlens_test_utils::orders_and_products;
    use std::collections::BTreeMap;

    #[test]
    fn file_round_trips_fixture() {
        let sheets = orders_and_products();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.json");
        std::fs::write(&path, serde_json::to_string_pretty(&sheets).unwrap()).unwrap();

        assert_eq!(load_snapshots(&path).unwrap(), sheets);
    }

    #[test]
    fn object_instead_of_array_is_rejected() {
        let err = parse_snapshots(r#"{"name":"Orders"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { what: "snapshot", .. }));
    }

    const STALE: &str = r#"[
        {
            "name": "Orders",
            "rowCount": 10,
            "columnCount": 4,
            "formulas": [
                {
                    "functionTag": "SUM",
                    "location": {"row": 1, "col": 1},
                    "rawText": "=SUM(A1:A10)",
                    "complexityScore": 0
                },
                {
                    "functionTag": "SUM",
                    "location": {"row": 2, "col": 1},
                    "rawText": "=VLOOKUP(A1,'Products'!A:C,2,FALSE)",
                    "complexityScore": 200
                },
                {
                    "functionTag": "SUM",
                    "location": {"row": 3, "col": 0},
                    "rawText": "plain value",
                    "complexityScore": 1
                }
            ],
            "formulaTypeCounts": {"SUMIF": 50},
            "dataRanges": [{"startRow": 0, "endRow": 3, "columns": 2}],
            "sampled": true
        },
        {
            "name": "Products",
            "rowCount": 3,
            "columnCount": 3,
            "formulas": [],
            "formulaTypeCounts": {}
        }
    ]"#;

    #[test]
    fn derived_fields_are_rebuilt_from_text() {
        let sheets = parse_snapshots(STALE).unwrap();
        let orders = &sheets[0];

        assert_eq!(orders.formula_count(), 2);
        assert!(orders
            .formulas
            .iter()
            .all(|f| (1..=10).contains(&f.complexity_score)));
        assert_eq!(orders.formulas[1].function_tag, "VLOOKUP");
        assert_eq!(
            orders.formulas[1].complexity_score,
            classify(&orders.formulas[1].raw_text).complexity
        );
        assert_eq!(
            orders.formula_type_counts,
            BTreeMap::from([("SUM".to_string(), 1), ("VLOOKUP".to_string(), 1)])
        );
        assert_eq!(orders.data_ranges.len(), 1);
        assert!(orders.sampled);
        assert!(sheets[1].formula_type_counts.is_empty());
    }

    #[test]
    fn stale_snapshot_analyzes_like_fresh_one() {
        let result = analyze_snapshots(
            SpreadsheetId::new("stale"),
            "Stale",
            parse_snapshots(STALE).unwrap(),
        );

        assert_eq!(result.edges.len(), 1);
        assert_eq!(result.edges[0].kind, DependencyKind::Lookup);
        assert!(result.pattern(PatternKind::AggregationSheet).is_none());
        assert!(result.used_sampling);
        assert!(result.complexity_score <= 100);
    }

    #[test]
    fn empty_array_is_empty_workbook() {
        assert!(parse_snapshots("[]").unwrap().is_empty());
    }
}
