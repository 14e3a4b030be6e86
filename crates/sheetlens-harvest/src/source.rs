//! Spreadsheet source port
//!
//! The harvester only ever needs two reads: workbook metadata and the raw
//! cell text of one rectangular range.

use crate::error::SourceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sheetlens_model::{column_letters, SpreadsheetId};

/// Extent of one sheet as reported by the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetMeta {
    /// Sheet name
    pub name: String,
    /// Rows in the sheet grid
    pub row_count: u32,
    /// Columns in the sheet grid
    pub column_count: u32,
}

impl SheetMeta {
    /// Create new sheet metadata
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, row_count: u32, column_count: u32) -> Self {
        Self {
            name: name.into(),
            row_count,
            column_count,
        }
    }
}

/// Workbook-level metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetMetadata {
    /// Source identifier
    pub id: SpreadsheetId,
    /// Workbook title
    pub title: String,
    /// Sheets in tab order
    pub sheets: Vec<SheetMeta>,
}

impl SpreadsheetMetadata {
    /// All sheet names in tab order
    #[must_use]
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Rectangular range anchored at column A
///
/// Rows are 0-based with an exclusive end.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Sheet name
    pub sheet: String,
    /// First row (0-based, inclusive)
    pub start_row: u32,
    /// End row (0-based, exclusive)
    pub end_row: u32,
    /// Number of columns from A
    pub columns: u32,
}

impl CellRange {
    /// Create new range
    #[inline]
    #[must_use]
    pub fn new(sheet: impl Into<String>, start_row: u32, end_row: u32, columns: u32) -> Self {
        Self {
            sheet: sheet.into(),
            start_row,
            end_row,
            columns,
        }
    }

    /// Rows covered
    #[inline]
    #[must_use]
    pub fn row_len(&self) -> u32 {
        self.end_row.saturating_sub(self.start_row)
    }

    /// A1 notation with a quoted sheet name, e.g. `'Q1 Sales'!A11:M20`
    #[must_use]
    pub fn to_a1(&self) -> String {
        let sheet = self.sheet.replace('\'', "''");
        let last_col = column_letters(self.columns.saturating_sub(1));
        format!(
            "'{sheet}'!A{}:{last_col}{}",
            self.start_row + 1,
            self.end_row
        )
    }
}

impl std::fmt::Display for CellRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Raw cell text, row-major; rows and trailing cells may be omitted when empty
pub type CellGrid = Vec<Vec<String>>;

/// Read-only access to spreadsheet content
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Workbook title and sheet extents
    async fn metadata(&self, id: &SpreadsheetId) -> Result<SpreadsheetMetadata, SourceError>;

    /// Cell text of one range, formulas as written (leading `=`)
    async fn fetch_range(&self, id: &SpreadsheetId, range: &CellRange)
        -> Result<CellGrid, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a1_quotes_sheet_names() {
        let range = CellRange::new("Q1 Sales", 10, 20, 13);
        assert_eq!(range.to_a1(), "'Q1 Sales'!A11:M20");
        assert_eq!(range.row_len(), 10);
    }

    #[test]
    fn a1_doubles_embedded_quotes() {
        let range = CellRange::new("Bob's", 0, 10, 28);
        assert_eq!(range.to_a1(), "'Bob''s'!A1:AB10");
    }

    #[test]
    fn metadata_serializes_camel_case() {
        let meta = SheetMeta::new("A", 3, 4);
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"name":"A","rowCount":3,"columnCount":4}"#);
    }
}
