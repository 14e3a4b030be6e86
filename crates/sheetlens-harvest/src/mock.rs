//! In-memory source for tests and offline runs
//!
//! Serves preset grids, records every requested range, can fail chosen
//! batches and tracks how many fetches were in flight at once.

use crate::error::SourceError;
use crate::source::{CellGrid, CellRange, SheetMeta, SheetSource, SpreadsheetMetadata};
use async_trait::async_trait;
use parking_lot::Mutex;
use sheetlens_model::SpreadsheetId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Preset-response source
#[derive(Debug, Default)]
pub struct MockSheetSource {
    title: String,
    sheets: Vec<SheetMeta>,
    grids: HashMap<String, CellGrid>,
    metadata_error: Option<SourceError>,
    /// key: (sheet, start_row) of the batch to fail
    failures: Mutex<HashMap<(String, u32), SourceError>>,
    latency: Duration,
    /// Every range fetched, in request order
    pub requested: Mutex<Vec<CellRange>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockSheetSource {
    /// Create empty source with a title
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    /// Add a sheet whose extent is the size of `grid`
    #[must_use]
    pub fn with_sheet(self, name: &str, grid: CellGrid) -> Self {
        let rows = grid.len() as u32;
        let cols = grid.iter().map(Vec::len).max().unwrap_or(0) as u32;
        self.with_sheet_extent(name, rows, cols, grid)
    }

    /// Add a sheet with an explicit extent, which may exceed `grid`
    #[must_use]
    pub fn with_sheet_extent(mut self, name: &str, rows: u32, cols: u32, grid: CellGrid) -> Self {
        self.sheets.push(SheetMeta::new(name, rows, cols));
        self.grids.insert(name.to_string(), grid);
        self
    }

    /// Delay every range fetch
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make the metadata call fail
    #[must_use]
    pub fn with_metadata_error(mut self, err: SourceError) -> Self {
        self.metadata_error = Some(err);
        self
    }

    /// Fail the batch of `sheet` starting at `start_row`
    pub fn fail_batch(&self, sheet: &str, start_row: u32, err: SourceError) {
        self.failures.lock().insert((sheet.to_string(), start_row), err);
    }

    /// Highest number of concurrent range fetches observed
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Number of range fetches so far
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requested.lock().len()
    }

    fn slice(&self, range: &CellRange) -> CellGrid {
        let Some(grid) = self.grids.get(&range.sheet) else {
            return Vec::new();
        };
        grid.iter()
            .skip(range.start_row as usize)
            .take(range.row_len() as usize)
            .map(|row| row.iter().take(range.columns as usize).cloned().collect())
            .collect()
    }
}

#[async_trait]
impl SheetSource for MockSheetSource {
    async fn metadata(&self, id: &SpreadsheetId) -> Result<SpreadsheetMetadata, SourceError> {
        if let Some(err) = &self.metadata_error {
            return Err(err.clone());
        }
        Ok(SpreadsheetMetadata {
            id: id.clone(),
            title: self.title.clone(),
            sheets: self.sheets.clone(),
        })
    }

    async fn fetch_range(
        &self,
        _id: &SpreadsheetId,
        range: &CellRange,
    ) -> Result<CellGrid, SourceError> {
        self.requested.lock().push(range.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failure = self
            .failures
            .lock()
            .get(&(range.sheet.clone(), range.start_row))
            .cloned();
        match failure {
            Some(err) => Err(err),
            None => Ok(self.slice(range)),
        }
    }
}
