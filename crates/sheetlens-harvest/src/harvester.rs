//! Sheet data harvester
//!
//! Oversized sheets are sampled to a fixed row/column cap, rows are split
//! into fixed-size batches and batches are fetched through a bounded pool.
//! A failing batch contributes nothing and never aborts the sheet or run.

use crate::pool::BoundedPool;
use crate::source::{CellGrid, CellRange, SheetMeta, SheetSource};
use futures::future::join_all;
use sheetlens_formula::record_for;
use sheetlens_model::{CellLocation, DataRange, FormulaRecord, SheetSnapshot, SpreadsheetId};
use std::sync::Arc;
use std::time::Duration;

/// Harvest tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestSettings {
    /// Row cap for sampled sheets
    pub max_rows: u32,
    /// Column cap for sampled sheets
    pub max_columns: u32,
    /// Rows per range request
    pub rows_per_batch: u32,
    /// Concurrent batch requests per sheet
    pub max_in_flight: usize,
    /// Pause held by each batch slot after its request
    pub group_delay: Duration,
    /// Sheets harvested at once
    pub sheet_concurrency: usize,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            max_rows: 200,
            max_columns: 13,
            rows_per_batch: 10,
            max_in_flight: 3,
            group_delay: Duration::from_millis(150),
            sheet_concurrency: 2,
        }
    }
}

impl HarvestSettings {
    /// Harvested extent of a sheet and whether it was capped
    #[must_use]
    pub fn extent(&self, meta: &SheetMeta) -> (u32, u32, bool) {
        let sampled = meta.row_count > self.max_rows || meta.column_count > self.max_columns;
        (
            meta.row_count.min(self.max_rows),
            meta.column_count.min(self.max_columns),
            sampled,
        )
    }

    /// Batch ranges covering the harvested extent
    #[must_use]
    pub fn plan(&self, meta: &SheetMeta) -> Vec<CellRange> {
        let (rows, cols, _) = self.extent(meta);
        if rows == 0 || cols == 0 {
            return Vec::new();
        }
        let step = self.rows_per_batch.max(1);
        (0..rows)
            .step_by(step as usize)
            .map(|start| CellRange::new(&meta.name, start, (start + step).min(rows), cols))
            .collect()
    }
}

/// Outcome of harvesting a workbook
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestReport {
    /// One snapshot per sheet, in metadata order
    pub sheets: Vec<SheetSnapshot>,
    /// Whether any sheet was sampled
    pub used_sampling: bool,
    /// Range requests issued
    pub total_batches: usize,
    /// Range requests that failed
    pub failed_batches: usize,
}

/// Formulas and occupied rows found in one batch
#[derive(Debug, Default)]
struct BatchYield {
    formulas: Vec<FormulaRecord>,
    /// (row, width) of each non-empty row
    occupied: Vec<(u32, u32)>,
    failed: bool,
}

fn scan_batch(range: &CellRange, grid: &CellGrid) -> BatchYield {
    let mut out = BatchYield::default();
    for (offset, row) in grid.iter().take(range.row_len() as usize).enumerate() {
        let row_idx = range.start_row + offset as u32;
        let mut width = 0;
        for (col, cell) in row.iter().take(range.columns as usize).enumerate() {
            if cell.trim().is_empty() {
                continue;
            }
            width = col as u32 + 1;
            if let Some(record) = record_for(cell, CellLocation::new(row_idx, col as u32)) {
                out.formulas.push(record);
            }
        }
        if width > 0 {
            out.occupied.push((row_idx, width));
        }
    }
    out
}

/// Group occupied rows into contiguous blocks
#[must_use]
pub fn data_ranges(mut occupied: Vec<(u32, u32)>) -> Vec<DataRange> {
    occupied.sort_unstable();
    let mut ranges: Vec<DataRange> = Vec::new();
    for (row, width) in occupied {
        match ranges.last_mut() {
            Some(last) if last.end_row + 1 == row => {
                last.end_row = row;
                last.columns = last.columns.max(width);
            }
            _ => ranges.push(DataRange {
                start_row: row,
                end_row: row,
                columns: width,
            }),
        }
    }
    ranges
}

/// Fetches formulas for every sheet of a workbook
#[derive(Clone)]
pub struct Harvester {
    source: Arc<dyn SheetSource>,
    settings: HarvestSettings,
}

impl std::fmt::Debug for Harvester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harvester")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Harvester {
    /// Create harvester over a source
    #[must_use]
    pub fn new(source: Arc<dyn SheetSource>, settings: HarvestSettings) -> Self {
        Self { source, settings }
    }

    /// Settings in use
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &HarvestSettings {
        &self.settings
    }

    /// Harvest every listed sheet
    ///
    /// Never fails: batch errors are logged and counted.
    pub async fn harvest(&self, id: &SpreadsheetId, sheets: &[SheetMeta]) -> HarvestReport {
        let sheet_pool = BoundedPool::new(self.settings.sheet_concurrency);
        let results = join_all(
            sheets
                .iter()
                .map(|meta| sheet_pool.run(self.harvest_sheet(id, meta))),
        )
        .await;

        let mut report = HarvestReport {
            sheets: Vec::with_capacity(results.len()),
            used_sampling: false,
            total_batches: 0,
            failed_batches: 0,
        };
        for (snapshot, total, failed) in results {
            report.used_sampling |= snapshot.sampled;
            report.total_batches += total;
            report.failed_batches += failed;
            report.sheets.push(snapshot);
        }

        tracing::info!(
            sheets = report.sheets.len(),
            batches = report.total_batches,
            failed = report.failed_batches,
            sampled = report.used_sampling,
            "harvest complete"
        );
        report
    }

    /// Harvest one sheet, returning the snapshot and batch counts
    async fn harvest_sheet(&self, id: &SpreadsheetId, meta: &SheetMeta) -> (SheetSnapshot, usize, usize) {
        let (rows, cols, sampled) = self.settings.extent(meta);
        if sampled {
            tracing::debug!(
                sheet = %meta.name,
                rows = meta.row_count,
                cols = meta.column_count,
                "sampling oversized sheet to {rows}x{cols}"
            );
        }

        let batch_pool = BoundedPool::new(self.settings.max_in_flight)
            .with_cooldown(self.settings.group_delay);
        let batches = self.settings.plan(meta);
        let yields = join_all(batches.iter().map(|range| {
            batch_pool.run(async move {
                match self.source.fetch_range(id, range).await {
                    Ok(grid) => scan_batch(range, &grid),
                    Err(err) => {
                        tracing::warn!(
                            sheet = %range.sheet,
                            rows = %format!("{}..{}", range.start_row, range.end_row),
                            error = %err,
                            "batch fetch failed, continuing without it"
                        );
                        BatchYield {
                            failed: true,
                            ..BatchYield::default()
                        }
                    }
                }
            })
        }))
        .await;

        let failed = yields.iter().filter(|y| y.failed).count();
        let mut formulas = Vec::new();
        let mut occupied = Vec::new();
        for y in yields {
            formulas.extend(y.formulas);
            occupied.extend(y.occupied);
        }

        tracing::debug!(
            sheet = %meta.name,
            formulas = formulas.len(),
            batches = batches.len(),
            failed,
            "sheet harvested"
        );

        let snapshot = SheetSnapshot::new(&meta.name, meta.row_count, meta.column_count, formulas)
            .with_data_ranges(data_ranges(occupied))
            .with_sampled(sampled);
        (snapshot, batches.len(), failed)
    }
}
