//! Harvester behavior against the in-memory source

use pretty_assertions::assert_eq;
use sheetlens_harvest::{
    CellGrid, HarvestSettings, Harvester, MockSheetSource, SheetSource, SourceError,
};
use sheetlens_model::{CellLocation, DataRange, SpreadsheetId};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// `rows` x `cols` grid with a formula in column A of every row
fn formula_grid(rows: u32, cols: u32) -> CellGrid {
    (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| {
                    if c == 0 {
                        format!("=SUM(B{0}:C{0})", r + 1)
                    } else {
                        format!("{r}")
                    }
                })
                .collect()
        })
        .collect()
}

async fn harvest(source: Arc<MockSheetSource>, settings: HarvestSettings) -> sheetlens_harvest::HarvestReport {
    let id = SpreadsheetId::new("book");
    let meta = source.metadata(&id).await.unwrap();
    Harvester::new(source, settings).harvest(&id, &meta.sheets).await
}

#[tokio::test(start_paused = true)]
async fn exact_cap_is_not_sampled() {
    let source = Arc::new(
        MockSheetSource::new("Book").with_sheet("Edge", formula_grid(200, 13)),
    );
    let report = harvest(source.clone(), HarvestSettings::default()).await;

    assert!(!report.used_sampling);
    assert_eq!(report.sheets[0].formula_count(), 200);
    assert_eq!(report.total_batches, 20);
}

#[tokio::test(start_paused = true)]
async fn one_extra_row_or_column_samples() {
    let source = Arc::new(
        MockSheetSource::new("Book")
            .with_sheet("Tall", formula_grid(201, 13))
            .with_sheet("Wide", formula_grid(5, 14)),
    );
    let report = harvest(source.clone(), HarvestSettings::default()).await;

    assert!(report.used_sampling);
    assert!(report.sheets.iter().all(|s| s.sampled));
    // Sampled sheets keep their reported extent
    assert_eq!(report.sheets[0].row_count, 201);
    assert_eq!(report.sheets[0].formula_count(), 200);

    let requested = source.requested.lock();
    assert!(requested.iter().all(|r| r.end_row <= 200 && r.columns <= 13));
}

#[tokio::test(start_paused = true)]
async fn failed_batch_is_absorbed() {
    let source = MockSheetSource::new("Book").with_sheet("Data", formula_grid(30, 3));
    source.fail_batch(
        "Data",
        10,
        SourceError::PayloadTooLarge {
            limit: 1,
            observed: 2,
        },
    );
    let report = harvest(Arc::new(source), HarvestSettings::default()).await;

    assert_eq!(report.failed_batches, 1);
    assert_eq!(report.total_batches, 3);
    let rows: Vec<u32> = report.sheets[0]
        .formulas
        .iter()
        .map(|f| f.location.row)
        .collect();
    assert_eq!(rows.len(), 20);
    assert!(rows.iter().all(|r| !(10..20).contains(r)));
    assert_eq!(
        report.sheets[0].data_ranges,
        vec![
            DataRange { start_row: 0, end_row: 9, columns: 3 },
            DataRange { start_row: 20, end_row: 29, columns: 3 },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn batch_requests_are_capped_per_sheet() {
    let source = Arc::new(
        MockSheetSource::new("Book")
            .with_sheet("Big", formula_grid(100, 2))
            .with_latency(Duration::from_millis(50)),
    );
    let settings = HarvestSettings {
        sheet_concurrency: 1,
        ..HarvestSettings::default()
    };
    harvest(source.clone(), settings).await;

    assert_eq!(source.request_count(), 10);
    assert_eq!(source.peak_in_flight(), 3);
}

#[tokio::test(start_paused = true)]
async fn sheets_are_capped_at_two() {
    let mut book = MockSheetSource::new("Book").with_latency(Duration::from_millis(50));
    for name in ["A", "B", "C", "D"] {
        book = book.with_sheet(name, formula_grid(5, 2));
    }
    let source = Arc::new(book);
    harvest(source.clone(), HarvestSettings::default()).await;

    // One batch per sheet, at most two sheets at a time
    assert_eq!(source.request_count(), 4);
    assert_eq!(source.peak_in_flight(), 2);
}

#[tokio::test(start_paused = true)]
async fn groups_are_paced() {
    let source = Arc::new(MockSheetSource::new("Book").with_sheet("S", formula_grid(100, 2)));
    let start = Instant::now();
    harvest(source, HarvestSettings::default()).await;

    // Ten batches through three slots is four waves of 150 ms
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(600), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn locations_are_exact() {
    let grid = vec![
        vec![String::new(), String::new()],
        vec!["label".to_string(), "=VLOOKUP(A2,'Ref'!A:B,2,FALSE)".to_string()],
    ];
    let source = Arc::new(MockSheetSource::new("Book").with_sheet("S", grid));
    let report = harvest(source, HarvestSettings::default()).await;

    let formula = &report.sheets[0].formulas[0];
    assert_eq!(formula.location, CellLocation::new(1, 1));
    assert_eq!(formula.function_tag, "VLOOKUP");
}
