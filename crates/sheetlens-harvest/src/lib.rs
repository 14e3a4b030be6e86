//! sheetlens harvest
//!
//! Stage one of an analysis run: fetch formula text for every sheet of a
//! spreadsheet, in bounded and paced batches.
//!
//! - [`SheetSource`]: read-only port, implemented by [`GoogleSheetsSource`]
//!   and [`MockSheetSource`]
//! - [`Harvester`]: sampling, batching and partial-failure handling
//! - [`BoundedPool`]: semaphore limiter with per-slot cool-down

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod google;
pub mod harvester;
pub mod mock;
pub mod pool;
pub mod source;

pub use error::SourceError;
pub use google::GoogleSheetsSource;
pub use harvester::{data_ranges, HarvestReport, HarvestSettings, Harvester};
pub use mock::MockSheetSource;
pub use pool::BoundedPool;
pub use source::{CellGrid, CellRange, SheetMeta, SheetSource, SpreadsheetMetadata};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
