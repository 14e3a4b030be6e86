//! sheetlens core
//!
//! Orchestrates a full analysis run and carries the ambient pieces around it:
//! - [`Analyzer`]: cache check, metadata, harvest, edges, insights
//! - [`AnalyzerConfig`]: layered TOML/environment configuration
//! - [`ResultCache`]: TTL-bounded result cache ([`MokaResultCache`], [`NoopCache`])
//! - [`SpreadsheetLocator`]: URL or bare-id parsing
//! - [`AnalysisError`]: run-level error taxonomy with remediation hints
//!
//! ```no_run
//! use sheetlens_core::{Analyzer, AnalyzerConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AnalyzerConfig::load(None)?;
//! let analyzer = Analyzer::from_config(&config)?;
//! let result = analyzer
//!     .analyze_locator("https://docs.google.com/spreadsheets/d/1BxiMVs0XRA5nFMdKvBdBZjgmUUqptlbs74OgvE2upms/edit")
//!     .await?;
//! println!("{}", result.diagram.mermaid);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod config;
pub mod error;
pub mod locator;
pub mod offline;
pub mod pipeline;

pub use cache::{MokaResultCache, NoopCache, ResultCache};
pub use config::{AnalyzerConfig, BatchConfig, CacheConfig, SamplingConfig, SourceConfig};
pub use error::{AnalysisError, ConfigError, ErrorKind};
pub use locator::SpreadsheetLocator;
pub use offline::{load_snapshots, parse_snapshots, reclassify};
pub use pipeline::{analyze_snapshots, Analyzer};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
