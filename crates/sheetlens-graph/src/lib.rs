//! sheetlens graph
//!
//! Turns harvested formulas into cross-sheet dependency edges and offers a
//! graph view over them.
//!
//! - [`build_edges`]: deduplicated [`DependencyEdge`](sheetlens_model::DependencyEdge) set
//! - [`SheetGraph`]: petgraph-backed queries (referencing sheets, cycles, flow order)

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod builder;
pub mod sheet_graph;

pub use builder::{build_edges, known_sheet_names, EdgeBuilder};
pub use sheet_graph::SheetGraph;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
