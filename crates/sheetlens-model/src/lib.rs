//! sheetlens model
//!
//! Domain types shared by every stage of the analysis pipeline:
//! - Harvested sheets and their formulas ([`SheetSnapshot`], [`FormulaRecord`])
//! - Cross-sheet relations ([`DependencyEdge`])
//! - Structural and business-logic findings ([`PatternMatch`], [`BusinessLogicFinding`])
//! - The inferred narrative ([`IntentInference`])
//! - The root aggregate returned to callers ([`AnalysisResult`])
//!
//! All types are plain data. They are created once per analysis run and are
//! read-only after the run returns them.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod edge;
pub mod finding;
pub mod report;
pub mod sheet;

pub use edge::{DependencyEdge, DependencyKind};
pub use finding::{BusinessLogicFinding, IntentInference, LogicKind, PatternKind, PatternMatch};
pub use report::{
    AnalysisResult, ComplexityAssessment, ComplexityLevel, Diagram, DiagramEdge, DiagramKind,
    DiagramNode, HarvestStats, NodeClass, RelationshipDescription, SheetDescription,
    StructureReport,
};
pub use sheet::{
    column_letters, CellLocation, DataRange, FormulaCategory, FormulaRecord, SheetSnapshot,
    SpreadsheetId,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with analysis results
    pub use crate::{
        AnalysisResult, BusinessLogicFinding, CellLocation, DependencyEdge, DependencyKind,
        FormulaRecord, IntentInference, LogicKind, PatternKind, PatternMatch, SheetSnapshot,
    };
}
