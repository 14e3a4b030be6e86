//! Diagram, narrative report and the root analysis aggregate

use crate::edge::{DependencyEdge, DependencyKind};
use crate::finding::{BusinessLogicFinding, IntentInference, PatternKind, PatternMatch};
use crate::sheet::{SheetSnapshot, SpreadsheetId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Diagram flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    /// Mermaid flowchart
    #[default]
    Flowchart,
}

/// Visual class of a sheet node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeClass {
    /// No formulas at all
    Data,
    /// Between one and twenty formulas
    Standard,
    /// More than twenty formulas
    ComplexCalculation,
}

/// One sheet in the diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramNode {
    /// Diagram-safe identifier
    pub id: String,
    /// Source sheet name
    pub sheet_name: String,
    /// Rendered label
    pub label: String,
    /// Visual class
    pub class: NodeClass,
}

/// One dependency in the diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramEdge {
    /// Source node id
    pub from_id: String,
    /// Target node id
    pub to_id: String,
    /// Edge label
    pub label: String,
    /// Underlying relation kind
    pub kind: DependencyKind,
}

/// Graph diagram description, renderable by any Mermaid front end
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    /// Diagram flavour
    #[serde(rename = "type")]
    pub kind: DiagramKind,
    /// Mermaid source text
    pub mermaid: String,
    /// Nodes in sheet order
    pub nodes: Vec<DiagramNode>,
    /// Edges in edge-set order
    pub edges: Vec<DiagramEdge>,
}

/// Coarse complexity bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplexityLevel {
    /// Score below 20
    Simple,
    /// Score below 50
    Moderate,
    /// Score below 80
    Complex,
    /// Score of 80 or more
    VeryComplex,
}

/// Complexity bucket with supporting reasons
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityAssessment {
    /// Bucket
    pub level: ComplexityLevel,
    /// Reasons, most general first
    pub reasons: Vec<String>,
}

/// Narrative description of one sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetDescription {
    /// Sheet name
    pub sheet_name: String,
    /// Inferred role
    pub role: String,
    /// Short feature list
    pub key_features: Vec<String>,
}

/// Narrative description of one edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipDescription {
    /// Sheet containing the formula
    pub from: String,
    /// Referenced sheet
    pub to: String,
    /// Relation kind
    #[serde(rename = "type")]
    pub kind: DependencyKind,
    /// Sentence describing the relation
    pub description: String,
}

/// Natural-language report assembled from all findings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureReport {
    /// One-sentence summary
    pub overview: String,
    /// Likely purpose of the workbook
    pub purpose: String,
    /// How data moves between sheets
    pub data_flow: String,
    /// Per-sheet descriptions, in sheet order
    pub sheet_descriptions: Vec<SheetDescription>,
    /// Complexity bucket
    pub complexity: ComplexityAssessment,
    /// Improvement suggestions
    pub recommendations: Vec<String>,
    /// Per-edge descriptions
    pub relationships: Vec<RelationshipDescription>,
    /// Run-wide formula family counts
    pub formula_categories: BTreeMap<String, usize>,
}

/// Harvest bookkeeping surfaced with the result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestStats {
    /// Batches requested
    pub total_batches: usize,
    /// Batches that failed and contributed nothing
    pub failed_batches: usize,
}

/// Root aggregate returned by one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Source identifier
    pub spreadsheet_id: SpreadsheetId,
    /// Spreadsheet title
    pub title: String,
    /// Harvested sheets
    pub sheets: Vec<SheetSnapshot>,
    /// Deduplicated dependency edges
    pub edges: Vec<DependencyEdge>,
    /// Structural role tags
    pub patterns: Vec<PatternMatch>,
    /// Business-logic findings
    pub logic_findings: Vec<BusinessLogicFinding>,
    /// Intent narrative
    pub intent: IntentInference,
    /// Run-level complexity, always within `0..=100`
    pub complexity_score: u8,
    /// Dependency diagram
    pub diagram: Diagram,
    /// Whether any sheet was sampled
    pub used_sampling: bool,
    /// Narrative report
    pub report: StructureReport,
    /// Harvest bookkeeping
    #[serde(default)]
    pub harvest_stats: HarvestStats,
    /// Completion time of the run
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// Total formulas across all sheets
    #[must_use]
    pub fn total_formulas(&self) -> usize {
        self.sheets.iter().map(SheetSnapshot::formula_count).sum()
    }

    /// Match for one pattern kind, if any sheet carries it
    #[must_use]
    pub fn pattern(&self, kind: PatternKind) -> Option<&PatternMatch> {
        self.patterns.iter().find(|p| p.pattern_name == kind)
    }

    /// Whether the sheet carries the given pattern tag
    #[must_use]
    pub fn sheet_has_pattern(&self, sheet: &str, kind: PatternKind) -> bool {
        self.pattern(kind).is_some_and(|p| p.contains(sheet))
    }

    /// Sheet by name
    #[must_use]
    pub fn sheet(&self, name: &str) -> Option<&SheetSnapshot> {
        self.sheets.iter().find(|s| s.name == name)
    }
}
