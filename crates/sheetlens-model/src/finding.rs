//! Structural patterns, business-logic findings and the intent narrative

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Structural role a sheet can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    /// Referenced by at least two other sheets
    MasterData,
    /// Dense with formulas
    CalculationSheet,
    /// Heavy use of SUM/AVERAGE/COUNT style functions
    AggregationSheet,
    /// Heavy use of VLOOKUP/INDEX style functions
    LookupSheet,
}

impl PatternKind {
    /// All kinds in detection order
    pub const ALL: [PatternKind; 4] = [
        PatternKind::MasterData,
        PatternKind::CalculationSheet,
        PatternKind::AggregationSheet,
        PatternKind::LookupSheet,
    ];

    /// Stable kebab-case name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MasterData => "master-data",
            Self::CalculationSheet => "calculation-sheet",
            Self::AggregationSheet => "aggregation-sheet",
            Self::LookupSheet => "lookup-sheet",
        }
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sheets tagged with one structural role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMatch {
    /// Role
    pub pattern_name: PatternKind,
    /// Tagged sheets
    pub sheet_names: BTreeSet<String>,
    /// Human-readable explanation
    pub rationale: String,
}

impl PatternMatch {
    /// Whether the given sheet carries this tag
    #[inline]
    #[must_use]
    pub fn contains(&self, sheet: &str) -> bool {
        self.sheet_names.contains(sheet)
    }
}

/// Business-logic family detected from formula tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogicKind {
    /// More than three IF formulas
    ConditionalLogic,
    /// ISERROR / IFERROR / ISBLANK present
    DataValidation,
    /// DATE / TODAY / NOW / YEAR / MONTH present
    DateTimeProcessing,
    /// CONCATENATE / LEFT / RIGHT / MID / TRIM present
    TextProcessing,
}

impl LogicKind {
    /// Stable kebab-case name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConditionalLogic => "conditional-logic",
            Self::DataValidation => "data-validation",
            Self::DateTimeProcessing => "date-time-processing",
            Self::TextProcessing => "text-processing",
        }
    }
}

impl std::fmt::Display for LogicKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One business-logic family found on one sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessLogicFinding {
    /// Logic family
    pub logic_kind: LogicKind,
    /// Sheet exhibiting it
    pub sheet_name: String,
    /// Human-readable explanation
    pub rationale: String,
}

/// Best-effort hypothesis about what the spreadsheet author wanted
///
/// Exactly one per run. Refinements only ever append.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentInference {
    /// Primary goal
    pub main_goal: String,
    /// Likely business setting
    pub business_context: String,
    /// How the workbook is wired together
    pub workflow_narrative: String,
    /// Problems the design appears to address, in discovery order
    pub pain_points: Vec<String>,
}

impl IntentInference {
    /// Append a pain point unless an identical one is already listed
    pub fn push_pain_point(&mut self, point: impl Into<String>) {
        let point = point.into();
        if !self.pain_points.contains(&point) {
            self.pain_points.push(point);
        }
    }

    /// Append a clause to the workflow narrative
    pub fn append_workflow_clause(&mut self, clause: &str) {
        if !self.workflow_narrative.is_empty() {
            self.workflow_narrative.push(' ');
        }
        self.workflow_narrative.push_str(clause);
    }
}
