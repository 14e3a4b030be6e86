//! sheetlens insight
//!
//! Stages four to six of an analysis run. Given harvested sheets and their
//! dependency edges this crate:
//!
//! - tags sheets with structural roles ([`patterns`])
//! - finds business-logic families ([`logic`])
//! - selects and fills an intent narrative ([`intent`])
//! - scores run complexity ([`score`])
//! - renders a Mermaid diagram ([`diagram`]) and a narrative report ([`report`])
//!
//! Nothing here fails: every stage has a fallback.
//!
//! ```
//! use sheetlens_insight::synthesize;
//!
//! let insights = synthesize(&[], &[], &[]);
//! assert_eq!(insights.complexity_score, 0);
//! assert!(insights.report.data_flow.contains("독립적으로"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod diagram;
pub mod intent;
pub mod logic;
pub mod patterns;
pub mod report;
pub mod score;

pub use diagram::{escape_label, render_diagram, sanitize_node_id};
pub use intent::{infer_intent, IntentSignals, IntentTemplate};
pub use logic::detect_logic;
pub use patterns::detect_patterns;
pub use report::{build_report, render_text, ReportInputs};
pub use score::run_complexity;

use sheetlens_graph::SheetGraph;
use sheetlens_model::{
    BusinessLogicFinding, DependencyEdge, Diagram, IntentInference, PatternMatch, SheetSnapshot,
    StructureReport,
};
use std::collections::BTreeSet;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output of stages four to six
#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    /// Structural role tags
    pub patterns: Vec<PatternMatch>,
    /// Business-logic findings
    pub logic_findings: Vec<BusinessLogicFinding>,
    /// Intent narrative
    pub intent: IntentInference,
    /// Run-level complexity within `0..=100`
    pub complexity_score: u8,
    /// Dependency diagram
    pub diagram: Diagram,
    /// Narrative report
    pub report: StructureReport,
}

/// Run every insight stage over one harvested workbook
///
/// `known_sheets` lists every sheet in the source, harvested or not; sheets
/// that only appear as edge targets still become graph nodes.
#[must_use]
pub fn synthesize(
    sheets: &[SheetSnapshot],
    edges: &[DependencyEdge],
    known_sheets: &[&str],
) -> Insights {
    let names: BTreeSet<&str> = sheets
        .iter()
        .map(|s| s.name.as_str())
        .chain(known_sheets.iter().copied())
        .collect();
    let graph = SheetGraph::new(names.iter().copied(), edges);

    let referenced: BTreeSet<&str> = edges.iter().map(|e| e.to_sheet.as_str()).collect();
    let referenced: Vec<&str> = referenced.into_iter().collect();

    let patterns = detect_patterns(sheets, &graph, &referenced);
    let logic_findings = detect_logic(sheets);
    let complexity_score = run_complexity(sheets, edges);

    let signals =
        IntentSignals::from_patterns(&patterns, complexity_score, edges.len(), sheets.len());
    let intent = infer_intent(&signals, &logic_findings);
    let diagram = render_diagram(sheets, edges);
    let report = build_report(&ReportInputs {
        sheets,
        edges,
        graph: &graph,
        patterns: &patterns,
        findings: &logic_findings,
        complexity: complexity_score,
    });

    tracing::debug!(
        patterns = patterns.len(),
        findings = logic_findings.len(),
        complexity = complexity_score,
        "insights synthesized"
    );

    Insights {
        patterns,
        logic_findings,
        intent,
        complexity_score,
        diagram,
        report,
    }
}
