//! Mermaid diagram synthesis

use sheetlens_model::{
    DependencyEdge, DependencyKind, Diagram, DiagramEdge, DiagramKind, DiagramNode, NodeClass,
    SheetSnapshot,
};
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

/// Formula count above which a sheet renders as a complex-calculation node
pub const COMPLEX_NODE_MIN_FORMULAS: usize = 20;

/// Node class by formula count
#[must_use]
pub fn node_class(formula_count: usize) -> NodeClass {
    match formula_count {
        0 => NodeClass::Data,
        n if n > COMPLEX_NODE_MIN_FORMULAS => NodeClass::ComplexCalculation,
        _ => NodeClass::Standard,
    }
}

/// Mermaid style directive for a node class
#[must_use]
pub fn node_style(class: NodeClass) -> &'static str {
    match class {
        NodeClass::Data => "fill:#e3f2fd,stroke:#1976d2",
        NodeClass::ComplexCalculation => "fill:#fff3e0,stroke:#f57c00",
        NodeClass::Standard => "fill:#f3e5f5,stroke:#7b1fa2",
    }
}

/// Short label for an edge kind
#[must_use]
pub fn edge_label(kind: DependencyKind) -> &'static str {
    match kind {
        DependencyKind::Lookup => "조회",
        DependencyKind::FormulaDependency => "참조",
        DependencyKind::DataReference => "데이터",
    }
}

fn edge_arrow(kind: DependencyKind) -> &'static str {
    match kind {
        DependencyKind::Lookup => "-.조회.->",
        DependencyKind::FormulaDependency => "-->|참조|",
        DependencyKind::DataReference => "-->|데이터|",
    }
}

/// Diagram-safe identifier for a sheet name
///
/// Non-alphanumeric characters become `_`; a leading digit gets an `S` prefix.
#[must_use]
pub fn sanitize_node_id(name: &str) -> String {
    let mut id: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if id.starts_with(|c: char| c.is_ascii_digit()) {
        id.insert(0, 'S');
    }
    if id.is_empty() {
        id.push('_');
    }
    id
}

/// Sheet name made safe inside a quoted Mermaid label
#[must_use]
pub fn escape_label(name: &str) -> String {
    name.replace('"', "#quot;")
}

/// Assigns unique node ids, suffixing collisions
#[derive(Debug, Default)]
struct NodeIds {
    by_sheet: HashMap<String, String>,
    taken: HashSet<String>,
}

impl NodeIds {
    fn id_for(&mut self, sheet: &str) -> String {
        if let Some(id) = self.by_sheet.get(sheet) {
            return id.clone();
        }
        let base = sanitize_node_id(sheet);
        let mut id = base.clone();
        let mut n = 2;
        while self.taken.contains(&id) {
            id = format!("{base}_{n}");
            n += 1;
        }
        self.taken.insert(id.clone());
        self.by_sheet.insert(sheet.to_string(), id.clone());
        id
    }
}

/// Render sheets and edges as a top-to-bottom Mermaid graph
#[must_use]
pub fn render_diagram(sheets: &[SheetSnapshot], edges: &[DependencyEdge]) -> Diagram {
    let mut ids = NodeIds::default();
    let mut mermaid = String::from("graph TB\n\n");

    let nodes: Vec<DiagramNode> = sheets
        .iter()
        .map(|sheet| {
            let id = ids.id_for(&sheet.name);
            let count = sheet.formula_count();
            let class = node_class(count);
            let label = format!("{}<br/>{count}개 수식", escape_label(&sheet.name));
            let shape = match class {
                NodeClass::ComplexCalculation => format!("{{\"{label}\"}}"),
                _ => format!("[\"{label}\"]"),
            };
            let _ = writeln!(mermaid, "  {id}{shape}");
            let _ = writeln!(mermaid, "  style {id} {}", node_style(class));
            DiagramNode {
                id,
                sheet_name: sheet.name.clone(),
                label,
                class,
            }
        })
        .collect();

    mermaid.push('\n');

    let diagram_edges: Vec<DiagramEdge> = edges
        .iter()
        .map(|edge| {
            let from_id = ids.id_for(&edge.from_sheet);
            let to_id = ids.id_for(&edge.to_sheet);
            let _ = writeln!(mermaid, "  {from_id} {} {to_id}", edge_arrow(edge.kind));
            DiagramEdge {
                from_id,
                to_id,
                label: edge_label(edge.kind).to_string(),
                kind: edge.kind,
            }
        })
        .collect();

    // No trailing newline, matching line-joined output
    while mermaid.ends_with('\n') {
        mermaid.pop();
    }

    Diagram {
        kind: DiagramKind::Flowchart,
        mermaid,
        nodes,
        edges: diagram_edges,
    }
}
