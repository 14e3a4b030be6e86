//! Dependency edge construction
//!
//! Every formula is scanned for sheet qualifiers. A qualifier produces an
//! edge `containing sheet -> referenced sheet` when it names a known sheet
//! other than the containing one. The edge kind comes from the formula's
//! leading function: lookup family gives [`DependencyKind::Lookup`],
//! everything else [`DependencyKind::FormulaDependency`].
//!
//! At most one edge exists per `(from, to, kind)` triple; a lookup edge and
//! a formula-dependency edge may coexist for the same ordered pair.

use sheetlens_formula::families::is_lookup_edge_tag;
use sheetlens_formula::sheet_qualifiers;
use sheetlens_model::{DependencyEdge, DependencyKind, FormulaRecord, SheetSnapshot};
use std::collections::HashSet;

/// Incremental edge collector with deduplication
#[derive(Debug)]
pub struct EdgeBuilder<'a> {
    known: HashSet<&'a str>,
    seen: HashSet<(String, String, DependencyKind)>,
    edges: Vec<DependencyEdge>,
}

impl<'a> EdgeBuilder<'a> {
    /// Create builder for the given set of sheet names
    #[must_use]
    pub fn new(known_sheets: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            known: known_sheets.into_iter().collect(),
            seen: HashSet::new(),
            edges: Vec::new(),
        }
    }

    /// Scan one formula of `sheet`
    pub fn add_formula(&mut self, sheet: &str, formula: &FormulaRecord) {
        let kind = if is_lookup_edge_tag(&formula.function_tag) {
            DependencyKind::Lookup
        } else {
            DependencyKind::FormulaDependency
        };

        for target in sheet_qualifiers(&formula.raw_text) {
            if target == sheet || !self.known.contains(target.as_str()) {
                continue;
            }
            self.push(DependencyEdge::new(sheet, target, kind, formula.location));
        }
    }

    /// Add an externally supplied edge, subject to the same deduplication
    pub fn push(&mut self, edge: DependencyEdge) {
        let key = (edge.from_sheet.clone(), edge.to_sheet.clone(), edge.kind);
        if self.seen.insert(key) {
            tracing::trace!(
                from = %edge.from_sheet,
                to = %edge.to_sheet,
                kind = %edge.kind,
                "new dependency edge"
            );
            self.edges.push(edge);
        }
    }

    /// Scan every formula of a sheet
    pub fn add_sheet(&mut self, sheet: &SheetSnapshot) {
        for formula in &sheet.formulas {
            self.add_formula(&sheet.name, formula);
        }
    }

    /// Number of distinct edges so far
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether no edge has been found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Finish, returning edges in discovery order
    #[must_use]
    pub fn finish(self) -> Vec<DependencyEdge> {
        self.edges
    }
}

/// Names of all harvested sheets
#[must_use]
pub fn known_sheet_names(sheets: &[SheetSnapshot]) -> Vec<&str> {
    sheets.iter().map(|s| s.name.as_str()).collect()
}

/// Build the deduplicated edge set for a run
///
/// `known_sheets` is the full list of sheet names in the spreadsheet, which
/// may include sheets that were not harvested.
#[must_use]
pub fn build_edges<'a>(
    sheets: &[SheetSnapshot],
    known_sheets: impl IntoIterator<Item = &'a str>,
) -> Vec<DependencyEdge> {
    let mut builder = EdgeBuilder::new(known_sheets);
    for sheet in sheets {
        builder.add_sheet(sheet);
    }
    tracing::debug!(edges = builder.len(), "dependency edges built");
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetlens_formula::record_for;
    use sheetlens_model::CellLocation;

    fn sheet(name: &str, formulas: &[&str]) -> SheetSnapshot {
        let records = formulas
            .iter()
            .enumerate()
            .filter_map(|(i, f)| record_for(f, CellLocation::new(i as u32, 0)))
            .collect();
        SheetSnapshot::new(name, 10, 5, records)
    }

    #[test]
    fn lookup_edge_from_vlookup() {
        let sheets = vec![
            sheet("Orders", &["=SUM(A1:A10)", "=VLOOKUP(A1,'Products'!A:C,2,FALSE)"]),
            sheet("Products", &[]),
        ];
        let edges = build_edges(&sheets, known_sheet_names(&sheets));

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].from_sheet, "Orders");
        assert_eq!(edges[0].to_sheet, "Products");
        assert_eq!(edges[0].kind, DependencyKind::Lookup);
        assert_eq!(edges[0].sample_location, CellLocation::new(1, 0));
    }

    #[test]
    fn repeated_references_collapse() {
        let sheets = vec![
            sheet("Report", &["=Data!A1+Data!A2", "=SUM(Data!B1:B9)"]),
            sheet("Data", &[]),
        ];
        let edges = build_edges(&sheets, known_sheet_names(&sheets));
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].kind, DependencyKind::FormulaDependency);
    }

    #[test]
    fn lookup_and_dependency_coexist() {
        let sheets = vec![
            sheet("Report", &["=Data!A1", "=INDEX(Data!A:A,3)"]),
            sheet("Data", &[]),
        ];
        let edges = build_edges(&sheets, known_sheet_names(&sheets));
        let kinds: Vec<_> = edges.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![DependencyKind::FormulaDependency, DependencyKind::Lookup]
        );
    }

    #[test]
    fn self_and_unknown_references_are_ignored() {
        let sheets = vec![sheet(
            "Solo",
            &["=Solo!A1*2", "=CONCATENATE(\"Hello!\",Ghost!A1)"],
        )];
        assert!(build_edges(&sheets, known_sheet_names(&sheets)).is_empty());
    }

    #[test]
    fn unharvested_known_sheet_is_a_valid_target() {
        let sheets = vec![sheet("Report", &["=Archive!A1"])];
        let edges = build_edges(&sheets, ["Report", "Archive"]);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to_sheet, "Archive");
    }

    #[test]
    fn external_edges_are_deduplicated() {
        let mut builder = EdgeBuilder::new(["A", "B"]);
        let edge = DependencyEdge::new("A", "B", DependencyKind::DataReference, CellLocation::new(0, 0));
        builder.push(edge.clone());
        builder.push(edge);
        assert_eq!(builder.len(), 1);
    }
}
