//! Graph view over dependency edges
//!
//! Nodes are sheet names, a directed edge `a -> b` means `a` reads from `b`.
//! Parallel edges of different kinds between the same pair collapse into one
//! graph edge whose weight lists the kinds.

use petgraph::algo::{is_cyclic_directed, tarjan_scc, toposort};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use sheetlens_model::{DependencyEdge, DependencyKind};
use std::collections::HashMap;

/// Borrowed sheet graph for one analysis run
#[derive(Debug, Clone)]
pub struct SheetGraph<'a> {
    names: Vec<&'a str>,
    index: HashMap<&'a str, usize>,
    inner: DiGraphMap<usize, Vec<DependencyKind>>,
}

impl<'a> SheetGraph<'a> {
    /// Build graph from sheet names and edges
    ///
    /// Every sheet becomes a node even when no edge touches it.
    #[must_use]
    pub fn new(
        sheets: impl IntoIterator<Item = &'a str>,
        edges: &'a [DependencyEdge],
    ) -> Self {
        let mut graph = Self {
            names: Vec::new(),
            index: HashMap::new(),
            inner: DiGraphMap::new(),
        };
        for sheet in sheets {
            graph.intern(sheet);
        }
        for edge in edges {
            let from = graph.intern(&edge.from_sheet);
            let to = graph.intern(&edge.to_sheet);
            match graph.inner.edge_weight_mut(from, to) {
                Some(kinds) => {
                    if !kinds.contains(&edge.kind) {
                        kinds.push(edge.kind);
                    }
                }
                None => {
                    graph.inner.add_edge(from, to, vec![edge.kind]);
                }
            }
        }
        graph
    }

    fn intern(&mut self, name: &'a str) -> usize {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name);
        self.index.insert(name, id);
        self.inner.add_node(id);
        id
    }

    fn neighbors(&self, sheet: &str, dir: Direction) -> Vec<&'a str> {
        let Some(&id) = self.index.get(sheet) else {
            return Vec::new();
        };
        let mut out: Vec<_> = self
            .inner
            .neighbors_directed(id, dir)
            .map(|n| self.names[n])
            .collect();
        out.sort_unstable();
        out
    }

    fn has_neighbor(&self, id: usize, dir: Direction) -> bool {
        self.inner.neighbors_directed(id, dir).next().is_some()
    }

    fn collect_sorted(&self, ids: impl Iterator<Item = usize>) -> Vec<&'a str> {
        let mut out: Vec<_> = ids.map(|n| self.names[n]).collect();
        out.sort_unstable();
        out
    }

    /// Number of sheets
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of distinct ordered sheet pairs with at least one edge
    #[inline]
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Sheets whose formulas read from `sheet`
    #[must_use]
    pub fn referencing_sheets(&self, sheet: &str) -> Vec<&'a str> {
        self.neighbors(sheet, Direction::Incoming)
    }

    /// Sheets that `sheet` reads from
    #[must_use]
    pub fn dependencies(&self, sheet: &str) -> Vec<&'a str> {
        self.neighbors(sheet, Direction::Outgoing)
    }

    /// Count of distinct sheets referencing `sheet`
    #[inline]
    #[must_use]
    pub fn in_degree(&self, sheet: &str) -> usize {
        self.index.get(sheet).map_or(0, |&id| {
            self.inner.neighbors_directed(id, Direction::Incoming).count()
        })
    }

    /// Edge kinds between an ordered pair
    #[must_use]
    pub fn kinds_between(&self, from: &str, to: &str) -> &[DependencyKind] {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&a), Some(&b)) => self.inner.edge_weight(a, b).map_or(&[][..], Vec::as_slice),
            _ => &[],
        }
    }

    /// Sheet with no edge in either direction
    #[must_use]
    pub fn is_isolated(&self, sheet: &str) -> bool {
        self.index.get(sheet).is_some_and(|&id| {
            !self.has_neighbor(id, Direction::Incoming) && !self.has_neighbor(id, Direction::Outgoing)
        })
    }

    /// Whether any circular reference chain exists between sheets
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.inner)
    }

    /// Groups of sheets that reference each other in a loop
    ///
    /// Each group is sorted by name, groups are sorted by their first member.
    #[must_use]
    pub fn circular_groups(&self) -> Vec<Vec<&'a str>> {
        let mut groups: Vec<Vec<&'a str>> = tarjan_scc(&self.inner)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| self.collect_sorted(scc.into_iter()))
            .collect();
        groups.sort();
        groups
    }

    /// Sheets that are read from but read nothing themselves
    #[must_use]
    pub fn data_sources(&self) -> Vec<&'a str> {
        self.collect_sorted(self.inner.nodes().filter(|&n| {
            !self.has_neighbor(n, Direction::Outgoing) && self.has_neighbor(n, Direction::Incoming)
        }))
    }

    /// Sheets that read from others and are read by none
    #[must_use]
    pub fn data_sinks(&self) -> Vec<&'a str> {
        self.collect_sorted(self.inner.nodes().filter(|&n| {
            !self.has_neighbor(n, Direction::Incoming) && self.has_neighbor(n, Direction::Outgoing)
        }))
    }

    /// Provider-first order: every sheet appears after the sheets it reads
    ///
    /// Returns `None` when circular references make such an order impossible.
    #[must_use]
    pub fn flow_order(&self) -> Option<Vec<&'a str>> {
        let order = toposort(&self.inner, None).ok()?;
        Some(order.into_iter().rev().map(|n| self.names[n]).collect())
    }
}
