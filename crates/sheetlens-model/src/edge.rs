//! Cross-sheet dependency edges

use crate::sheet::CellLocation;
use serde::{Deserialize, Serialize};

/// How one sheet depends on another
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    /// A lookup-family formula retrieves values from the target sheet
    Lookup,
    /// Any other formula reads from the target sheet
    FormulaDependency,
    /// Plain data relation supplied from outside formula scanning
    DataReference,
}

impl DependencyKind {
    /// Stable kebab-case name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lookup => "lookup",
            Self::FormulaDependency => "formula-dependency",
            Self::DataReference => "data-reference",
        }
    }
}

impl std::fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed relation: formulas in `from_sheet` read data from `to_sheet`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEdge {
    /// Sheet containing the formula
    pub from_sheet: String,
    /// Sheet being referenced
    pub to_sheet: String,
    /// Relation kind
    pub kind: DependencyKind,
    /// First formula cell that produced this edge
    pub sample_location: CellLocation,
}

impl DependencyEdge {
    /// Create new edge
    #[inline]
    #[must_use]
    pub fn new(
        from_sheet: impl Into<String>,
        to_sheet: impl Into<String>,
        kind: DependencyKind,
        sample_location: CellLocation,
    ) -> Self {
        Self {
            from_sheet: from_sheet.into(),
            to_sheet: to_sheet.into(),
            kind,
            sample_location,
        }
    }

    /// Deduplication key
    #[inline]
    #[must_use]
    pub fn key(&self) -> (&str, &str, DependencyKind) {
        (&self.from_sheet, &self.to_sheet, self.kind)
    }
}
