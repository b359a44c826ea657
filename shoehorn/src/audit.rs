//! Audit trail records: amended vertices, weak and failed polygons, and the per survey vertex
//! diet summary.

use crate::{
    core::{math::Vector2, traits::Real},
    geometry::PolygonId,
    reassemble::FailureKind,
    topology::{ArcId, NodeId},
};
use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What an [AmendedVertex] records.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AmendedKind {
    /// Interior vertex removed from an arc.
    Vertex,
    /// Node relocated by the node angle pass.
    Node,
}

/// Vertex removed or node relocated by the acute angle remover.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AmendedVertex<T = f64> {
    /// Position before the change.
    pub position: Vector2<T>,
    /// Angle that triggered the change.
    pub angle_degrees: T,
    pub arc: ArcId,
    pub kind: AmendedKind,
}

/// Why a polygon was reported as weak.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WeakCause {
    /// Lost one or more arcs to collapse during acute angle removal.
    Tweezer,
    /// Reassembled to zero area.
    Reassembly,
    /// Got no arcs at all from the boundary linework (upstream spatial mismatch).
    ClusterTolerance,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeakPolygon {
    pub id: PolygonId,
    pub cause: WeakCause,
}

/// Polygon that produced no output geometry.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PolygonFailure {
    pub id: PolygonId,
    pub kind: FailureKind,
}

/// Result of acute angle removal on one batch.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TweezerReport<T = f64> {
    pub amended: Vec<AmendedVertex<T>>,
    /// Polygons that lost at least one arc, including destroyed ones.
    pub weak: BTreeSet<PolygonId>,
    /// Polygons whose arc list emptied.
    pub destroyed: BTreeSet<PolygonId>,
    pub collapsed_arcs: Vec<ArcId>,
    /// Simple nodes still below the minimum angle after the node pass.
    pub acute_nodes: Vec<NodeId>,
}

impl<T> Default for TweezerReport<T> {
    fn default() -> Self {
        Self {
            amended: Vec::new(),
            weak: BTreeSet::new(),
            destroyed: BTreeSet::new(),
            collapsed_arcs: Vec::new(),
            acute_nodes: Vec::new(),
        }
    }
}

impl<T> TweezerReport<T>
where
    T: Real,
{
    /// Number of records of `kind`.
    pub fn count(&self, kind: AmendedKind) -> usize {
        self.amended.iter().filter(|a| a.kind == kind).count()
    }
}

/// One row of the vertex diet summary.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct DietRow {
    /// Survey area symbol, `None` for the total row.
    pub symbol: Option<String>,
    pub polygons_before: usize,
    pub polygons_after: usize,
    pub vertices_before: usize,
    pub vertices_after: usize,
}

impl DietRow {
    /// Fraction of vertices removed, zero when there were no vertices.
    ///
    /// # Examples
    ///
    /// ```
    /// # use shoehorn::audit::DietRow;
    /// let row = DietRow {
    ///     symbol: Some("AK600".to_string()),
    ///     polygons_before: 10,
    ///     polygons_after: 9,
    ///     vertices_before: 400,
    ///     vertices_after: 300,
    /// };
    /// assert_eq!(row.vertex_reduction(), 0.25);
    /// ```
    pub fn vertex_reduction(&self) -> f64 {
        if self.vertices_before == 0 {
            return 0.0;
        }

        1.0 - self.vertices_after as f64 / self.vertices_before as f64
    }
}
