use crate::{
    core::{math::Vector2, traits::Real},
    geometry::PolygonId,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dense index into the node table of a [TopologyBatch](super::TopologyBatch).
pub type NodeId = usize;
/// Dense index into the arc table of a [TopologyBatch](super::TopologyBatch), equal to the id of
/// the boundary segment the arc was built from.
pub type ArcId = usize;

/// Direction an arc is traversed by a polygon.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Head to tail, used by the polygon on the right of the arc.
    Forward,
    /// Tail to head, used by the polygon on the left of the arc.
    Reverse,
}

impl Orientation {
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Reverse,
            Orientation::Reverse => Orientation::Forward,
        }
    }
}

/// Which end of an arc.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum End {
    Head,
    Tail,
}

/// One end of an arc touching a node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ArcEnd {
    pub arc: ArcId,
    pub end: End,
}

impl ArcEnd {
    #[inline]
    pub fn new(arc: ArcId, end: End) -> Self {
        Self { arc, end }
    }
}

/// Topological node: a rounded coordinate where arc ends meet.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T = f64> {
    pub pos: Vector2<T>,
    /// Live arc ends touching the node, a loop arc contributes both of its ends.
    pub ends: Vec<ArcEnd>,
    /// Touches the frozen outer boundary, never moved.
    pub frozen: bool,
    /// An incident loop arc collapsed here, never realigned.
    pub pinned: bool,
}

impl<T> Node<T>
where
    T: Real,
{
    pub fn new(pos: Vector2<T>) -> Self {
        Self {
            pos,
            ends: Vec::new(),
            frozen: false,
            pinned: false,
        }
    }

    /// Signed incidence count, negative for frozen nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use shoehorn::core::math::*;
    /// # use shoehorn::topology::*;
    /// let mut node = Node::new(Vector2::new(1.0, 1.0));
    /// node.ends = vec![ArcEnd::new(0, End::Head), ArcEnd::new(1, End::Tail), ArcEnd::new(2, End::Head)];
    /// assert_eq!(node.incidence(), 3);
    /// assert!(node.is_simple());
    ///
    /// node.frozen = true;
    /// assert_eq!(node.incidence(), -3);
    /// assert!(!node.is_simple());
    /// ```
    pub fn incidence(&self) -> i32 {
        let count = self.ends.len() as i32;
        if self.frozen {
            -count
        } else {
            count
        }
    }

    /// Exactly 3 incident arc ends and free to move.
    #[inline]
    pub fn is_simple(&self) -> bool {
        self.ends.len() == 3 && !self.frozen && !self.pinned
    }
}

/// Boundary arc between two nodes.
///
/// `vertices[0]` is always the head node coordinate and the last vertex the tail node coordinate.
/// The polygon on the right is always present, an arc with only a left polygon is reversed when
/// the topology is built.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Arc<T = f64> {
    pub vertices: Vec<Vector2<T>>,
    pub head: NodeId,
    pub tail: NodeId,
    pub right: Option<PolygonId>,
    pub left: Option<PolygonId>,
    /// Lies on the frozen outer survey boundary, never edited.
    pub frozen: bool,
}

impl<T> Arc<T>
where
    T: Real,
{
    /// Head and tail are the same node.
    #[inline]
    pub fn is_loop(&self) -> bool {
        self.head == self.tail
    }

    #[inline]
    pub fn node(&self, end: End) -> NodeId {
        match end {
            End::Head => self.head,
            End::Tail => self.tail,
        }
    }

    /// Fewer than 2 vertices, or exactly 2 equal vertices.
    pub fn is_degenerate(&self) -> bool {
        match self.vertices.as_slice() {
            [] | [_] => true,
            [a, b] => a == b,
            _ => false,
        }
    }

    /// Vertex at `end`.
    #[inline]
    pub fn end_vertex(&self, end: End) -> Option<Vector2<T>> {
        match end {
            End::Head => self.vertices.first().copied(),
            End::Tail => self.vertices.last().copied(),
        }
    }

    /// Vertex next to the vertex at `end` (the direction the arc leaves its node).
    pub fn second_vertex(&self, end: End) -> Option<Vector2<T>> {
        let n = self.vertices.len();
        if n < 2 {
            return None;
        }

        match end {
            End::Head => Some(self.vertices[1]),
            End::Tail => Some(self.vertices[n - 2]),
        }
    }

    pub(crate) fn set_end_vertex(&mut self, end: End, pos: Vector2<T>) {
        let slot = match end {
            End::Head => self.vertices.first_mut(),
            End::Tail => self.vertices.last_mut(),
        };

        if let Some(v) = slot {
            *v = pos;
        }
    }

    /// Polygons on either side, right first, without duplicates.
    pub fn polygons(&self) -> impl Iterator<Item = PolygonId> + '_ {
        let left = self.left.filter(|l| Some(*l) != self.right);
        self.right.into_iter().chain(left)
    }

    /// Vertex chain in the direction a polygon with `orientation` traverses it.
    pub fn oriented_vertices(&self, orientation: Orientation) -> Vec<Vector2<T>> {
        match orientation {
            Orientation::Forward => self.vertices.clone(),
            Orientation::Reverse => self.vertices.iter().rev().copied().collect(),
        }
    }
}

/// Arc list of one polygon.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRecord {
    pub id: PolygonId,
    pub arcs: Vec<(ArcId, Orientation)>,
}

impl PolygonRecord {
    pub fn new(id: PolygonId) -> Self {
        Self {
            id,
            arcs: Vec::new(),
        }
    }
}
