use super::{Arc, ArcEnd, ArcId, End, Node, NodeId, Orientation, PolygonRecord, TopologyBatch};
use crate::{
    core::{
        math::{CoordKey, Precision, Vector2},
        traits::Real,
    },
    error::{MismatchedSegment, TopologyError},
    geometry::PolygonId,
};
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Polygon boundary line between two junctions, tagged with the polygons on either side.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BoundarySegment<T = f64> {
    /// Becomes the arc id, ids should be dense since the arc table is sized by the largest id.
    pub id: ArcId,
    pub vertices: Vec<Vector2<T>>,
    pub right: Option<PolygonId>,
    pub left: Option<PolygonId>,
    /// Lies on the frozen outer survey boundary.
    pub frozen: bool,
}

impl<T> BoundarySegment<T>
where
    T: Real,
{
    pub fn new(
        id: ArcId,
        vertices: Vec<Vector2<T>>,
        right: Option<PolygonId>,
        left: Option<PolygonId>,
    ) -> Self {
        Self {
            id,
            vertices,
            right,
            left,
            frozen: false,
        }
    }

    pub fn with_frozen(mut self, frozen: bool) -> Self {
        self.frozen = frozen;
        self
    }
}

/// Build the arc/node topology of one survey area from its boundary segments.
///
/// Every endpoint is rounded to `precision` and mapped to a node by coordinate key. Segments with
/// only a left polygon are reversed so the polygon on the right is always present. Polygon records
/// are created on first reference in ascending segment id order.
///
/// Segments that reference a polygon id missing from `present`, or that have no polygon on either
/// side, are collected and returned together as [TopologyError::Mismatch].
pub fn build_topology<T>(
    mut segments: Vec<BoundarySegment<T>>,
    present: &BTreeSet<PolygonId>,
    precision: Precision<T>,
) -> Result<TopologyBatch<T>, TopologyError>
where
    T: Real,
{
    segments.sort_by_key(|s| s.id);
    let capacity = segments.last().map_or(0, |s| s.id + 1);
    let mut batch = TopologyBatch::new(precision, capacity);
    let mut node_keys: BTreeMap<CoordKey, NodeId> = BTreeMap::new();
    let mut mismatched = Vec::new();
    let mut previous_id = None;

    for seg in segments {
        if previous_id == Some(seg.id) {
            return Err(TopologyError::DuplicateSegment { id: seg.id });
        }
        previous_id = Some(seg.id);

        let unresolved = unresolved_polygons(&seg, present);
        if !unresolved.is_empty() {
            mismatched.extend(unresolved.into_iter().map(|polygon| MismatchedSegment {
                id: seg.id,
                polygon,
                vertices: seg
                    .vertices
                    .iter()
                    .map(|v| (v.x.as_f64(), v.y.as_f64()))
                    .collect(),
            }));
            continue;
        }

        let mut vertices: Vec<Vector2<T>> = Vec::with_capacity(seg.vertices.len());
        for v in seg.vertices.iter().map(|&v| precision.round_vec(v)) {
            if vertices.last() != Some(&v) {
                vertices.push(v);
            }
        }

        if vertices.len() < 2 {
            return Err(TopologyError::DegenerateSegment { id: seg.id });
        }

        let (mut right, mut left) = (seg.right, seg.left);
        if right.is_none() {
            vertices.reverse();
            std::mem::swap(&mut right, &mut left);
        }

        let mut node_for = |pos: Vector2<T>, end: End| -> Result<NodeId, TopologyError> {
            let key = precision
                .key(pos)
                .ok_or(TopologyError::InvalidCoordinate { id: seg.id })?;
            let id = *node_keys.entry(key).or_insert_with(|| {
                batch.nodes.push(Node::new(pos));
                batch.nodes.len() - 1
            });
            let node = &mut batch.nodes[id];
            node.ends.push(ArcEnd::new(seg.id, end));
            node.frozen |= seg.frozen;
            Ok(id)
        };

        let head = node_for(vertices[0], End::Head)?;
        let tail = node_for(vertices[vertices.len() - 1], End::Tail)?;

        for (polygon, orientation) in [(right, Orientation::Forward), (left, Orientation::Reverse)] {
            if let Some(polygon) = polygon {
                batch
                    .polygons
                    .entry(polygon)
                    .or_insert_with(|| PolygonRecord::new(polygon))
                    .arcs
                    .push((seg.id, orientation));
            }
        }

        batch.arcs[seg.id] = Some(Arc {
            vertices,
            head,
            tail,
            right,
            left,
            frozen: seg.frozen,
        });
    }

    if !mismatched.is_empty() {
        warn!(
            "{} boundary segment(s) could not be matched to batch polygons",
            mismatched.len()
        );
        return Err(TopologyError::Mismatch {
            segments: mismatched,
        });
    }

    debug!(
        "built topology: {} nodes, {} arcs, {} polygons",
        batch.nodes.len(),
        batch.arc_count(),
        batch.polygons.len()
    );

    Ok(batch)
}

fn unresolved_polygons<T>(
    seg: &BoundarySegment<T>,
    present: &BTreeSet<PolygonId>,
) -> Vec<Option<PolygonId>>
where
    T: Real,
{
    if seg.right.is_none() && seg.left.is_none() {
        return vec![None];
    }

    [seg.right, seg.left]
        .into_iter()
        .flatten()
        .filter(|p| !present.contains(p))
        .map(Some)
        .collect()
}
