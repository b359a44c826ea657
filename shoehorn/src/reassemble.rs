//! Polygon reassembly from cleaned arcs.
//!
//! Every `(arc, orientation)` pair of a polygon becomes a dart between two nodes. Darts are walked
//! into closed rings, rings touching each other at a node are spliced into one self touching ring,
//! then the outer ring is selected and the remaining rings become holes.

use crate::{
    core::{math::Vector2, traits::Real},
    geometry::{Polygon, PolygonId, Ring},
    topology::{ArcId, NodeId, Orientation, TopologyBatch},
};
use log::warn;
use rayon::prelude::*;
use std::{
    collections::BTreeMap,
    panic::{self, AssertUnwindSafe},
};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Why a polygon produced no output geometry.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// No arcs left (every arc collapsed, or none were built).
    #[error("polygon has no arcs left")]
    Collapsed,
    /// Rings enclose no area.
    #[error("reassembled polygon has zero area")]
    ZeroArea,
    /// A walk reached a node with no unused arc leaving it.
    #[error("arcs do not close into rings")]
    OpenRing,
    /// A ring other than the outer ring lies outside the outer ring.
    #[error("ring lies outside the outer ring")]
    DisjointPart,
    /// Reassembly of the polygon panicked.
    #[error("reassembly panicked")]
    Panicked,
}

/// How the outer ring of a polygon is selected among its rings.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum OuterRingRule {
    /// Largest axis aligned bounding box area.
    #[default]
    BoundingBox,
    /// Largest absolute signed area.
    SignedArea,
}

/// Index of the outer ring of `rings` under `rule`, first ring wins ties.
///
/// # Examples
///
/// ```
/// # use shoehorn::ring;
/// # use shoehorn::reassemble::*;
/// // thin diagonal sliver with a large bounding box, and a compact square
/// let rings = [
///     ring![(0.0, 0.0), (10.0, 9.9), (10.0, 10.0), (0.0, 0.1)],
///     ring![(20.0, 0.0), (25.0, 0.0), (25.0, 5.0), (20.0, 5.0)],
/// ];
/// assert_eq!(outer_ring_index(&rings, OuterRingRule::BoundingBox), Some(0));
/// assert_eq!(outer_ring_index(&rings, OuterRingRule::SignedArea), Some(1));
/// ```
pub fn outer_ring_index<T>(rings: &[Ring<T>], rule: OuterRingRule) -> Option<usize>
where
    T: Real,
{
    let metric = |r: &Ring<T>| match rule {
        OuterRingRule::BoundingBox => r.bounding_box_area(),
        OuterRingRule::SignedArea => r.area(),
    };

    let mut result: Option<(usize, T)> = None;
    for (i, r) in rings.iter().enumerate() {
        let m = metric(r);
        if result.map_or(true, |(_, best)| m > best) {
            result = Some((i, m));
        }
    }

    result.map(|(i, _)| i)
}

#[derive(Debug, Copy, Clone)]
struct Dart {
    arc: ArcId,
    orientation: Orientation,
    start: NodeId,
    end: NodeId,
}

/// Splice ring `insert` into ring `target` at `node` (both rings pass through it).
fn splice(darts: &[Dart], target: &mut Vec<usize>, insert: Vec<usize>, node: NodeId) {
    let at_target = target
        .iter()
        .position(|&d| darts[d].start == node)
        .unwrap_or(0);
    let at_insert = insert
        .iter()
        .position(|&d| darts[d].start == node)
        .unwrap_or(0);
    let rotated: Vec<usize> = insert[at_insert..]
        .iter()
        .chain(insert[..at_insert].iter())
        .copied()
        .collect();
    target.splice(at_target..at_target, rotated);
}

/// Merge rings sharing a node until every node belongs to at most one ring.
fn merge_touching(darts: &[Dart], rings: &mut Vec<Vec<usize>>) {
    loop {
        let mut owner: BTreeMap<NodeId, usize> = BTreeMap::new();
        let mut shared = None;
        'scan: for (ri, ring) in rings.iter().enumerate() {
            for &d in ring {
                let node = darts[d].start;
                match owner.get(&node) {
                    Some(&other) if other != ri => {
                        shared = Some((other, ri, node));
                        break 'scan;
                    }
                    Some(_) => {}
                    None => {
                        owner.insert(node, ri);
                    }
                }
            }
        }

        let Some((target, insert, node)) = shared else {
            break;
        };
        // owners always come from earlier rings, so `insert > target`
        let insert = rings.remove(insert);
        splice(darts, &mut rings[target], insert, node);
    }
}

fn ring_vertices<T>(batch: &TopologyBatch<T>, darts: &[Dart], ring: &[usize]) -> Vec<Vector2<T>>
where
    T: Real,
{
    let mut vertices: Vec<Vector2<T>> = Vec::new();
    for &d in ring {
        let Some(arc) = batch.arc(darts[d].arc) else {
            continue;
        };
        let chain = arc.oriented_vertices(darts[d].orientation);
        let skip = usize::from(!vertices.is_empty());
        vertices.extend(chain.into_iter().skip(skip));
    }

    vertices
}

/// Rebuild the geometry of polygon `id` from its arcs.
pub fn reassemble_polygon<T>(
    batch: &TopologyBatch<T>,
    id: PolygonId,
    rule: OuterRingRule,
) -> Result<Polygon<T>, FailureKind>
where
    T: Real,
{
    let record = batch.polygon(id).ok_or(FailureKind::Collapsed)?;
    let darts: Vec<Dart> = record
        .arcs
        .iter()
        .filter_map(|&(arc_id, orientation)| {
            let arc = batch.arc(arc_id)?;
            let (head, tail) = (batch.resolve_node(arc.head), batch.resolve_node(arc.tail));
            let (start, end) = match orientation {
                Orientation::Forward => (head, tail),
                Orientation::Reverse => (tail, head),
            };
            Some(Dart {
                arc: arc_id,
                orientation,
                start,
                end,
            })
        })
        .collect();

    if darts.is_empty() {
        return Err(FailureKind::Collapsed);
    }

    let mut outgoing: BTreeMap<NodeId, Vec<usize>> = BTreeMap::new();
    for (i, d) in darts.iter().enumerate() {
        outgoing.entry(d.start).or_default().push(i);
    }

    let mut used = vec![false; darts.len()];
    let mut walks: Vec<Vec<usize>> = Vec::new();
    for first in 0..darts.len() {
        if used[first] {
            continue;
        }
        used[first] = true;

        let start = darts[first].start;
        let mut at = darts[first].end;
        let mut walk = vec![first];
        while at != start {
            let next = outgoing
                .get(&at)
                .and_then(|ds| ds.iter().copied().find(|&d| !used[d]));
            let Some(next) = next else {
                return Err(FailureKind::OpenRing);
            };
            used[next] = true;
            walk.push(next);
            at = darts[next].end;
        }

        walks.push(walk);
    }

    merge_touching(&darts, &mut walks);

    let mut rings: Vec<Ring<T>> = walks
        .iter()
        .map(|w| Ring::new(ring_vertices(batch, &darts, w)))
        .collect();

    let total = rings
        .iter()
        .fold(T::zero(), |acc, r| acc + r.signed_area());
    if total.abs().fuzzy_eq_zero() {
        return Err(FailureKind::ZeroArea);
    }

    let outer_idx = outer_ring_index(&rings, rule).ok_or(FailureKind::Collapsed)?;
    let outer = rings.remove(outer_idx);
    for hole in &rings {
        let inside = hole
            .vertices()
            .first()
            .map_or(false, |&v| outer.winding_number(v) != 0);
        if !inside {
            return Err(FailureKind::DisjointPart);
        }
    }

    Ok(Polygon::new(outer, rings))
}

/// Reassemble every polygon of `batch` on `pool`, one task per polygon.
///
/// A panicking task is reported as [FailureKind::Panicked] for that polygon only.
pub fn reassemble_all<T>(
    batch: &TopologyBatch<T>,
    rule: OuterRingRule,
    pool: &rayon::ThreadPool,
) -> BTreeMap<PolygonId, Result<Polygon<T>, FailureKind>>
where
    T: Real,
{
    let ids: Vec<PolygonId> = batch.polygon_ids().collect();
    pool.install(|| {
        ids.par_iter()
            .map(|&id| {
                let result =
                    panic::catch_unwind(AssertUnwindSafe(|| reassemble_polygon(batch, id, rule)))
                        .unwrap_or_else(|_| {
                            warn!("reassembly of polygon {id} panicked");
                            Err(FailureKind::Panicked)
                        });
                (id, result)
            })
            .collect()
    })
}
