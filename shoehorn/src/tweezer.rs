//! Acute angle removal ("tweezer").
//!
//! Two passes over a [TopologyBatch]:
//!
//! 1. interior pass, drops interior arc vertices whose turning angle is below the minimum,
//!    collapsing loop arcs left without area
//! 2. node pass, realigns simple (3 arc) nodes whose arcs leave at an acute angle by sliding the
//!    node onto the next vertex of the shorter arc
//!
//! Frozen arcs and frozen, pinned, or higher degree nodes are never edited.

use crate::{
    audit::{AmendedKind, AmendedVertex, TweezerReport},
    core::{
        math::{vertex_angle, Vector2},
        traits::Real,
    },
    topology::{ArcEnd, ArcId, End, NodeId, TopologyBatch},
};
use log::{debug, warn};
use std::collections::BTreeSet;

/// Attempts at re-examining one node after it was realigned.
const MAX_NODE_ATTEMPTS: usize = 16;
/// Full node sweeps, a realignment can make a neighboring node acute.
const MAX_NODE_SWEEPS: usize = 8;

/// Repeatedly remove the interior vertex with the smallest turning angle below `min_angle`.
///
/// Returns the removed vertices with their angle in radians, in removal order.
///
/// # Examples
///
/// ```
/// # use shoehorn::chain;
/// # use shoehorn::tweezer::*;
/// // spike at (5, 10)
/// let mut c = chain![(0.0, 0.0), (4.9, 0.0), (5.0, 10.0), (5.1, 0.0), (10.0, 0.0)];
/// let removed = strip_acute_vertices(&mut c, 10f64.to_radians());
/// assert_eq!(removed.len(), 1);
/// assert_eq!(c, chain![(0.0, 0.0), (4.9, 0.0), (5.1, 0.0), (10.0, 0.0)]);
/// ```
pub fn strip_acute_vertices<T>(vertices: &mut Vec<Vector2<T>>, min_angle: T) -> Vec<(Vector2<T>, T)>
where
    T: Real,
{
    let mut removed = Vec::new();
    while vertices.len() > 2 {
        let mut worst: Option<(usize, T)> = None;
        for i in 1..vertices.len() - 1 {
            let angle = vertex_angle(vertices[i - 1], vertices[i], vertices[i + 1]);
            if angle < min_angle && worst.map_or(true, |(_, w)| angle < w) {
                worst = Some((i, angle));
            }
        }

        match worst {
            Some((i, angle)) => removed.push((vertices.remove(i), angle)),
            None => break,
        }
    }

    removed
}

fn record_vertices<T>(report: &mut TweezerReport<T>, arc: ArcId, removed: Vec<(Vector2<T>, T)>)
where
    T: Real,
{
    report
        .amended
        .extend(removed.into_iter().map(|(position, angle)| AmendedVertex {
            position,
            angle_degrees: angle.to_degrees(),
            arc,
            kind: AmendedKind::Vertex,
        }));
}

/// Collapse `arc` and record the affected polygons, returns the surviving node.
fn collapse<T>(
    batch: &mut TopologyBatch<T>,
    arc: ArcId,
    pin: bool,
    report: &mut TweezerReport<T>,
) -> Option<NodeId>
where
    T: Real,
{
    let plan = batch.plan_collapse(arc)?;
    let outcome = batch.apply_collapse(&plan);
    report.collapsed_arcs.push(arc);
    report.weak.extend(outcome.affected.iter().copied());
    report.destroyed.extend(outcome.destroyed.iter().copied());

    let surviving = outcome.surviving_node?;
    if pin {
        if let Some(node) = batch.node_mut(surviving) {
            node.pinned = true;
        }
    }

    Some(surviving)
}

/// Interior vertex pass over every non frozen arc.
///
/// A loop arc left with fewer than 2 interior vertices encloses no area and collapses, its node is
/// pinned.
pub fn interior_pass<T>(batch: &mut TopologyBatch<T>, min_angle: T, report: &mut TweezerReport<T>)
where
    T: Real,
{
    let ids: Vec<ArcId> = batch.arc_ids().collect();
    for id in ids {
        let Some(arc) = batch.arc_mut(id) else {
            continue;
        };
        if arc.frozen {
            continue;
        }

        let removed = strip_acute_vertices(&mut arc.vertices, min_angle);
        let collapses = arc.is_loop() && arc.vertices.len() < 4;
        record_vertices(report, id, removed);

        if collapses {
            debug!("loop arc {id} lost its area");
            collapse(batch, id, true, report);
        }
    }
}

/// Node pass, see [realign_node].
pub fn node_pass<T>(batch: &mut TopologyBatch<T>, min_angle: T, report: &mut TweezerReport<T>)
where
    T: Real,
{
    for _ in 0..MAX_NODE_SWEEPS {
        let mut moved = false;
        for id in 0..batch.node_table_len() {
            if batch.merge_map().contains_key(&id) {
                continue;
            }

            let mut current = id;
            for _ in 0..MAX_NODE_ATTEMPTS {
                if !realign_node(batch, current, min_angle, report) {
                    break;
                }
                moved = true;
                current = batch.resolve_node(current);
            }
        }

        if !moved {
            break;
        }
    }
}

/// Arc ends of a simple node with the pair leaving at the smallest angle.
struct AcuteFan<T> {
    ends: [ArcEnd; 3],
    /// Second vertex of each arc end, the direction it leaves the node.
    seconds: [Vector2<T>; 3],
    short: usize,
    long: usize,
    back: usize,
    angle: T,
}

/// The fan of `node` if it is simple, none of its arcs is frozen or repeated, and two arcs leave
/// it at an angle below `min_angle`.
fn acute_fan<T>(batch: &TopologyBatch<T>, node: NodeId, min_angle: T) -> Option<AcuteFan<T>>
where
    T: Real,
{
    let n = batch.node(node)?;
    if !n.is_simple() {
        return None;
    }

    let pos = n.pos;
    let ends = [n.ends[0], n.ends[1], n.ends[2]];
    if ends[0].arc == ends[1].arc || ends[0].arc == ends[2].arc || ends[1].arc == ends[2].arc {
        return None;
    }

    let mut seconds = [pos; 3];
    for (second, e) in seconds.iter_mut().zip(ends.iter()) {
        let arc = batch.arc(e.arc)?;
        if arc.frozen {
            return None;
        }
        *second = arc.second_vertex(e.end)?;
    }

    let dirs = seconds.map(|s| s - pos);
    let (mut i, mut j) = (0, 1);
    let mut smallest = dirs[0].angle_to(dirs[1]);
    for (a, b) in [(0, 2), (1, 2)] {
        let angle = dirs[a].angle_to(dirs[b]);
        if angle < smallest {
            (i, j, smallest) = (a, b, angle);
        }
    }

    if smallest >= min_angle {
        return None;
    }

    let (long, short) = if dirs[j].length() > dirs[i].length() {
        (j, i)
    } else {
        (i, j)
    };

    Some(AcuteFan {
        ends,
        seconds,
        short,
        long,
        back: 3 - i - j,
        angle: smallest,
    })
}

/// True if a vertex of the polygons around the short and long arcs lies inside the triangle the
/// move hands from one polygon to the other (node, short arc vertex, long arc vertex).
///
/// Such a move would fold the new long arc edge over existing linework.
fn move_folds_over<T>(batch: &TopologyBatch<T>, fan: &AcuteFan<T>, pos: Vector2<T>) -> bool
where
    T: Real,
{
    let (a, b, c) = (pos, fan.seconds[fan.short], fan.seconds[fan.long]);
    let orientation = (b - a).perp_dot(c - a);
    if orientation == T::zero() {
        return false;
    }

    let inside = |v: Vector2<T>| {
        let d1 = (b - a).perp_dot(v - a) * orientation;
        let d2 = (c - b).perp_dot(v - b) * orientation;
        let d3 = (a - c).perp_dot(v - c) * orientation;
        d1 > T::zero() && d3 > T::zero() && d2 >= T::zero()
    };

    let mut polygons = BTreeSet::new();
    let mut open_side = false;
    for k in [fan.short, fan.long] {
        let Some(arc) = batch.arc(fan.ends[k].arc) else {
            continue;
        };
        polygons.extend(arc.polygons());
        open_side |= arc.right.is_none() || arc.left.is_none();
    }

    let candidates: BTreeSet<ArcId> = if open_side {
        batch.arc_ids().collect()
    } else {
        polygons
            .iter()
            .filter_map(|&id| batch.polygon(id))
            .flat_map(|record| record.arcs.iter().map(|&(arc, _)| arc))
            .collect()
    };

    candidates
        .into_iter()
        .filter_map(|id| batch.arc(id))
        .any(|arc| arc.vertices.iter().any(|&v| inside(v)))
}

/// Realign one simple node if two of its arcs leave at an angle below `min_angle`.
///
/// Of the two arcs forming the smallest angle the longer direction vector is the *long* arc and
/// the other the *short* arc, the third is the *back* arc. The node moves to `p`, the short arc's
/// vertex next to the node:
///
/// * the short arc drops its end vertex
/// * the long arc's end vertex becomes `p`
/// * the back arc gains `p` before its old end
///
/// The move is refused if the new long arc edge would sweep over other vertices of the
/// surrounding polygons. Arcs left degenerate collapse and their nodes merge, a loop left without
/// area collapses and pins its node. Returns true if the node moved.
pub fn realign_node<T>(
    batch: &mut TopologyBatch<T>,
    node: NodeId,
    min_angle: T,
    report: &mut TweezerReport<T>,
) -> bool
where
    T: Real,
{
    let Some(fan) = acute_fan(batch, node, min_angle) else {
        return false;
    };
    let Some(pos) = batch.node(node).map(|n| n.pos) else {
        return false;
    };

    if move_folds_over(batch, &fan, pos) {
        debug!(
            "node {node} not realigned, arc {} would fold over ({:.3} degrees)",
            fan.ends[fan.long].arc,
            fan.angle.to_degrees()
        );
        return false;
    }

    let AcuteFan {
        ends,
        seconds,
        short,
        long,
        back,
        angle,
    } = fan;
    // node and arc ends must stay bit identical
    let p = seconds[short];

    report.amended.push(AmendedVertex {
        position: pos,
        angle_degrees: angle.to_degrees(),
        arc: ends[short].arc,
        kind: AmendedKind::Node,
    });
    debug!(
        "node {node} realigned onto arc {} ({:.3} degrees)",
        ends[short].arc,
        angle.to_degrees()
    );

    if let Some(arc) = batch.arc_mut(ends[short].arc) {
        match ends[short].end {
            End::Head => {
                arc.vertices.remove(0);
            }
            End::Tail => {
                arc.vertices.pop();
            }
        }
    }

    if let Some(arc) = batch.arc_mut(ends[long].arc) {
        let end = ends[long].end;
        arc.set_end_vertex(end, p);
        let len = arc.vertices.len();
        if len > 2 {
            let neighbor = match end {
                End::Head => 1,
                End::Tail => len - 2,
            };
            if arc.vertices[neighbor] == p {
                arc.vertices.remove(neighbor);
            }
        }
    }

    if let Some(arc) = batch.arc_mut(ends[back].arc) {
        match ends[back].end {
            End::Head => arc.vertices.insert(0, p),
            End::Tail => arc.vertices.push(p),
        }
    }

    if let Some(n) = batch.node_mut(node) {
        n.pos = p;
    }

    for k in [short, long, back] {
        let id = ends[k].arc;
        let Some(arc) = batch.arc_mut(id) else {
            continue;
        };
        if arc.is_degenerate() {
            continue;
        }
        let removed = strip_acute_vertices(&mut arc.vertices, min_angle);
        record_vertices(report, id, removed);
    }

    // a merge can turn the long or back arc into a loop
    for k in [short, long, back] {
        let id = ends[k].arc;
        let Some(arc) = batch.arc(id) else {
            continue;
        };
        if arc.is_degenerate() {
            collapse(batch, id, false, report);
        } else if arc.is_loop() && arc.vertices.len() < 4 {
            debug!("arc {id} became a loop without area");
            collapse(batch, id, true, report);
        }
    }

    true
}

/// Live nodes the node pass left acute, either because a move was refused or the attempts ran
/// out.
fn remaining_acute_nodes<T>(batch: &TopologyBatch<T>, min_angle: T) -> Vec<NodeId>
where
    T: Real,
{
    batch
        .node_ids()
        .filter(|&id| acute_fan(batch, id, min_angle).is_some())
        .collect()
}

/// Run both passes on `batch` with `min_angle` in radians.
pub fn remove_acute_angles<T>(batch: &mut TopologyBatch<T>, min_angle: T) -> TweezerReport<T>
where
    T: Real,
{
    let mut report = TweezerReport::default();
    interior_pass(batch, min_angle, &mut report);
    node_pass(batch, min_angle, &mut report);

    report.acute_nodes = remaining_acute_nodes(batch, min_angle);
    for &id in &report.acute_nodes {
        if let Some(node) = batch.node(id) {
            warn!("node {id} at ({}, {}) is still acute", node.pos.x, node.pos.y);
        }
    }
    debug!(
        "tweezer: {} vertices, {} nodes amended, {} arcs collapsed",
        report.count(AmendedKind::Vertex),
        report.count(AmendedKind::Node),
        report.collapsed_arcs.len()
    );
    report
}
