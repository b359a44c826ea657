//! Polygon layer to boundary segments.
//!
//! Rings are rounded to the layer precision, oriented so their polygon lies on the right, snapped
//! onto the canonical boundary nodes, and cut at every node and T-junction. Shared edges are then
//! matched by coordinate key and chained into segments between nodes.

use super::BoundarySegment;
use crate::{
    core::{
        math::{
            dist_squared, line_seg_closest_point, min_max, seg_parametric, CoordKey, Precision,
            Vector2,
        },
        traits::Real,
    },
    error::ShoehornError,
    geometry::{expand, index_boxes, LayerPolygon, PolygonId},
};
use log::debug;
use static_aabb2d_index::AABB;
use std::collections::{BTreeMap, BTreeSet};

/// Parameters for [derive_linework].
#[derive(Debug, Clone, Copy)]
pub struct LineworkOptions<T = f64> {
    pub precision: Precision<T>,
    /// Ring vertices within this distance of a boundary node are snapped onto it, and edges
    /// passing within this distance are cut at it.
    pub snap_tolerance: T,
    /// Flag segments with an outside side as frozen.
    pub freeze_outer_boundary: bool,
}

impl<T> LineworkOptions<T>
where
    T: Real,
{
    pub fn new(precision: Precision<T>, snap_tolerance: T) -> Self {
        Self {
            precision,
            snap_tolerance,
            freeze_outer_boundary: true,
        }
    }
}

/// Cyclic key sequence of one ring (no closing duplicate), polygon on the right.
#[derive(Debug, Clone)]
pub(crate) struct PreparedRing {
    pub polygon: PolygonId,
    pub keys: Vec<CoordKey>,
}

/// Undirected edge key, lowest coordinate key first.
pub(crate) type EdgeKey = (CoordKey, CoordKey);

/// Polygons on either side of an edge, relative to the lowest-key to highest-key direction.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub(crate) struct EdgeSides {
    pub right: Option<PolygonId>,
    pub left: Option<PolygonId>,
}

/// Edge adjacency of a set of prepared rings.
#[derive(Debug, Clone, Default)]
pub(crate) struct EdgeMap {
    pub edges: BTreeMap<EdgeKey, EdgeSides>,
    /// Neighbor vertex keys per vertex, sorted.
    pub incident: BTreeMap<CoordKey, Vec<CoordKey>>,
}

#[inline]
fn edge_key(a: CoordKey, b: CoordKey) -> (EdgeKey, bool) {
    if a < b {
        ((a, b), true)
    } else {
        ((b, a), false)
    }
}

/// Twice the signed area of a cyclic key sequence, exact.
fn double_area(keys: &[CoordKey]) -> i128 {
    let n = keys.len();
    (0..n)
        .map(|i| {
            let (a, b) = (keys[i], keys[(i + 1) % n]);
            a.x as i128 * b.y as i128 - a.y as i128 * b.x as i128
        })
        .sum()
}

/// Drop consecutive duplicates, treating the sequence as cyclic.
fn dedup_cyclic(keys: &mut Vec<CoordKey>) {
    keys.dedup();
    while keys.len() > 1 && keys.first() == keys.last() {
        keys.pop();
    }
}

/// Round, dedupe, and orient the rings of `polygons`. Degenerate rings are skipped.
pub(crate) fn prepare_rings<'a, T, A>(
    polygons: impl IntoIterator<Item = &'a LayerPolygon<T, A>>,
    precision: Precision<T>,
) -> Result<Vec<PreparedRing>, ShoehornError>
where
    T: Real,
    A: 'a,
{
    let mut result = Vec::new();
    for polygon in polygons {
        for (i, ring) in polygon.geometry.rings().enumerate() {
            let mut keys = ring
                .vertices()
                .iter()
                .map(|&v| precision.key(v))
                .collect::<Option<Vec<_>>>()
                .ok_or(ShoehornError::InvalidCoordinate { polygon: polygon.id })?;
            dedup_cyclic(&mut keys);
            if keys.len() < 3 {
                debug!("skipping degenerate ring {i} of polygon {}", polygon.id);
                continue;
            }

            let area = double_area(&keys);
            if area == 0 {
                debug!("skipping zero area ring {i} of polygon {}", polygon.id);
                continue;
            }

            // outer rings clockwise, holes counter clockwise
            let is_outer = i == 0;
            if (area > 0) == is_outer {
                keys.reverse();
            }

            result.push(PreparedRing {
                polygon: polygon.id,
                keys,
            });
        }
    }

    Ok(result)
}

impl EdgeMap {
    pub fn from_rings(rings: &[PreparedRing]) -> Result<Self, ShoehornError> {
        let mut map = EdgeMap::default();
        for ring in rings {
            map.add_ring(ring)?;
        }

        for neighbors in map.incident.values_mut() {
            neighbors.sort();
            neighbors.dedup();
        }

        Ok(map)
    }

    fn add_ring(&mut self, ring: &PreparedRing) -> Result<(), ShoehornError> {
        let n = ring.keys.len();
        for i in 0..n {
            let (a, b) = (ring.keys[i], ring.keys[(i + 1) % n]);
            if a == b {
                continue;
            }

            let (key, forward) = edge_key(a, b);
            if !self.edges.contains_key(&key) {
                self.incident.entry(a).or_default().push(b);
                self.incident.entry(b).or_default().push(a);
            }

            let sides = self.edges.entry(key).or_default();
            let slot = if forward {
                &mut sides.right
            } else {
                &mut sides.left
            };

            match slot {
                Some(existing) => {
                    return Err(ShoehornError::OverlappingPolygons {
                        first: *existing,
                        second: ring.polygon,
                    })
                }
                None => *slot = Some(ring.polygon),
            }
        }

        Ok(())
    }

    /// `(right, left)` polygons when traversing the edge from `from` to `to`.
    pub fn sides_along(&self, from: CoordKey, to: CoordKey) -> (Option<PolygonId>, Option<PolygonId>) {
        let (key, forward) = edge_key(from, to);
        let sides = self.edges.get(&key).copied().unwrap_or_default();
        if forward {
            (sides.right, sides.left)
        } else {
            (sides.left, sides.right)
        }
    }

    /// Edges with a polygon on exactly one side.
    pub fn exterior_edges(&self) -> impl Iterator<Item = (EdgeKey, PolygonId)> + '_ {
        self.edges.iter().filter_map(|(&k, s)| match (s.right, s.left) {
            (Some(p), None) | (None, Some(p)) => Some((k, p)),
            _ => None,
        })
    }

    /// Vertices where an exterior edge run begins or ends.
    ///
    /// A vertex qualifies when its exterior degree is not 2 or when the interior polygon changes
    /// across it. Exterior cycles without such a vertex contribute their lowest key.
    pub fn exterior_nodes(&self) -> Vec<CoordKey> {
        let mut ext: BTreeMap<CoordKey, Vec<(CoordKey, PolygonId)>> = BTreeMap::new();
        for ((a, b), p) in self.exterior_edges() {
            ext.entry(a).or_default().push((b, p));
            ext.entry(b).or_default().push((a, p));
        }

        let is_node = |adj: &Vec<(CoordKey, PolygonId)>| adj.len() != 2 || adj[0].1 != adj[1].1;

        let mut nodes: BTreeSet<CoordKey> = ext
            .iter()
            .filter(|&(_, adj)| is_node(adj))
            .map(|(&k, _)| k)
            .collect();

        // components of the exterior graph without any node
        let mut seen = BTreeSet::new();
        let mut anchors = Vec::new();
        for &start in ext.keys() {
            if !seen.insert(start) {
                continue;
            }

            let mut has_node = nodes.contains(&start);
            let mut stack = vec![start];
            while let Some(v) = stack.pop() {
                for &(w, _) in &ext[&v] {
                    if seen.insert(w) {
                        has_node |= nodes.contains(&w);
                        stack.push(w);
                    }
                }
            }

            if !has_node {
                anchors.push(start);
            }
        }

        nodes.extend(anchors);
        nodes.into_iter().collect()
    }
}

/// Split point candidate for cutting ring edges.
#[derive(Debug, Copy, Clone)]
struct Candidate<T> {
    key: CoordKey,
    pos: Vector2<T>,
    tolerance: T,
    seed: bool,
}

/// Derive the boundary segments of `polygons`, cut at the canonical boundary nodes `seeds`.
///
/// Segment ids are dense and start at zero. Every segment runs between two nodes, or is a closed
/// loop anchored at its lowest coordinate when its cycle has no node. The right polygon of a
/// segment may be `None` (outside), the topology builder reverses such segments.
///
/// Returns [ShoehornError::OverlappingPolygons] if two polygons claim the same side of an edge.
pub fn derive_linework<T, A>(
    polygons: &[LayerPolygon<T, A>],
    seeds: &[Vector2<T>],
    options: &LineworkOptions<T>,
) -> Result<Vec<BoundarySegment<T>>, ShoehornError>
where
    T: Real,
{
    let precision = options.precision;
    let tol = options.snap_tolerance;
    let mut rings = prepare_rings(polygons, precision)?;

    let mut seed_keys = BTreeMap::new();
    for &s in seeds {
        if let Some(key) = precision.key(s) {
            seed_keys.insert(key, precision.coord(key));
        }
    }

    let mut forced = BTreeSet::new();
    snap_to_seeds(&mut rings, &seed_keys, precision, tol, &mut forced)?;
    rings.retain(|r| r.keys.len() >= 3);
    cut_edges(&mut rings, &seed_keys, precision, tol, &mut forced)?;

    let map = EdgeMap::from_rings(&rings)?;
    let nodes: BTreeSet<CoordKey> = map
        .incident
        .iter()
        .filter(|&(&k, adj)| {
            adj.len() != 2
                || forced.contains(&k)
                || map.sides_along(adj[0], k) != map.sides_along(k, adj[1])
        })
        .map(|(&k, _)| k)
        .collect();

    let mut visited: BTreeSet<EdgeKey> = BTreeSet::new();
    let mut chains = Vec::new();
    for &start in &nodes {
        for &next in &map.incident[&start] {
            if visited.contains(&edge_key(start, next).0) {
                continue;
            }
            chains.push(walk(&map, start, next, &mut visited, |k| nodes.contains(&k)));
        }
    }

    // remaining edges form node free cycles, the first unvisited edge starts at the cycle's
    // lowest key
    for &(a, b) in map.edges.keys() {
        if visited.contains(&(a, b)) {
            continue;
        }
        chains.push(walk(&map, a, b, &mut visited, |k| k == a));
    }

    let segments: Vec<BoundarySegment<T>> = chains
        .into_iter()
        .enumerate()
        .map(|(id, keys)| {
            let (right, left) = map.sides_along(keys[0], keys[1]);
            let frozen = options.freeze_outer_boundary && (right.is_none() || left.is_none());
            let vertices = keys.iter().map(|&k| precision.coord(k)).collect();
            BoundarySegment::new(id, vertices, right, left).with_frozen(frozen)
        })
        .collect();

    debug!(
        "derived {} boundary segments from {} rings ({} nodes)",
        segments.len(),
        rings.len(),
        nodes.len()
    );

    Ok(segments)
}

/// Follow edges from `start` through `next` until `stop` holds for the current vertex.
fn walk(
    map: &EdgeMap,
    start: CoordKey,
    next: CoordKey,
    visited: &mut BTreeSet<EdgeKey>,
    stop: impl Fn(CoordKey) -> bool,
) -> Vec<CoordKey> {
    let mut chain = vec![start, next];
    visited.insert(edge_key(start, next).0);
    let (mut prev, mut cur) = (start, next);
    // every step consumes an edge, bounded by the edge count
    for _ in 0..map.edges.len() {
        if stop(cur) {
            break;
        }

        let adj = &map.incident[&cur];
        let Some(&nxt) = adj
            .iter()
            .find(|&&w| w != prev && !visited.contains(&edge_key(cur, w).0))
            .or_else(|| adj.iter().find(|&&w| !visited.contains(&edge_key(cur, w).0)))
        else {
            break;
        };

        visited.insert(edge_key(cur, nxt).0);
        chain.push(nxt);
        prev = cur;
        cur = nxt;
    }

    chain
}

pub(crate) fn point_boxes<T>(points: impl Iterator<Item = Vector2<T>>) -> Vec<AABB<T>>
where
    T: Real,
{
    points.map(|v| AABB::new(v.x, v.y, v.x, v.y)).collect()
}

/// Replace ring vertices within `tol` of a seed by the nearest seed.
fn snap_to_seeds<T>(
    rings: &mut [PreparedRing],
    seeds: &BTreeMap<CoordKey, Vector2<T>>,
    precision: Precision<T>,
    tol: T,
    forced: &mut BTreeSet<CoordKey>,
) -> Result<(), ShoehornError>
where
    T: Real,
{
    if seeds.is_empty() {
        return Ok(());
    }

    let seed_list: Vec<(CoordKey, Vector2<T>)> = seeds.iter().map(|(&k, &v)| (k, v)).collect();
    let index = index_boxes(&point_boxes(seed_list.iter().map(|s| s.1)))?;
    let tol_sq = tol * tol;

    for ring in rings.iter_mut() {
        for key in ring.keys.iter_mut() {
            if seeds.contains_key(key) {
                forced.insert(*key);
                continue;
            }

            let pos = precision.coord(*key);
            let mut best: Option<(T, CoordKey)> = None;
            for i in index.query(pos.x - tol, pos.y - tol, pos.x + tol, pos.y + tol) {
                let (seed_key, seed_pos) = seed_list[i];
                let d = dist_squared(pos, seed_pos);
                if d > tol_sq {
                    continue;
                }

                let closer = match best {
                    None => true,
                    Some((best_d, best_key)) => d < best_d || (d == best_d && seed_key < best_key),
                };
                if closer {
                    best = Some((d, seed_key));
                }
            }

            if let Some((_, seed_key)) = best {
                *key = seed_key;
                forced.insert(seed_key);
            }
        }

        dedup_cyclic(&mut ring.keys);
    }

    Ok(())
}

/// Insert seeds and T-junction vertices lying on ring edges into those edges.
///
/// Seeds cut an edge within the snap tolerance, ring vertices of any ring within one rounding
/// unit.
fn cut_edges<T>(
    rings: &mut [PreparedRing],
    seeds: &BTreeMap<CoordKey, Vector2<T>>,
    precision: Precision<T>,
    tol: T,
    forced: &mut BTreeSet<CoordKey>,
) -> Result<(), ShoehornError>
where
    T: Real,
{
    let unit = precision.unit();
    let mut candidates: BTreeMap<CoordKey, Candidate<T>> = BTreeMap::new();
    for &key in rings.iter().flat_map(|r| r.keys.iter()) {
        candidates.entry(key).or_insert(Candidate {
            key,
            pos: precision.coord(key),
            tolerance: unit,
            seed: false,
        });
    }
    for (&key, &pos) in seeds {
        candidates.insert(
            key,
            Candidate {
                key,
                pos,
                tolerance: num_traits::real::Real::max(tol, unit),
                seed: true,
            },
        );
    }

    let list: Vec<Candidate<T>> = candidates.into_values().collect();
    let index = index_boxes(&point_boxes(list.iter().map(|c| c.pos)))?;
    let reach = num_traits::real::Real::max(tol, unit);
    let mut split_count = 0;

    for ring in rings.iter_mut() {
        let n = ring.keys.len();
        let mut cut = Vec::with_capacity(n);
        for i in 0..n {
            let (a, b) = (ring.keys[i], ring.keys[(i + 1) % n]);
            cut.push(a);

            let (pa, pb) = (precision.coord(a), precision.coord(b));
            let (min_x, max_x) = min_max(pa.x, pb.x);
            let (min_y, max_y) = min_max(pa.y, pb.y);
            let query = expand(&AABB::new(min_x, min_y, max_x, max_y), reach);

            let mut splits: Vec<(T, CoordKey, bool)> = Vec::new();
            let mut visitor = |j: usize| {
                let c = list[j];
                if c.key == a || c.key == b {
                    return;
                }

                let closest = line_seg_closest_point(pa, pb, c.pos);
                if dist_squared(closest, c.pos) > c.tolerance * c.tolerance {
                    return;
                }

                let t = seg_parametric(pa, pb, c.pos);
                if t > T::zero() && t < T::one() {
                    splits.push((t, c.key, c.seed));
                }
            };
            let mut query_stack = Vec::with_capacity(8);
            index.visit_query_with_stack(
                query.min_x,
                query.min_y,
                query.max_x,
                query.max_y,
                &mut visitor,
                &mut query_stack,
            );

            splits.sort_by(|x, y| {
                x.0.partial_cmp(&y.0)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(x.1.cmp(&y.1))
            });
            split_count += splits.len();
            for (_, key, seed) in splits {
                if seed {
                    forced.insert(key);
                }
                cut.push(key);
            }
        }

        ring.keys = cut;
        dedup_cyclic(&mut ring.keys);
    }

    if split_count > 0 {
        debug!("cut ring edges at {split_count} points");
    }

    Ok(())
}
