//! Canonical boundary node set of a batch of survey areas.
//!
//! Exterior nodes are computed per survey area in parallel, merged single threaded, and snapped
//! onto the exterior nodes of the finalized neighbor polygons so the seam between the batch and
//! its neighbors is cut at the same points on both sides.

use crate::{
    core::{
        math::{dist_squared, line_seg_closest_point, min_max, CoordKey, Precision, Vector2},
        traits::Real,
    },
    error::ShoehornError,
    geometry::{expand, index_boxes, LayerPolygon},
    options::ShoehornOptions,
    pipeline::SurveyArea,
    topology::linework::{point_boxes, prepare_rings, EdgeMap},
};
use log::{debug, warn};
use rayon::prelude::*;
use static_aabb2d_index::{StaticAABB2DIndex, AABB};
use std::{
    collections::{BTreeMap, BTreeSet},
    panic::{self, AssertUnwindSafe},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Output of [synchronize].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryNodes<T = f64> {
    /// Canonical nodes, sorted by coordinate key.
    pub nodes: Vec<Vector2<T>>,
    /// Batch nodes moved onto a neighbor node, `(from, to)`.
    pub snapped: Vec<(Vector2<T>, Vector2<T>)>,
    /// Survey areas whose exterior could not be computed.
    pub failed_areas: Vec<String>,
}

impl<T> Default for BoundaryNodes<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            snapped: Vec::new(),
            failed_areas: Vec::new(),
        }
    }
}

/// Exterior nodes and edges of one polygon set.
#[derive(Debug, Clone)]
struct Exterior<T> {
    nodes: Vec<Vector2<T>>,
    edges: Vec<(Vector2<T>, Vector2<T>)>,
}

fn exterior_of<'a, T, A>(
    polygons: impl IntoIterator<Item = &'a LayerPolygon<T, A>>,
    precision: Precision<T>,
) -> Result<Exterior<T>, ShoehornError>
where
    T: Real,
    A: 'a,
{
    let rings = prepare_rings(polygons, precision)?;
    let map = EdgeMap::from_rings(&rings)?;
    let nodes = map
        .exterior_nodes()
        .into_iter()
        .map(|k| precision.coord(k))
        .collect();
    let edges = map
        .exterior_edges()
        .map(|((a, b), _)| (precision.coord(a), precision.coord(b)))
        .collect();

    Ok(Exterior { nodes, edges })
}

/// Vertices where the exterior boundary of `polygons` begins, ends, or changes polygon.
///
/// Edges with a polygon on exactly one side form the exterior. A vertex is an exterior node when
/// its exterior degree is not 2 or the interior polygon changes across it. An exterior cycle
/// without such a vertex contributes its lowest coordinate.
///
/// # Examples
///
/// ```
/// # use shoehorn::ring;
/// # use shoehorn::core::math::*;
/// # use shoehorn::geometry::*;
/// # use shoehorn::boundary::*;
/// let left = LayerPolygon::new(1, (), Polygon::from_outer(
///     ring![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
/// ));
/// let right = LayerPolygon::new(2, (), Polygon::from_outer(
///     ring![(10.0, 0.0), (20.0, 0.0), (20.0, 10.0), (10.0, 10.0)],
/// ));
/// let nodes = exterior_nodes(&[left, right], Precision::from_resolution(0.0001)).unwrap();
/// assert_eq!(nodes, vec![Vector2::new(10.0, 0.0), Vector2::new(10.0, 10.0)]);
/// ```
pub fn exterior_nodes<T, A>(
    polygons: &[LayerPolygon<T, A>],
    precision: Precision<T>,
) -> Result<Vec<Vector2<T>>, ShoehornError>
where
    T: Real,
{
    Ok(exterior_of(polygons, precision)?.nodes)
}

/// Index of the point of `points` closest to `pos` within `tol`, ties go to the lowest key.
fn nearest_within<T>(
    index: &StaticAABB2DIndex<T>,
    points: &[(CoordKey, Vector2<T>)],
    pos: Vector2<T>,
    tol: T,
) -> Option<usize>
where
    T: Real,
{
    let tol_sq = tol * tol;
    let mut best: Option<(T, usize)> = None;
    for i in index.query(pos.x - tol, pos.y - tol, pos.x + tol, pos.y + tol) {
        let d = dist_squared(pos, points[i].1);
        if d > tol_sq {
            continue;
        }
        let closer = match best {
            None => true,
            Some((best_d, best_i)) => d < best_d || (d == best_d && points[i].0 < points[best_i].0),
        };
        if closer {
            best = Some((d, i));
        }
    }

    best.map(|(_, i)| i)
}

/// Compute the canonical boundary nodes of `areas`, aligned with `neighbors`.
///
/// Steps:
///
/// 1. exterior nodes and edges per survey area, one worker per area on `pool`, a failed or
///    panicking worker only excludes that area (listed in [BoundaryNodes::failed_areas])
/// 2. neighbor polygons whose extents touch the batch are selected, their exterior nodes within
///    the boundary tolerance of a batch exterior edge are kept
/// 3. batch nodes within tolerance of each other are integrated greedily in coordinate order,
///    then snapped onto the closest kept neighbor node (never the reverse)
///
/// The result is deduplicated by coordinate key. No neighbors is not an error.
pub fn synchronize<T, A, B>(
    areas: &[SurveyArea<T, A>],
    neighbors: &[LayerPolygon<T, B>],
    options: &ShoehornOptions<T>,
    pool: &rayon::ThreadPool,
) -> Result<BoundaryNodes<T>, ShoehornError>
where
    T: Real,
    A: Sync,
    B: Sync,
{
    let precision = options.precision();
    let tol = options.effective_boundary_tolerance();

    let per_area: Vec<Option<Exterior<T>>> = pool.install(|| {
        areas
            .par_iter()
            .map(|area| {
                match panic::catch_unwind(AssertUnwindSafe(|| {
                    exterior_of(&area.polygons, precision)
                })) {
                    Ok(Ok(exterior)) => Some(exterior),
                    Ok(Err(e)) => {
                        warn!("boundary nodes of survey area `{}` failed: {e}", area.symbol);
                        None
                    }
                    Err(_) => {
                        warn!("boundary node worker of survey area `{}` panicked", area.symbol);
                        None
                    }
                }
            })
            .collect()
    });

    let mut result = BoundaryNodes::default();
    let mut batch_nodes: BTreeMap<CoordKey, Vector2<T>> = BTreeMap::new();
    let mut batch_edges = Vec::new();
    for (area, exterior) in areas.iter().zip(per_area) {
        let Some(exterior) = exterior else {
            result.failed_areas.push(area.symbol.clone());
            continue;
        };
        for v in exterior.nodes {
            if let Some(key) = precision.key(v) {
                batch_nodes.insert(key, v);
            }
        }
        batch_edges.extend(exterior.edges);
    }

    // greedy integration, every node within tolerance of an earlier representative joins it
    let node_list: Vec<(CoordKey, Vector2<T>)> = batch_nodes.into_iter().collect();
    let mut representatives: Vec<(CoordKey, Vector2<T>)> = Vec::new();
    if !node_list.is_empty() {
        let index = index_boxes(&point_boxes(node_list.iter().map(|n| n.1)))?;
        let mut assigned = vec![false; node_list.len()];
        let tol_sq = tol * tol;
        for i in 0..node_list.len() {
            if assigned[i] {
                continue;
            }
            assigned[i] = true;
            let pos = node_list[i].1;
            for j in index.query(pos.x - tol, pos.y - tol, pos.x + tol, pos.y + tol) {
                if !assigned[j] && dist_squared(pos, node_list[j].1) <= tol_sq {
                    assigned[j] = true;
                }
            }
            representatives.push(node_list[i]);
        }
    }

    let integrated = node_list.len() - representatives.len();
    if integrated > 0 {
        debug!("integrated {integrated} boundary nodes within tolerance {tol}");
    }

    let neighbor_nodes = seam_neighbor_nodes(areas, neighbors, &batch_edges, precision, tol)?;

    let mut canonical: BTreeMap<CoordKey, Vector2<T>> = neighbor_nodes.iter().copied().collect();
    let neighbor_index = if neighbor_nodes.is_empty() {
        None
    } else {
        Some(index_boxes(&point_boxes(neighbor_nodes.iter().map(|n| n.1)))?)
    };

    for (key, pos) in representatives {
        let target = neighbor_index
            .as_ref()
            .and_then(|index| nearest_within(index, &neighbor_nodes, pos, tol));
        match target {
            Some(i) if neighbor_nodes[i].0 != key => {
                result.snapped.push((pos, neighbor_nodes[i].1));
            }
            Some(_) => {}
            None => {
                canonical.insert(key, pos);
            }
        }
    }

    result.nodes = canonical.into_values().collect();
    debug!(
        "{} canonical boundary nodes, {} snapped onto neighbors",
        result.nodes.len(),
        result.snapped.len()
    );

    Ok(result)
}

/// Exterior nodes of the neighbor polygons touching the batch that lie within `tol` of a batch
/// exterior edge, sorted by key.
fn seam_neighbor_nodes<T, A, B>(
    areas: &[SurveyArea<T, A>],
    neighbors: &[LayerPolygon<T, B>],
    batch_edges: &[(Vector2<T>, Vector2<T>)],
    precision: Precision<T>,
    tol: T,
) -> Result<Vec<(CoordKey, Vector2<T>)>, ShoehornError>
where
    T: Real,
{
    if neighbors.is_empty() || batch_edges.is_empty() {
        return Ok(Vec::new());
    }

    let neighbor_boxes: Vec<AABB<T>> = neighbors
        .iter()
        .map(|p| {
            p.geometry
                .extents()
                .unwrap_or_else(|| AABB::new(T::zero(), T::zero(), T::zero(), T::zero()))
        })
        .collect();
    let neighbor_index = index_boxes(&neighbor_boxes)?;

    let mut touching = BTreeSet::new();
    for polygon in areas.iter().flat_map(|a| a.polygons.iter()) {
        let Some(extents) = polygon.geometry.extents() else {
            continue;
        };
        let query = expand(&extents, tol);
        touching.extend(neighbor_index.query(query.min_x, query.min_y, query.max_x, query.max_y));
    }

    if touching.is_empty() {
        return Ok(Vec::new());
    }

    let exterior = exterior_of(touching.iter().map(|&i| &neighbors[i]), precision)?;

    let edge_boxes: Vec<AABB<T>> = batch_edges
        .iter()
        .map(|&(a, b)| {
            let (min_x, max_x) = min_max(a.x, b.x);
            let (min_y, max_y) = min_max(a.y, b.y);
            AABB::new(min_x, min_y, max_x, max_y)
        })
        .collect();
    let edge_index = index_boxes(&edge_boxes)?;
    let tol_sq = tol * tol;

    let mut kept = BTreeMap::new();
    for v in exterior.nodes {
        let on_seam = edge_index
            .query(v.x - tol, v.y - tol, v.x + tol, v.y + tol)
            .into_iter()
            .any(|i| {
                let (a, b) = batch_edges[i];
                dist_squared(line_seg_closest_point(a, b, v), v) <= tol_sq
            });
        if on_seam {
            if let Some(key) = precision.key(v) {
                kept.insert(key, v);
            }
        }
    }

    debug!(
        "{} of {} touching neighbor polygons contribute {} seam nodes",
        touching.len(),
        neighbors.len(),
        kept.len()
    );

    Ok(kept.into_iter().collect())
}
