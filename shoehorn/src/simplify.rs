//! Douglas-Peucker line simplification of arc vertex chains.
//!
//! Endpoints are never removed, so node coordinates are untouched and neighboring polygons stay
//! adjacent. Ties on the maximum distance are broken by the first vertex, which makes every
//! function here idempotent for a fixed tolerance.

use crate::{
    core::{
        math::{dist_squared, perpendicular_distance, Vector2},
        traits::Real,
    },
    topology::TopologyBatch,
};
use log::debug;

/// Index and distance of the first interior vertex of `chain[start..=end]` farthest from the
/// chord between `chain[start]` and `chain[end]`.
fn farthest_from_chord<T>(chain: &[Vector2<T>], start: usize, end: usize) -> Option<(usize, T)>
where
    T: Real,
{
    let (p0, p1) = (chain[start], chain[end]);
    let mut result: Option<(usize, T)> = None;
    for (i, &v) in chain.iter().enumerate().take(end).skip(start + 1) {
        let d = perpendicular_distance(p0, p1, v);
        if result.map_or(true, |(_, max)| d > max) {
            result = Some((i, d));
        }
    }

    result
}

/// Mark the vertices of `chain[start..=end]` kept by Douglas-Peucker with `tolerance`.
fn mark_kept<T>(chain: &[Vector2<T>], start: usize, end: usize, tolerance: T, keep: &mut [bool])
where
    T: Real,
{
    keep[start] = true;
    keep[end] = true;
    let mut stack = vec![(start, end)];
    while let Some((s, e)) = stack.pop() {
        if e <= s + 1 {
            continue;
        }

        if let Some((i, d)) = farthest_from_chord(chain, s, e) {
            if d > tolerance {
                keep[i] = true;
                stack.push((i, e));
                stack.push((s, i));
            }
        }
    }
}

/// Douglas-Peucker reduction of an open vertex chain.
///
/// # Examples
///
/// ```
/// # use shoehorn::chain;
/// # use shoehorn::simplify::*;
/// let reduced = douglas_peucker(&chain![(0.0, 0.0), (1.0, 0.001), (2.0, 0.0)], 0.01);
/// assert_eq!(reduced, chain![(0.0, 0.0), (2.0, 0.0)]);
///
/// let kept = douglas_peucker(&chain![(0.0, 0.0), (1.0, 0.5), (2.0, 0.0)], 0.01);
/// assert_eq!(kept.len(), 3);
/// ```
pub fn douglas_peucker<T>(chain: &[Vector2<T>], tolerance: T) -> Vec<Vector2<T>>
where
    T: Real,
{
    if chain.len() < 3 {
        return chain.to_vec();
    }

    let mut keep = vec![false; chain.len()];
    mark_kept(chain, 0, chain.len() - 1, tolerance, &mut keep);
    collect_kept(chain, &keep)
}

fn collect_kept<T>(chain: &[Vector2<T>], keep: &[bool]) -> Vec<Vector2<T>>
where
    T: Real,
{
    chain
        .iter()
        .zip(keep)
        .filter_map(|(&v, &k)| k.then_some(v))
        .collect()
}

/// Douglas-Peucker reduction of a closed loop chain (first vertex equal to last).
///
/// The chord of a loop is degenerate so two anchors are chosen first: the vertex farthest from the
/// start, then the vertex farthest from the chord between the start and that first anchor. Both
/// anchors are always kept, so a loop enclosing area keeps at least a triangle. The three
/// sub-chains between start and anchors are reduced with ordinary Douglas-Peucker.
///
/// # Examples
///
/// ```
/// # use shoehorn::chain;
/// # use shoehorn::simplify::*;
/// let square = chain![
///     (0.0, 0.0), (5.0, 0.0001), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)
/// ];
/// let reduced = simplify_loop(&square, 0.01);
/// assert_eq!(reduced, chain![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
/// ```
pub fn simplify_loop<T>(chain: &[Vector2<T>], tolerance: T) -> Vec<Vector2<T>>
where
    T: Real,
{
    let last = chain.len().saturating_sub(1);
    if chain.len() < 4 {
        return chain.to_vec();
    }

    let start = chain[0];
    let mut anchor1 = 1;
    let mut anchor1_dist = T::zero();
    for (i, &v) in chain.iter().enumerate().take(last).skip(1) {
        let d = dist_squared(start, v);
        if d > anchor1_dist {
            anchor1 = i;
            anchor1_dist = d;
        }
    }

    let chord_end = chain[anchor1];
    let mut anchor2 = None;
    let mut anchor2_dist = T::zero();
    for (i, &v) in chain.iter().enumerate().take(last).skip(1) {
        if i == anchor1 {
            continue;
        }
        let d = perpendicular_distance(start, chord_end, v);
        if anchor2.is_none() || d > anchor2_dist {
            anchor2 = Some(i);
            anchor2_dist = d;
        }
    }

    let mut splits = vec![0, anchor1, last];
    if let Some(a2) = anchor2 {
        splits.push(a2);
    }
    splits.sort_unstable();

    let mut keep = vec![false; chain.len()];
    for w in splits.windows(2) {
        mark_kept(chain, w[0], w[1], tolerance, &mut keep);
    }

    collect_kept(chain, &keep)
}

/// Simplify an arc chain, dispatching to [simplify_loop] when the chain is closed.
pub fn simplify_chain<T>(chain: &[Vector2<T>], tolerance: T) -> Vec<Vector2<T>>
where
    T: Real,
{
    let closed = chain.len() > 3 && chain.first() == chain.last();
    if closed {
        simplify_loop(chain, tolerance)
    } else {
        douglas_peucker(chain, tolerance)
    }
}

/// Simplify every non frozen arc of `batch`, returns the number of removed vertices.
pub fn simplify_arcs<T>(batch: &mut TopologyBatch<T>, tolerance: T) -> usize
where
    T: Real,
{
    let ids: Vec<_> = batch.arc_ids().collect();
    let mut removed = 0;
    for id in ids {
        let Some(arc) = batch.arc_mut(id) else {
            continue;
        };
        if arc.frozen {
            continue;
        }

        let reduced = simplify_chain(&arc.vertices, tolerance);
        removed += arc.vertices.len() - reduced.len();
        arc.vertices = reduced;
    }

    debug!("simplified arcs with tolerance {tolerance}, removed {removed} vertices");
    removed
}
