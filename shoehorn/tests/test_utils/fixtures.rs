use shoehorn::{
    chain,
    core::math::{Precision, Vector2},
    geometry::{LayerPolygon, Polygon, PolygonId, Ring},
    ring,
    topology::{build_topology, BoundarySegment, TopologyBatch},
};
use std::collections::BTreeSet;

pub const RESOLUTION: f64 = 0.0001;

pub fn precision() -> Precision<f64> {
    Precision::from_resolution(RESOLUTION)
}

pub fn pool(threads: usize) -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .unwrap()
}

pub fn rect(id: PolygonId, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> LayerPolygon<f64, ()> {
    LayerPolygon::new(
        id,
        (),
        Polygon::from_outer(ring![(min_x, min_y), (max_x, min_y), (max_x, max_y), (min_x, max_y)]),
    )
}

pub fn square(id: PolygonId, x: f64, y: f64, size: f64) -> LayerPolygon<f64, ()> {
    rect(id, x, y, x + size, y + size)
}

pub fn batch(segments: Vec<BoundarySegment<f64>>, ids: &[PolygonId]) -> TopologyBatch<f64> {
    let present: BTreeSet<PolygonId> = ids.iter().copied().collect();
    build_topology(segments, &present, precision()).unwrap()
}

/// Small offset applied to the interior points of grid edges, a function of the nominal position
/// so both polygons sharing an edge get the same points.
fn wiggle(x: f64, y: f64) -> f64 {
    0.002 * (x * 7.3 + y * 3.1).sin()
}

/// Points of the axis aligned grid edge from `a` to `b` without `b`, interior points wiggled.
///
/// Points are always generated from the lower corner so a reversed edge matches its neighbor.
fn grid_edge(a: (f64, f64), b: (f64, f64), points: usize) -> Vec<Vector2<f64>> {
    let reversed = (b.0, b.1) < (a.0, a.1);
    let (lo, hi) = if reversed { (b, a) } else { (a, b) };

    let mut result = Vec::with_capacity(points + 2);
    result.push(Vector2::new(lo.0, lo.1));
    for k in 1..=points {
        let t = k as f64 / (points + 1) as f64;
        let (x, y) = (lo.0 + (hi.0 - lo.0) * t, lo.1 + (hi.1 - lo.1) * t);
        let w = wiggle(x, y);
        if lo.1 == hi.1 {
            result.push(Vector2::new(x, y + w));
        } else {
            result.push(Vector2::new(x + w, y));
        }
    }
    result.push(Vector2::new(hi.0, hi.1));

    if reversed {
        result.reverse();
    }
    result.pop();
    result
}

/// `cols` by `rows` grid of square cells of `size`, ids `1..`, row major. Every edge carries
/// `points` wiggled interior points shared exactly with the neighboring cell.
pub fn wiggly_grid(cols: usize, rows: usize, size: f64, points: usize) -> Vec<LayerPolygon<f64, ()>> {
    let mut result = Vec::with_capacity(cols * rows);
    for r in 0..rows {
        for c in 0..cols {
            let (x0, y0) = (c as f64 * size, r as f64 * size);
            let (x1, y1) = (x0 + size, y0 + size);
            let mut vertices = Vec::new();
            vertices.extend(grid_edge((x0, y0), (x1, y0), points));
            vertices.extend(grid_edge((x1, y0), (x1, y1), points));
            vertices.extend(grid_edge((x1, y1), (x0, y1), points));
            vertices.extend(grid_edge((x0, y1), (x0, y0), points));
            let id = (r * cols + c + 1) as PolygonId;
            result.push(LayerPolygon::new(id, (), Polygon::from_outer(Ring::new(vertices))));
        }
    }

    result
}

/// Polygon ids of the acute node fixture.
pub const SLIVER: PolygonId = 10;
pub const TOP: PolygonId = 20;
pub const BOTTOM: PolygonId = 30;

/// Frame of 20 x 20 split along y = 0 into `TOP` and `BOTTOM`, with the thin triangle `SLIVER`
/// between (0, 0), (5, h), and (10, 0) where the arcs to (10, 0) and (5, h) leave (0, 0) at 2
/// degrees.
///
/// Nodes: N = (0, 0) is the only simple node, X = (10, 0) and Z = (-10, 0) touch the frozen
/// frame, Y = (5, h) joins two arcs.
pub fn acute_node_batch() -> TopologyBatch<f64> {
    let h = 5.0 * 2f64.to_radians().tan();
    let segments = vec![
        BoundarySegment::new(0, chain![(0.0, 0.0), (10.0, 0.0)], Some(BOTTOM), Some(SLIVER)),
        BoundarySegment::new(1, chain![(0.0, 0.0), (5.0, h)], Some(SLIVER), Some(TOP)),
        BoundarySegment::new(2, chain![(-10.0, 0.0), (0.0, 0.0)], Some(BOTTOM), Some(TOP)),
        BoundarySegment::new(3, chain![(5.0, h), (10.0, 0.0)], Some(SLIVER), Some(TOP)),
        BoundarySegment::new(
            4,
            chain![(10.0, 0.0), (10.0, 10.0), (-10.0, 10.0), (-10.0, 0.0)],
            None,
            Some(TOP),
        )
        .with_frozen(true),
        BoundarySegment::new(
            5,
            chain![(-10.0, 0.0), (-10.0, -10.0), (10.0, -10.0), (10.0, 0.0)],
            None,
            Some(BOTTOM),
        )
        .with_frozen(true),
    ];

    batch(segments, &[SLIVER, TOP, BOTTOM])
}

/// Frozen 10 x 10 frame (polygon 1) with a hole loop (polygon 2) whose vertex at (8, 5.1) turns
/// at about 3.8 degrees.
pub fn sliver_hole_batch() -> TopologyBatch<f64> {
    let segments = vec![
        BoundarySegment::new(
            0,
            chain![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)],
            Some(1),
            None,
        )
        .with_frozen(true),
        BoundarySegment::new(
            1,
            chain![(5.0, 5.0), (5.0, 5.2), (8.0, 5.1), (5.0, 5.0)],
            Some(2),
            Some(1),
        ),
    ];

    batch(segments, &[1, 2])
}

/// Polygon 1 is a 10 x 10 frame around the 5 x 2 hole loop of polygon 2.
pub fn frame_with_hole_batch() -> TopologyBatch<f64> {
    let segments = vec![
        BoundarySegment::new(
            0,
            chain![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)],
            Some(1),
            None,
        )
        .with_frozen(true),
        BoundarySegment::new(
            1,
            chain![(2.0, 2.0), (2.0, 4.0), (7.0, 4.0), (7.0, 2.0), (2.0, 2.0)],
            Some(2),
            Some(1),
        ),
    ];

    batch(segments, &[1, 2])
}

/// Lattice step of [brick_grid], bricks are two steps wide and two steps high.
pub const BRICK_STEP: f64 = 5.0;

/// Number of `(dx, dy)` offsets [brick_grid] reads for `cols` by `rows` bricks.
pub fn brick_jitter_len(cols: usize, rows: usize) -> usize {
    2 * (2 * cols + 2) * (rows + 1)
}

/// `cols` by `rows` running bond of bricks, odd rows shifted by half a brick, ids `1..` row
/// major.
///
/// Every lattice point moves by its `(dx, dy)` entry of `jitter` in units of [BRICK_STEP] (up to
/// 0.2 keeps the bricks simple), and every vertical brick edge carries a jittered midpoint.
/// Interior lattice points join three arcs.
pub fn brick_grid(cols: usize, rows: usize, jitter: &[(f64, f64)]) -> Vec<LayerPolygon<f64, ()>> {
    let width = 2 * cols + 2;
    let corner = |k: usize, r: usize| {
        let (dx, dy) = jitter[r * width + k];
        Vector2::new((k as f64 + dx) * BRICK_STEP, (2.0 * r as f64 + dy) * BRICK_STEP)
    };
    let middle = |k: usize, r: usize| {
        let (dx, dy) = jitter[(rows + 1 + r) * width + k];
        Vector2::new((k as f64 + dx) * BRICK_STEP, (2.0 * r as f64 + 1.0 + dy) * BRICK_STEP)
    };

    let mut result = Vec::with_capacity(cols * rows);
    for r in 0..rows {
        for c in 0..cols {
            let k0 = 2 * c + r % 2;
            let vertices = vec![
                corner(k0, r),
                corner(k0 + 1, r),
                corner(k0 + 2, r),
                middle(k0 + 2, r),
                corner(k0 + 2, r + 1),
                corner(k0 + 1, r + 1),
                corner(k0, r + 1),
                middle(k0, r),
            ];
            let id = (r * cols + c + 1) as PolygonId;
            result.push(LayerPolygon::new(id, (), Polygon::from_outer(Ring::new(vertices))));
        }
    }

    result
}

/// Polygon ids of the fold over fixture.
pub const WEDGE: PolygonId = 40;
pub const ABOVE: PolygonId = 50;
pub const BELOW: PolygonId = 60;
pub const ISLAND: PolygonId = 70;

/// Node N = (0, 0) with the arcs to (10, 2) and (14, 0) leaving at about 11.3 degrees around the
/// polygon `WEDGE`, inside the frozen frame x in [-10, 16], y in [-10, 10].
///
/// With `island` the wedge holds the small square hole `ISLAND` inside the triangle (0, 0),
/// (10, 2), (14, 0), so sliding N onto (10, 2) would sweep the new wedge edge over it.
pub fn fold_over_batch(island: bool) -> TopologyBatch<f64> {
    let mut segments = vec![
        BoundarySegment::new(0, chain![(0.0, 0.0), (10.0, 2.0), (16.0, 0.5)], Some(WEDGE), Some(ABOVE)),
        BoundarySegment::new(1, chain![(0.0, 0.0), (14.0, 0.0), (16.0, 0.5)], Some(BELOW), Some(WEDGE)),
        BoundarySegment::new(2, chain![(-10.0, 0.0), (0.0, 0.0)], Some(BELOW), Some(ABOVE)),
        BoundarySegment::new(
            3,
            chain![(16.0, 0.5), (16.0, 10.0), (-10.0, 10.0), (-10.0, 0.0)],
            None,
            Some(ABOVE),
        )
        .with_frozen(true),
        BoundarySegment::new(
            4,
            chain![(-10.0, 0.0), (-10.0, -10.0), (16.0, -10.0), (16.0, 0.5)],
            None,
            Some(BELOW),
        )
        .with_frozen(true),
    ];
    let mut ids = vec![WEDGE, ABOVE, BELOW];
    if island {
        segments.push(BoundarySegment::new(
            5,
            chain![(8.0, 0.5), (9.0, 0.5), (9.0, 1.2), (8.0, 1.2), (8.0, 0.5)],
            Some(WEDGE),
            Some(ISLAND),
        ));
        ids.push(ISLAND);
    }

    batch(segments, &ids)
}
