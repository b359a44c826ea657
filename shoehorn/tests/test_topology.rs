mod test_utils;

use shoehorn::{
    chain,
    core::math::Vector2,
    topology::{build_topology, derive_linework, BoundarySegment, LineworkOptions, Orientation},
    TopologyError,
};
use std::collections::BTreeSet;
use test_utils::*;

fn grid_segments(points: usize) -> Vec<BoundarySegment<f64>> {
    let polygons = wiggly_grid(2, 2, 10.0, points);
    derive_linework(&polygons, &[], &LineworkOptions::new(precision(), 0.001)).unwrap()
}

#[test]
fn grid_linework_counts() {
    for points in [0, 3] {
        let segments = grid_segments(points);
        // four interior spokes from the center, four outer runs between edge midpoints
        assert_eq!(segments.len(), 8);
        assert_eq!(segments.iter().filter(|s| s.frozen).count(), 4);
        let ids: Vec<usize> = segments.iter().map(|s| s.id).collect();
        assert_eq!(ids, (0..8).collect::<Vec<_>>());

        let present: BTreeSet<u64> = (1..=4).collect();
        let b = build_topology(segments, &present, precision()).unwrap();
        assert_eq!(b.arc_count(), 8);
        // outer runs are reversed as needed so the cell is on the right
        assert!(b
            .arcs()
            .filter(|(_, a)| a.frozen)
            .all(|(_, a)| a.right.is_some() && a.left.is_none()));

        let mut nodes = node_positions(&b);
        nodes.sort_by(|a, b| (a.x, a.y).partial_cmp(&(b.x, b.y)).unwrap());
        assert_eq!(
            nodes,
            vec![
                Vector2::new(0.0, 10.0),
                Vector2::new(10.0, 0.0),
                Vector2::new(10.0, 10.0),
                Vector2::new(10.0, 20.0),
                Vector2::new(20.0, 10.0),
            ]
        );

        let center = b.node_at(Vector2::new(10.0, 10.0)).unwrap();
        assert_eq!(b.node(center).unwrap().ends.len(), 4);
        assert!(!b.node(center).unwrap().frozen);
        // every cell has two interior arcs and one outer run
        for id in 1..=4 {
            assert_eq!(b.polygon(id).unwrap().arcs.len(), 3);
        }
        assert_arc_ends_match_nodes(&b);
    }
}

#[test]
fn grid_vertices_shared_exactly() {
    let segments = grid_segments(3);
    // each interior edge carries its three wiggled points once
    let interior: usize = segments
        .iter()
        .filter(|s| !s.frozen)
        .map(|s| s.vertices.len() - 2)
        .sum();
    assert_eq!(interior, 4 * 3);
}

#[test]
fn left_only_segment_is_reversed() {
    let b = batch(
        vec![BoundarySegment::new(
            0,
            chain![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)],
            None,
            Some(7),
        )],
        &[7],
    );
    let arc = b.arc(0).unwrap();
    assert_eq!(arc.right, Some(7));
    assert_eq!(arc.left, None);
    assert_eq!(arc.vertices[1], Vector2::new(10.0, 10.0));
    assert_eq!(b.polygon(7).unwrap().arcs, vec![(0, Orientation::Forward)]);
}

#[test]
fn unresolved_polygons_are_collected() {
    let present: BTreeSet<u64> = [1].into_iter().collect();
    let segments = vec![
        BoundarySegment::new(0, chain![(0.0, 0.0), (0.0, 10.0)], Some(1), Some(9)),
        BoundarySegment::new(1, chain![(0.0, 10.0), (10.0, 10.0)], Some(1), None),
        BoundarySegment::new(2, chain![(10.0, 10.0), (0.0, 0.0)], None, None),
    ];
    let err = build_topology(segments, &present, precision()).unwrap_err();
    assert!(matches!(err, TopologyError::Mismatch { .. }));

    let mismatched = err.mismatched_segments();
    assert_eq!(mismatched.len(), 2);
    assert_eq!((mismatched[0].id, mismatched[0].polygon), (0, Some(9)));
    assert_eq!((mismatched[1].id, mismatched[1].polygon), (2, None));
    assert_eq!(mismatched[0].vertices, vec![(0.0, 0.0), (0.0, 10.0)]);
}

#[test]
fn duplicate_segment_id_is_rejected() {
    let present: BTreeSet<u64> = [1].into_iter().collect();
    let segments = vec![
        BoundarySegment::new(3, chain![(0.0, 0.0), (0.0, 10.0)], Some(1), None),
        BoundarySegment::new(3, chain![(0.0, 10.0), (0.0, 0.0)], Some(1), None),
    ];
    let err = build_topology(segments, &present, precision()).unwrap_err();
    assert!(matches!(err, TopologyError::DuplicateSegment { id: 3 }));
    assert!(err.mismatched_segments().is_empty());
}

#[test]
fn collapse_merges_into_frozen_node() {
    let mut b = acute_node_batch();
    // arc 0 runs from the simple node N to the frozen node X
    let plan = b.plan_collapse(0).unwrap();
    let merge = plan.merge.unwrap();
    let x = b.node_at(Vector2::new(10.0, 0.0)).unwrap();
    assert_eq!(merge.keep, x);

    let outcome = b.apply_collapse(&plan);
    assert_eq!(outcome.surviving_node, Some(x));
    assert!(b.arc(0).is_none());
    assert_eq!(b.resolve_node(merge.absorb), x);
    assert!(outcome.affected.contains(&BOTTOM) && outcome.affected.contains(&SLIVER));
    assert!(outcome.destroyed.is_empty());
    assert_arc_ends_match_nodes(&b);
}
