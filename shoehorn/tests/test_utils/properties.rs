use shoehorn::{
    core::math::{vertex_angle, Vector2},
    geometry::{LayerPolygon, Polygon},
    topology::{NodeId, TopologyBatch},
};
use std::collections::BTreeSet;

pub fn total_area<A>(polygons: &[LayerPolygon<f64, A>]) -> f64 {
    polygons.iter().map(|p| p.geometry.area()).sum()
}

/// Every ring is closed, outer rings are clockwise and holes counter clockwise.
pub fn assert_well_formed(polygon: &Polygon<f64>) {
    assert!(polygon.outer.is_closed(), "outer ring not closed");
    assert!(polygon.outer.vertex_count() >= 3, "outer ring has fewer than 3 vertices");
    assert!(polygon.outer.signed_area() < 0.0, "outer ring is not clockwise");
    for hole in &polygon.holes {
        assert!(hole.is_closed(), "hole not closed");
        assert!(hole.signed_area() > 0.0, "hole is not counter clockwise");
    }
}

/// Smallest turning angle in degrees over the interior vertices of `chain`.
pub fn min_interior_angle(chain: &[Vector2<f64>]) -> Option<f64> {
    chain
        .windows(3)
        .map(|w| vertex_angle(w[0], w[1], w[2]).to_degrees())
        .reduce(f64::min)
}

/// Position of every live node with incident arcs.
pub fn node_positions(batch: &TopologyBatch<f64>) -> Vec<Vector2<f64>> {
    batch
        .node_ids()
        .filter_map(|id| batch.node(id))
        .filter(|n| !n.ends.is_empty())
        .map(|n| n.pos)
        .collect()
}

pub fn contains_vertex(polygon: &Polygon<f64>, v: Vector2<f64>) -> bool {
    polygon
        .rings()
        .any(|r| r.vertices().iter().any(|&p| p.fuzzy_eq_eps(v, 1e-9)))
}

/// First and last vertex of every arc are exactly its node positions.
pub fn assert_arc_ends_match_nodes(batch: &TopologyBatch<f64>) {
    for (id, arc) in batch.arcs() {
        let head = batch.node(batch.resolve_node(arc.head)).unwrap();
        let tail = batch.node(batch.resolve_node(arc.tail)).unwrap();
        assert_eq!(arc.vertices.first(), Some(&head.pos), "arc {id} head vertex off its node");
        assert_eq!(arc.vertices.last(), Some(&tail.pos), "arc {id} tail vertex off its node");
    }
}

/// Smallest angle in degrees between two arcs leaving `node`, `None` unless the node is simple
/// with three distinct editable arcs.
pub fn simple_node_angle(batch: &TopologyBatch<f64>, node: NodeId) -> Option<f64> {
    let n = batch.node(node)?;
    if !n.is_simple() {
        return None;
    }

    let mut arcs = BTreeSet::new();
    let mut dirs = Vec::with_capacity(3);
    for e in &n.ends {
        let arc = batch.arc(e.arc)?;
        if arc.frozen || !arcs.insert(e.arc) {
            return None;
        }
        dirs.push(arc.second_vertex(e.end)? - n.pos);
    }

    [(0, 1), (0, 2), (1, 2)]
        .iter()
        .map(|&(i, j)| dirs[i].angle_to(dirs[j]).to_degrees())
        .reduce(f64::min)
}

/// Total edge length over all rings of `polygon`.
pub fn perimeter(polygon: &Polygon<f64>) -> f64 {
    polygon
        .rings()
        .flat_map(|r| r.vertices().windows(2))
        .map(|w| (w[1] - w[0]).length())
        .sum()
}
