mod test_utils;

use shoehorn::{
    boundary::{exterior_nodes, synchronize},
    core::math::Vector2,
    geometry::LayerPolygon,
    ShoehornOptions, SurveyArea,
};
use test_utils::*;

fn two_cells() -> Vec<LayerPolygon<f64, ()>> {
    vec![rect(1, 0.0, 0.0, 10.0, 10.0), rect(2, 10.0, 0.0, 20.0, 10.0)]
}

#[test]
fn grid_exterior_nodes_are_edge_midpoints() {
    let nodes = exterior_nodes(&wiggly_grid(2, 2, 10.0, 2), precision()).unwrap();
    assert_eq!(
        nodes,
        vec![
            Vector2::new(0.0, 10.0),
            Vector2::new(10.0, 0.0),
            Vector2::new(10.0, 20.0),
            Vector2::new(20.0, 10.0),
        ]
    );
}

#[test]
fn seam_nodes_snap_onto_neighbors() {
    let areas = vec![SurveyArea::new("AK600", two_cells())];
    // finalized neighbors above, their shared corner is 0.0008 off the batch corner at (10, 10)
    let neighbors = vec![
        rect(100, 0.0, 10.0, 10.0008, 20.0),
        rect(101, 10.0008, 10.0, 20.0, 20.0),
    ];
    let result = synchronize(&areas, &neighbors, &ShoehornOptions::new(10.0), &pool(2)).unwrap();

    assert_eq!(
        result.nodes,
        vec![Vector2::new(10.0, 0.0), Vector2::new(10.0008, 10.0)]
    );
    assert_eq!(
        result.snapped,
        vec![(Vector2::new(10.0, 10.0), Vector2::new(10.0008, 10.0))]
    );
    assert!(result.failed_areas.is_empty());
}

#[test]
fn distant_neighbors_are_ignored() {
    let areas = vec![SurveyArea::new("AK600", two_cells())];
    let neighbors = vec![square(100, 500.0, 500.0, 10.0), square(101, 510.0, 500.0, 10.0)];
    let result = synchronize(&areas, &neighbors, &ShoehornOptions::new(10.0), &pool(2)).unwrap();
    assert_eq!(
        result.nodes,
        vec![Vector2::new(10.0, 0.0), Vector2::new(10.0, 10.0)]
    );
    assert!(result.snapped.is_empty());
}

#[test]
fn nearby_nodes_of_adjacent_areas_are_integrated() {
    let north = vec![
        rect(3, 0.0, 10.0, 10.0005, 20.0),
        rect(4, 10.0005, 10.0, 20.0, 20.0),
    ];
    let areas = vec![
        SurveyArea::new("AK600", two_cells()),
        SurveyArea::new("AK601", north),
    ];
    let result =
        synchronize::<f64, (), ()>(&areas, &[], &ShoehornOptions::new(10.0), &pool(2)).unwrap();

    // (10.0005, 10) is within tolerance of (10, 10), which comes first in key order
    assert_eq!(
        result.nodes,
        vec![
            Vector2::new(10.0, 0.0),
            Vector2::new(10.0, 10.0),
            Vector2::new(10.0005, 20.0),
        ]
    );
    assert!(result.snapped.is_empty());
}

#[test]
fn invalid_area_does_not_stop_the_others() {
    let mut broken = square(7, 0.0, 50.0, 10.0);
    broken.geometry.outer = shoehorn::ring![(0.0, 50.0), (f64::NAN, 50.0), (10.0, 60.0)];
    let areas = vec![
        SurveyArea::new("AK600", two_cells()),
        SurveyArea::new("broken", vec![broken]),
    ];
    let result =
        synchronize::<f64, (), ()>(&areas, &[], &ShoehornOptions::new(10.0), &pool(2)).unwrap();
    assert_eq!(result.failed_areas, vec!["broken".to_string()]);
    assert_eq!(
        result.nodes,
        vec![Vector2::new(10.0, 0.0), Vector2::new(10.0, 10.0)]
    );
}
