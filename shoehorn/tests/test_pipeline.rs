mod test_utils;

use shoehorn::{
    assert_fuzzy_eq,
    audit::WeakCause,
    core::{math::Vector2, traits::FuzzyEq},
    geometry::{LayerPolygon, Polygon, PolygonId},
    ring, FailureKind, Shoehorn, ShoehornError, ShoehornOptions, SurveyArea, SurveyReport,
};
use std::collections::BTreeSet;
use test_utils::*;

fn shoehorn() -> Shoehorn {
    let mut options = ShoehornOptions::new(10.0);
    options.worker_threads = Some(2);
    Shoehorn::new(options).unwrap()
}

/// Every input id shows up exactly once across output polygons and failures.
fn assert_ids_accounted<A>(report: &SurveyReport<f64, A>, ids: &[PolygonId]) {
    let mut seen = BTreeSet::new();
    for id in report
        .polygons
        .iter()
        .map(|p| p.id)
        .chain(report.failures.iter().map(|f| f.id))
    {
        assert!(seen.insert(id), "polygon {id} reported twice");
    }
    assert_eq!(seen, ids.iter().copied().collect());
}

#[test]
fn grid_survey_end_to_end() {
    let input = wiggly_grid(3, 3, 10.0, 5);
    let ids: Vec<PolygonId> = input.iter().map(|p| p.id).collect();
    let input_area = total_area(&input);

    let batch = shoehorn()
        .run::<_, ()>(vec![SurveyArea::new("AK600", input)], &[])
        .unwrap();
    let report = batch.survey("AK600").unwrap();

    assert!(report.failures.is_empty());
    assert!(report.weak.is_empty());
    assert_ids_accounted(report, &ids);
    assert_eq!(report.input_polygons, 9);
    assert_eq!(report.output_polygons, 9);
    assert!(report.vertices_after <= report.vertices_before);

    for polygon in &report.polygons {
        assert_well_formed(&polygon.geometry);
    }
    assert_fuzzy_eq!(total_area(&report.polygons), input_area, 0.01);

    // the four cells around (10, 10) still share that corner
    let corner = Vector2::new(10.0, 10.0);
    let sharing: Vec<PolygonId> = report
        .polygons
        .iter()
        .filter(|p| contains_vertex(&p.geometry, corner))
        .map(|p| p.id)
        .collect();
    assert_eq!(sharing, vec![1, 2, 4, 5]);

    // outer boundary is frozen, so its corners survive
    for &(id, x, y) in &[(1, 0.0, 0.0), (3, 30.0, 0.0), (7, 0.0, 30.0), (9, 30.0, 30.0)] {
        let p = report.polygons.iter().find(|p| p.id == id).unwrap();
        assert!(contains_vertex(&p.geometry, Vector2::new(x, y)));
    }
}

#[test]
fn attributes_move_through_unchanged() {
    let polygons = vec![
        LayerPolygon::new(
            1,
            "arable".to_string(),
            Polygon::from_outer(ring![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]),
        ),
        LayerPolygon::new(
            2,
            "forest".to_string(),
            Polygon::from_outer(ring![(10.0, 0.0), (20.0, 0.0), (20.0, 10.0), (10.0, 10.0)]),
        ),
    ];
    let batch = shoehorn()
        .run::<_, ()>(vec![SurveyArea::new("AK600", polygons)], &[])
        .unwrap();
    let report = batch.survey("AK600").unwrap();
    let attributes: Vec<&str> = report
        .polygons
        .iter()
        .map(|p| p.attributes.as_str())
        .collect();
    assert_eq!(attributes, vec!["arable", "forest"]);
}

#[test]
fn polygon_lost_to_rounding_is_weak_and_failed() {
    let polygons = vec![
        rect(1, 0.0, 0.0, 10.0, 10.0),
        rect(2, 10.0, 0.0, 20.0, 10.0),
        // rounds onto a single coordinate
        LayerPolygon::new(
            3,
            (),
            Polygon::from_outer(ring![(50.0, 50.0), (50.00002, 50.0), (50.0, 50.00002)]),
        ),
    ];
    let batch = shoehorn()
        .run::<_, ()>(vec![SurveyArea::new("AK600", polygons)], &[])
        .unwrap();
    let report = batch.survey("AK600").unwrap();

    assert_ids_accounted(report, &[1, 2, 3]);
    assert_eq!(report.output_polygons, 2);
    assert_eq!(report.failure(3), Some(FailureKind::Collapsed));
    assert!(report.is_weak(3));
    assert_eq!(report.weak[0].cause, WeakCause::ClusterTolerance);
    assert!(!report.is_weak(1) && !report.is_weak(2));
}

#[test]
fn failing_areas_do_not_stop_the_batch() {
    let mut broken = square(9, 0.0, 50.0, 10.0);
    broken.geometry.outer = ring![(0.0, 50.0), (f64::NAN, 50.0), (10.0, 60.0)];

    let areas = vec![
        SurveyArea::new("AK600", vec![rect(1, 0.0, 0.0, 10.0, 10.0), rect(2, 10.0, 0.0, 20.0, 10.0)]),
        SurveyArea::new("empty", Vec::new()),
        SurveyArea::new("duplicate", vec![square(5, 100.0, 0.0, 10.0), square(5, 120.0, 0.0, 10.0)]),
        SurveyArea::new("broken", vec![broken]),
    ];
    let batch = shoehorn().run::<_, ()>(areas, &[]).unwrap();

    let symbols: Vec<&str> = batch.surveys.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["AK600", "empty", "duplicate", "broken"]);
    assert!(batch.surveys[0].result.is_ok());
    assert!(matches!(
        batch.surveys[1].result,
        Err(ShoehornError::EmptySurvey { .. })
    ));
    assert!(matches!(
        batch.surveys[2].result,
        Err(ShoehornError::DuplicatePolygon { polygon: 5, .. })
    ));
    assert!(matches!(
        batch.surveys[3].result,
        Err(ShoehornError::BoundaryNodes { .. })
    ));
    assert_eq!(batch.boundary_nodes.failed_areas, vec!["broken".to_string()]);

    let summary = batch.diet_summary();
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].symbol.as_deref(), Some("AK600"));
    assert_eq!(summary[1].symbol, None);
    assert_eq!(summary[1].polygons_before, 2);
    assert_eq!(summary[1].vertices_before, 8);
}

#[test]
fn overlapping_polygons_fail_the_area() {
    let area = SurveyArea::new("AK600", vec![square(1, 0.0, 0.0, 10.0), square(2, 0.0, 0.0, 10.0)]);
    let result = shoehorn().process_area(area, &[], &pool(1));
    assert!(matches!(
        result,
        Err(ShoehornError::OverlappingPolygons { first: 1, second: 2 })
    ));
}

#[test]
fn diet_summary_totals_surveys() {
    let areas = vec![
        SurveyArea::new("AK600", wiggly_grid(2, 1, 10.0, 4)),
        SurveyArea::new("AK601", vec![square(10, 100.0, 0.0, 10.0)]),
    ];
    let batch = shoehorn().run::<_, ()>(areas, &[]).unwrap();
    let rows = batch.diet_summary();
    assert_eq!(rows.len(), 3);

    let total = &rows[2];
    assert_eq!(total.polygons_before, 3);
    assert_eq!(total.polygons_after, 3);
    assert_eq!(
        total.vertices_before,
        rows[0].vertices_before + rows[1].vertices_before
    );
    assert_eq!(
        total.vertices_after,
        rows[0].vertices_after + rows[1].vertices_after
    );
    assert_eq!(rows[1].vertices_before, 4);
    assert_eq!(rows[1].vertices_after, 4);
}

#[test]
fn seam_vertex_is_taken_from_neighbors() {
    let areas = vec![SurveyArea::new(
        "AK600",
        vec![rect(1, 0.0, 0.0, 10.0, 10.0), rect(2, 10.0, 0.0, 20.0, 10.0)],
    )];
    let neighbors = vec![
        rect(100, 0.0, 10.0, 10.0008, 20.0),
        rect(101, 10.0008, 10.0, 20.0, 20.0),
    ];
    let batch = shoehorn().run(areas, &neighbors).unwrap();
    assert_eq!(batch.boundary_nodes.snapped.len(), 1);

    let report = batch.survey("AK600").unwrap();
    let seam = Vector2::new(10.0008, 10.0);
    assert!(report.polygons.iter().all(|p| contains_vertex(&p.geometry, seam)));
    assert!(report
        .polygons
        .iter()
        .all(|p| !contains_vertex(&p.geometry, Vector2::new(10.0, 10.0))));
    assert_fuzzy_eq!(report.polygons[0].geometry.area(), 100.004, 1e-9);
    assert_fuzzy_eq!(total_area(&report.polygons), 200.0, 1e-9);
}

#[test]
fn invalid_options_are_rejected() {
    let mut options = ShoehornOptions::new(10.0);
    options.xy_resolution = -1.0;
    assert!(matches!(
        Shoehorn::new(options),
        Err(ShoehornError::InvalidOption { name: "xy_resolution", .. })
    ));
    assert!(Shoehorn::new(ShoehornOptions::new(f64::NAN)).is_err());
}

#[test]
fn area_change_bounded_by_tolerance_and_perimeter() {
    let input = wiggly_grid(3, 3, 10.0, 5);
    for tol in [0.0005, 0.001, 0.002, 0.004] {
        let mut options = ShoehornOptions::new(10.0);
        options.simplify_tolerance = Some(tol);
        options.worker_threads = Some(2);
        let batch = Shoehorn::new(options)
            .unwrap()
            .run::<_, ()>(vec![SurveyArea::new("AK600", input.clone())], &[])
            .unwrap();
        let report = batch.survey("AK600").unwrap();
        assert!(report.failures.is_empty());

        // each arc stays within tol of its chords, rounding adds at most one unit
        for (before, after) in input.iter().zip(&report.polygons) {
            assert_eq!(before.id, after.id);
            let bound = (2.0 * tol + RESOLUTION) * perimeter(&before.geometry);
            let change = (after.geometry.area() - before.geometry.area()).abs();
            assert!(
                change <= bound,
                "polygon {} changed by {change} at tolerance {tol}, bound {bound}",
                before.id
            );
        }
        assert_fuzzy_eq!(total_area(&report.polygons), total_area(&input), 0.01);
    }
}
