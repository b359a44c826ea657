use crate::{
    audit::{AmendedKind, AmendedVertex, DietRow, PolygonFailure, WeakCause, WeakPolygon},
    boundary::{synchronize, BoundaryNodes},
    core::{math::Vector2, traits::Real},
    error::ShoehornError,
    geometry::{LayerPolygon, PolygonId},
    options::ShoehornOptions,
    reassemble::{reassemble_all, FailureKind},
    simplify::simplify_arcs,
    topology::{build_topology, derive_linework, LineworkOptions},
    tweezer::remove_acute_angles,
};
use log::{info, warn};
use std::{
    collections::BTreeSet,
    panic::{self, AssertUnwindSafe},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unit of batching: the polygons of one survey, identified by the survey symbol.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyArea<T = f64, A = ()> {
    pub symbol: String,
    pub polygons: Vec<LayerPolygon<T, A>>,
}

impl<T, A> SurveyArea<T, A> {
    pub fn new(symbol: impl Into<String>, polygons: Vec<LayerPolygon<T, A>>) -> Self {
        Self {
            symbol: symbol.into(),
            polygons,
        }
    }
}

/// Result of processing one survey area.
///
/// Every input polygon id appears exactly once, either in `polygons` or in `failures`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyReport<T = f64, A = ()> {
    pub symbol: String,
    /// Reassembled polygons with their original attributes, in input order.
    pub polygons: Vec<LayerPolygon<T, A>>,
    pub failures: Vec<PolygonFailure>,
    pub weak: Vec<WeakPolygon>,
    pub amended: Vec<AmendedVertex<T>>,
    pub input_polygons: usize,
    pub output_polygons: usize,
    pub vertices_before: usize,
    pub vertices_after: usize,
}

impl<T, A> SurveyReport<T, A> {
    pub fn diet_row(&self) -> DietRow {
        DietRow {
            symbol: Some(self.symbol.clone()),
            polygons_before: self.input_polygons,
            polygons_after: self.output_polygons,
            vertices_before: self.vertices_before,
            vertices_after: self.vertices_after,
        }
    }

    /// Failure recorded for polygon `id`, if any.
    pub fn failure(&self, id: PolygonId) -> Option<FailureKind> {
        self.failures.iter().find(|f| f.id == id).map(|f| f.kind)
    }

    pub fn is_weak(&self, id: PolygonId) -> bool {
        self.weak.iter().any(|w| w.id == id)
    }
}

/// Outcome of one survey area, an error halts only that area.
#[derive(Debug)]
pub struct SurveyOutcome<T = f64, A = ()> {
    pub symbol: String,
    pub result: Result<SurveyReport<T, A>, ShoehornError>,
}

/// Result of [Shoehorn::run].
#[derive(Debug)]
pub struct BatchReport<T = f64, A = ()> {
    pub boundary_nodes: BoundaryNodes<T>,
    /// One outcome per input survey area, in input order.
    pub surveys: Vec<SurveyOutcome<T, A>>,
}

impl<T, A> BatchReport<T, A> {
    /// One [DietRow] per successfully processed survey followed by a total row.
    pub fn diet_summary(&self) -> Vec<DietRow> {
        let mut rows: Vec<DietRow> = self
            .surveys
            .iter()
            .filter_map(|s| s.result.as_ref().ok())
            .map(SurveyReport::diet_row)
            .collect();

        let total = rows.iter().fold(
            DietRow {
                symbol: None,
                polygons_before: 0,
                polygons_after: 0,
                vertices_before: 0,
                vertices_after: 0,
            },
            |mut acc, r| {
                acc.polygons_before += r.polygons_before;
                acc.polygons_after += r.polygons_after;
                acc.vertices_before += r.vertices_before;
                acc.vertices_after += r.vertices_after;
                acc
            },
        );
        rows.push(total);

        rows
    }

    /// Report of the survey `symbol` if it was processed successfully.
    pub fn survey(&self, symbol: &str) -> Option<&SurveyReport<T, A>> {
        self.surveys
            .iter()
            .find(|s| s.symbol == symbol)
            .and_then(|s| s.result.as_ref().ok())
    }
}

/// Boundary generalization and polygon reassembly driver.
///
/// # Examples
///
/// ```
/// # use shoehorn::*;
/// # use shoehorn::geometry::*;
/// let polygons = vec![
///     LayerPolygon::new(1, "north", Polygon::from_outer(
///         ring![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
///     )),
///     LayerPolygon::new(2, "south", Polygon::from_outer(
///         ring![(0.0, -10.0), (10.0, -10.0), (10.0, 0.0), (0.0, 0.0)],
///     )),
/// ];
/// let shoehorn = Shoehorn::new(ShoehornOptions::new(10.0)).unwrap();
/// let batch = shoehorn
///     .run::<_, ()>(vec![SurveyArea::new("AK600", polygons)], &[])
///     .unwrap();
/// let report = batch.survey("AK600").unwrap();
/// assert_eq!(report.output_polygons, 2);
/// assert!(report.failures.is_empty());
/// assert_eq!(report.polygons[0].attributes, "north");
/// assert_eq!(report.polygons[0].geometry.area(), 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct Shoehorn<T = f64> {
    options: ShoehornOptions<T>,
}

impl<T> Shoehorn<T>
where
    T: Real,
{
    /// Validates `options`, see [ShoehornOptions::validate].
    pub fn new(options: ShoehornOptions<T>) -> Result<Self, ShoehornError> {
        options.validate()?;
        Ok(Self { options })
    }

    #[inline]
    pub fn options(&self) -> &ShoehornOptions<T> {
        &self.options
    }

    /// Process a batch of survey areas aligned with the finalized `neighbors`.
    ///
    /// Boundary nodes are synchronized once for the whole batch, then each survey area is
    /// processed in turn with [Shoehorn::process_area]. A panic while processing an area fails
    /// only that area with [ShoehornError::Panicked]. Only worker pool construction and neighbor
    /// layer problems fail the whole batch.
    pub fn run<A, B>(
        &self,
        areas: Vec<SurveyArea<T, A>>,
        neighbors: &[LayerPolygon<T, B>],
    ) -> Result<BatchReport<T, A>, ShoehornError>
    where
        A: Sync,
        B: Sync,
    {
        let workers = self.options.worker_count(areas.len());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?;
        info!(
            "processing {} survey areas against {} neighbor polygons on {workers} workers",
            areas.len(),
            neighbors.len()
        );

        let boundary_nodes = synchronize(&areas, neighbors, &self.options, &pool)?;
        info!(
            "synchronized {} boundary nodes ({} snapped onto neighbors)",
            boundary_nodes.nodes.len(),
            boundary_nodes.snapped.len()
        );

        let surveys = Self::process_areas(areas, &boundary_nodes, &pool, |area, seeds, pool| {
            self.process_area(area, seeds, pool)
        });

        Ok(BatchReport {
            boundary_nodes,
            surveys,
        })
    }

    /// Run `process` on every area the synchronizer did not fail, in input order.
    ///
    /// A panic while processing an area is caught and recorded as [ShoehornError::Panicked] for
    /// that area only.
    fn process_areas<A, F>(
        areas: Vec<SurveyArea<T, A>>,
        boundary_nodes: &BoundaryNodes<T>,
        pool: &rayon::ThreadPool,
        process: F,
    ) -> Vec<SurveyOutcome<T, A>>
    where
        F: Fn(
            SurveyArea<T, A>,
            &[Vector2<T>],
            &rayon::ThreadPool,
        ) -> Result<SurveyReport<T, A>, ShoehornError>,
    {
        let failed: BTreeSet<&str> = boundary_nodes
            .failed_areas
            .iter()
            .map(String::as_str)
            .collect();
        let mut surveys = Vec::with_capacity(areas.len());
        for area in areas {
            let symbol = area.symbol.clone();
            let result = if failed.contains(symbol.as_str()) {
                Err(ShoehornError::BoundaryNodes {
                    area: symbol.clone(),
                })
            } else {
                panic::catch_unwind(AssertUnwindSafe(|| {
                    process(area, &boundary_nodes.nodes, pool)
                }))
                .unwrap_or_else(|_| {
                    Err(ShoehornError::Panicked {
                        area: symbol.clone(),
                    })
                })
            };

            if let Err(e) = &result {
                warn!("survey area `{symbol}` not processed: {e}");
            }
            surveys.push(SurveyOutcome { symbol, result });
        }

        surveys
    }

    /// Process one survey area with the canonical boundary nodes `seeds`.
    ///
    /// Linework derivation, topology, simplification, acute angle removal, then reassembly on
    /// `pool`. Polygon level problems are recorded in the report and never fail the area.
    pub fn process_area<A>(
        &self,
        area: SurveyArea<T, A>,
        seeds: &[Vector2<T>],
        pool: &rayon::ThreadPool,
    ) -> Result<SurveyReport<T, A>, ShoehornError> {
        let SurveyArea { symbol, polygons } = area;
        if polygons.is_empty() {
            return Err(ShoehornError::EmptySurvey { area: symbol });
        }

        let mut present = BTreeSet::new();
        for p in &polygons {
            if !present.insert(p.id) {
                return Err(ShoehornError::DuplicatePolygon {
                    area: symbol,
                    polygon: p.id,
                });
            }
        }

        let options = &self.options;
        let precision = options.precision();
        let vertices_before = polygons.iter().map(|p| p.geometry.vertex_count()).sum();
        info!(
            "survey area `{symbol}`: {} polygons, {vertices_before} vertices",
            polygons.len()
        );

        let mut linework = LineworkOptions::new(precision, options.effective_boundary_tolerance());
        linework.freeze_outer_boundary = options.freeze_outer_boundary;
        let segments = derive_linework(&polygons, seeds, &linework)?;
        let mut batch = build_topology(segments, &present, precision).map_err(|source| {
            ShoehornError::Topology {
                area: symbol.clone(),
                source,
            }
        })?;
        let built: BTreeSet<PolygonId> = batch.polygon_ids().collect();
        info!(
            "survey area `{symbol}`: {} arcs, {} nodes",
            batch.arc_count(),
            batch.node_ids().count()
        );

        let simplified = simplify_arcs(&mut batch, options.effective_simplify_tolerance());
        let tweezer = remove_acute_angles(&mut batch, options.min_angle_radians());
        info!(
            "survey area `{symbol}`: simplification removed {simplified} vertices, tweezer amended \
             {} vertices and {} nodes",
            tweezer.count(AmendedKind::Vertex),
            tweezer.count(AmendedKind::Node)
        );

        let mut results = reassemble_all(&batch, options.outer_ring_rule, pool);

        let mut report = SurveyReport {
            symbol,
            polygons: Vec::with_capacity(polygons.len()),
            failures: Vec::new(),
            weak: Vec::new(),
            amended: Vec::new(),
            input_polygons: polygons.len(),
            output_polygons: 0,
            vertices_before,
            vertices_after: 0,
        };

        for polygon in polygons {
            let id = polygon.id;
            if tweezer.weak.contains(&id) {
                report.weak.push(WeakPolygon {
                    id,
                    cause: WeakCause::Tweezer,
                });
            }

            let outcome = if built.contains(&id) {
                results.remove(&id).unwrap_or(Err(FailureKind::Collapsed))
            } else {
                report.weak.push(WeakPolygon {
                    id,
                    cause: WeakCause::ClusterTolerance,
                });
                Err(FailureKind::Collapsed)
            };

            match outcome {
                Ok(geometry) => {
                    report
                        .polygons
                        .push(LayerPolygon::new(id, polygon.attributes, geometry));
                }
                Err(kind) => {
                    if kind == FailureKind::ZeroArea {
                        report.weak.push(WeakPolygon {
                            id,
                            cause: WeakCause::Reassembly,
                        });
                    }
                    warn!("survey area `{}`: polygon {id} dropped: {kind}", report.symbol);
                    report.failures.push(PolygonFailure { id, kind });
                }
            }
        }

        report.amended = tweezer.amended;
        report.output_polygons = report.polygons.len();
        report.vertices_after = report
            .polygons
            .iter()
            .map(|p| p.geometry.vertex_count())
            .sum();
        info!(
            "survey area `{}`: {} of {} polygons reassembled, {} to {} vertices",
            report.symbol,
            report.output_polygons,
            report.input_polygons,
            report.vertices_before,
            report.vertices_after
        );

        Ok(report)
    }
}
