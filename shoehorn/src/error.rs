use crate::{geometry::PolygonId, topology::ArcId};
use thiserror::Error;

/// Errors that halt processing of a survey area or reject the configuration.
///
/// Polygon level problems are never reported through this type, they are recorded as
/// [PolygonFailure](crate::audit::PolygonFailure) entries in the survey report.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ShoehornError {
    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("polygon {polygon} has a coordinate that cannot be represented at the layer precision")]
    InvalidCoordinate { polygon: PolygonId },

    #[error("topology mismatch in survey area `{area}`")]
    Topology {
        area: String,
        #[source]
        source: TopologyError,
    },

    #[error("polygons {first} and {second} claim the same side of a boundary edge")]
    OverlappingPolygons { first: PolygonId, second: PolygonId },

    #[error("polygon id {polygon} appears more than once in survey area `{area}`")]
    DuplicatePolygon { area: String, polygon: PolygonId },

    #[error("survey area `{area}` has no polygons")]
    EmptySurvey { area: String },

    #[error("boundary nodes could not be computed for survey area `{area}`")]
    BoundaryNodes { area: String },

    #[error("processing of survey area `{area}` panicked")]
    Panicked { area: String },

    #[error("failed to build spatial index: {reason}")]
    SpatialIndex { reason: String },

    #[error("failed to build worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// Boundary segment whose polygon reference could not be resolved, exported for review.
#[derive(Debug, Clone, PartialEq)]
pub struct MismatchedSegment {
    pub id: ArcId,
    /// Unresolved polygon id, `None` if the segment has no polygon on either side.
    pub polygon: Option<PolygonId>,
    pub vertices: Vec<(f64, f64)>,
}

/// Errors raised while building the arc/node topology.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TopologyError {
    #[error("{} boundary segment(s) reference polygons missing from the batch", .segments.len())]
    Mismatch { segments: Vec<MismatchedSegment> },

    #[error("boundary segment {id} was supplied more than once")]
    DuplicateSegment { id: ArcId },

    #[error("boundary segment {id} has fewer than 2 vertices")]
    DegenerateSegment { id: ArcId },

    #[error("boundary segment {id} has a coordinate that cannot be keyed")]
    InvalidCoordinate { id: ArcId },
}

impl TopologyError {
    /// Segments to export for review, empty for errors other than [TopologyError::Mismatch].
    pub fn mismatched_segments(&self) -> &[MismatchedSegment] {
        match self {
            TopologyError::Mismatch { segments } => segments,
            _ => &[],
        }
    }
}
