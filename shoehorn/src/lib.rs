//! Boundary generalization and polygon reassembly for survey polygon mosaics.
//!
//! A batch of survey areas is cut into shared boundary arcs between nodes, the arcs are simplified
//! and cleared of spuriously acute angles while node coordinates stay fixed, and valid polygons
//! are rebuilt from the cleaned arcs. Seams with finalized neighbor polygons are cut at the same
//! nodes on both sides so the mosaic stays gap and overlap free.
//!
//! Entry point is [Shoehorn::run], the stages are also usable individually through the
//! [topology], [simplify], [tweezer], [boundary], and [reassemble] modules.
extern crate static_aabb2d_index;

#[macro_use]
mod macros;
mod error;
mod options;
mod pipeline;

pub mod audit;
pub mod boundary;
pub mod core;
pub mod geometry;
pub mod reassemble;
pub mod simplify;
pub mod topology;
pub mod tweezer;

pub use static_aabb2d_index::AABB;

pub use crate::error::{MismatchedSegment, ShoehornError, TopologyError};
pub use crate::options::ShoehornOptions;
pub use crate::pipeline::{BatchReport, Shoehorn, SurveyArea, SurveyOutcome, SurveyReport};
pub use crate::reassemble::{FailureKind, OuterRingRule};
