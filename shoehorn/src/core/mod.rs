//! Core module has shared numeric traits, 2D math, and coordinate precision handling used by every
//! stage of the generalization pipeline.
pub mod math;
pub mod traits;
