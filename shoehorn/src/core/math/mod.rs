//! Core/common math functions for planar distances, turning angles, winding numbers, and
//! coordinate precision.
mod base_math;
mod precision;
mod vector2;

pub use base_math::*;
pub use precision::{CoordKey, Precision};
pub use vector2::{vec2, Vector2};
