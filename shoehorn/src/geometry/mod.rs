//! Geometry primitives consumed and produced by the pipeline: closed rings, polygons with holes,
//! and layer polygons carrying an id and an attribute payload.
mod polygon;
mod ring;

pub use polygon::{LayerPolygon, Polygon, PolygonId};
pub use ring::{Ring, RingOrientation};

use crate::{core::traits::Real, error::ShoehornError};
use static_aabb2d_index::{StaticAABB2DIndex, StaticAABB2DIndexBuilder, AABB};

/// Build a spatial index over `boxes`, index positions match slice positions.
pub(crate) fn index_boxes<T>(boxes: &[AABB<T>]) -> Result<StaticAABB2DIndex<T>, ShoehornError>
where
    T: Real,
{
    let mut builder = StaticAABB2DIndexBuilder::new(boxes.len());
    for b in boxes {
        builder.add(b.min_x, b.min_y, b.max_x, b.max_y);
    }

    builder.build().map_err(|e| ShoehornError::SpatialIndex {
        reason: e.to_string(),
    })
}

/// Bounding box of `aabb` grown by `amount` on every side.
#[inline]
pub(crate) fn expand<T>(aabb: &AABB<T>, amount: T) -> AABB<T>
where
    T: Real,
{
    AABB::new(
        aabb.min_x - amount,
        aabb.min_y - amount,
        aabb.max_x + amount,
        aabb.max_y + amount,
    )
}
