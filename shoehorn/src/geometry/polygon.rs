use super::Ring;
use crate::core::traits::Real;
use static_aabb2d_index::AABB;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable integer id of a polygon in the source layer.
pub type PolygonId = u64;

/// Polygon made of one outer ring and zero or more hole rings.
///
/// Polygons produced by reassembly keep the traversal direction of their arcs (polygon on the
/// right), so outer rings are clockwise and holes counter clockwise. Input polygons may use either
/// orientation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon<T = f64> {
    pub outer: Ring<T>,
    pub holes: Vec<Ring<T>>,
}

impl<T> Polygon<T>
where
    T: Real,
{
    pub fn new(outer: Ring<T>, holes: Vec<Ring<T>>) -> Self {
        Self { outer, holes }
    }

    pub fn from_outer(outer: Ring<T>) -> Self {
        Self::new(outer, Vec::new())
    }

    /// Iterate the outer ring followed by the holes.
    pub fn rings(&self) -> impl Iterator<Item = &Ring<T>> + '_ {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Area of the outer ring minus the area of the holes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use shoehorn::ring;
    /// # use shoehorn::geometry::*;
    /// let polygon = Polygon::new(
    ///     ring![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
    ///     vec![ring![(2.0, 2.0), (2.0, 4.0), (4.0, 4.0), (4.0, 2.0)]],
    /// );
    /// assert_eq!(polygon.area(), 96.0);
    /// assert_eq!(polygon.vertex_count(), 8);
    /// ```
    pub fn area(&self) -> T {
        self.holes
            .iter()
            .fold(self.outer.area(), |acc, h| acc - h.area())
    }

    /// Distinct vertex count over all rings.
    pub fn vertex_count(&self) -> usize {
        self.rings().map(Ring::vertex_count).sum()
    }

    /// Bounding box of the outer ring.
    #[inline]
    pub fn extents(&self) -> Option<AABB<T>> {
        self.outer.extents()
    }
}

/// Polygon of a layer: id, caller attribute payload, and geometry.
///
/// The attribute payload is never interpreted, it is moved through the pipeline unchanged.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LayerPolygon<T = f64, A = ()> {
    pub id: PolygonId,
    pub attributes: A,
    pub geometry: Polygon<T>,
}

impl<T, A> LayerPolygon<T, A>
where
    T: Real,
{
    pub fn new(id: PolygonId, attributes: A, geometry: Polygon<T>) -> Self {
        Self {
            id,
            attributes,
            geometry,
        }
    }
}
